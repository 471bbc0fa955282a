//! Async integration layer for MediLens.
//!
//! This crate wraps the synchronous engine with best-effort live outlet
//! probes and provides the `medilens` command-line front end.

pub mod cli;
pub mod probes;
pub mod service;

pub use probes::*;
pub use service::*;
