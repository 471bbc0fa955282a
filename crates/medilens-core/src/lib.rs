//! MediLens Core Library
//!
//! Prescription medicine matching: finds catalog brands in noisy OCR text,
//! groups interchangeable products and synthesizes outlet price comparisons.
//!
//! # Architecture
//!
//! ```text
//! OCR text → Tokenizer → Tiered Resolver ──┬──► Detected brand names
//!                            │             │
//!                     [ Catalog snapshot ] ├──► Substitute Grouper (same identity, by price)
//!                            ▲             │
//!                     CatalogHandle        └──► Price Synthesizer (fixed outlet table)
//!                            ▲
//!               reload: build new catalog, swap Arc
//! ```
//!
//! # Core Principle
//!
//! **Missing data is an answer, not a fault.** Unknown brands, unknown
//! prices and an empty catalog all come back as [`QueryOutcome`] values.
//!
//! # Modules
//!
//! - [`catalog`]: CSV ingestion, column remapping and the immutable index
//! - [`models`]: Domain types (DrugRecord, DrugInfo, PriceComparison, etc.)
//! - [`resolver`]: Tokenizer, tiered resolver, substitutes and suggestions
//! - [`pricing`]: Outlet price synthesis
//! - [`engine`]: The [`MediLens`] request facade
//! - [`config`] / [`logging`]: Ambient setup

pub mod catalog;
pub mod config;
pub mod engine;
pub mod logging;
pub mod models;
pub mod pricing;
pub mod resolver;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, CatalogHandle, CatalogLoader, CatalogStatus, LoadReport};
pub use config::{ConfigError, EngineConfig};
pub use engine::MediLens;
pub use models::{
    Detection, DrugInfo, DrugRecord, GenericAlternative, PriceComparison, PriceOffer,
    QueryOutcome, ResolvedMatch,
};
pub use pricing::PriceSynthesizer;
pub use resolver::{tokenize, Resolver, SubstituteGrouper};

use thiserror::Error;

/// Errors surfaced by request operations.
#[derive(Error, Debug)]
pub enum MediLensError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type MediLensResult<T> = Result<T, MediLensError>;

impl From<CatalogError> for MediLensError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::LockPoisoned => MediLensError::Internal(e.to_string()),
            other => MediLensError::CatalogUnavailable(other.to_string()),
        }
    }
}
