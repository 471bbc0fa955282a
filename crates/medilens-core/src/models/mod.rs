//! Domain models for the MediLens engine.

mod drug;
mod pricing;
mod resolution;

pub use drug::*;
pub use pricing::*;
pub use resolution::*;
