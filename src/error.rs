//! Error taxonomy for the pricing engine
//!
//! Fatal errors surface to the caller with the offending value in the
//! message. Solver exhaustion is not an error: the affected metric degrades
//! to `None` and the result carries a warning instead.

use thiserror::Error;

/// Errors surfaced by the pricing engine.
///
/// `Clone` is required so the shared-analyzer singleton can replay a failed
/// load to every caller.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// Calibration source not found or unreadable
    #[error("calibration source unreadable: {0}")]
    MissingCalibration(String),

    /// Country did not resolve through the alias table
    #[error("unknown country: '{0}'")]
    UnknownCountry(String),

    /// Genre did not resolve through the alias table
    #[error("unknown genre: '{0}'")]
    UnknownGenre(String),

    /// Market shares sum above 1.0
    #[error("market shares sum to {0:.4}, must be <= 1.0")]
    InvalidMix(f64),

    /// A Year 1..10 anchor is absent from the decay calibration
    #[error("missing Year {year} anchor in decay calibration for '{genre}'")]
    MissingYear { year: u32, genre: String },

    /// Request-level input failed validation
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, EngineError>;
