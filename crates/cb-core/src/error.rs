//! # AppError
//!
//! Centralized error handling for the chamber-board crates.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all cb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Listing not found (e.g., Job, Event)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Rejected input, worded for the person who submitted it.
    #[error("{0}")]
    ValidationError(String),

    /// Missing or wrong admin token
    #[error("Unauthorized")]
    Unauthorized,

    /// The server lacks configuration a request depends on (e.g., no admin token)
    #[error("{0}")]
    Misconfigured(String),

    /// Upload over the configured size limit
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Infrastructure failure (e.g., unreadable listing file, full disk)
    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

/// A specialized Result type for chamber-board logic.
pub type Result<T> = std::result::Result<T, AppError>;
