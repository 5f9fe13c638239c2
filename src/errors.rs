//! Unified error type for the packing list core.
//!
//! Every error here is recoverable at the call site. Deleting something that is
//! already gone is not an error at all; those operations report `Ok(false)`.

use thiserror::Error;

/// Errors produced by packing list operations
#[derive(Debug, Error)]
pub enum Error {
    /// Input was rejected before any mutation happened
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// The storage layer failed to load or save
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A record that the operation depends on does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record (e.g. "Trip", "PackingList")
        entity: &'static str,
        /// Identifier that was looked up
        id: i64,
    },

    /// The feature needs the plus tier
    #[error("'{feature}' requires Packing Buddy Plus")]
    PlusRequired {
        /// Name of the gated feature
        feature: &'static str,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Details about the configuration problem
        message: String,
    },

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A position or count did not fit the stored integer width
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    /// Missing or unreadable environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
