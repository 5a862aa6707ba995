//! Error types for report compilation

use thiserror::Error;

/// Errors raised while compiling or persisting a report
#[derive(Debug, Error)]
pub enum BriefError {
    /// The relational store could not answer a query
    #[error("Store error: {0}")]
    Store(String),

    /// Narrative generation or cache access failed
    #[error("Narrative error: {0}")]
    Narrative(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing a report artifact failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, BriefError>;
