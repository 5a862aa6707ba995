//! Error types for document rendering

use thiserror::Error;

/// Errors raised while producing a document file
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unknown document format: {0}")]
    UnknownFormat(String),

    /// The PDF writer rejected the document
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error(transparent)]
    Core(#[from] brief_core::BriefError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
