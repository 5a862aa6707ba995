//! Error types for the SQLite store

use brief_core::BriefError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Another thread panicked while holding the connection
    #[error("Database connection lock poisoned")]
    Poisoned,
}

impl From<StoreError> for BriefError {
    fn from(err: StoreError) -> Self {
        BriefError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_brief_error() {
        let err: BriefError = StoreError::Poisoned.into();
        assert_eq!(err.to_string(), "Store error: Database connection lock poisoned");
    }
}
