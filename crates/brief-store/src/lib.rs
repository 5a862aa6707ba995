//! SQLite storage for market-brief
//!
//! Implements [`brief_core::MarketStore`] over the `prices_daily` and `news`
//! tables and [`brief_core::NarrativeCache`] over `ai_summaries`.

pub mod error;
pub mod sqlite;

pub use error::{Result, StoreError};
pub use sqlite::SqliteStore;
