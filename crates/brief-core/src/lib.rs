//! Core types and pipeline for market-brief
//!
//! Turns stored daily prices and news into a structured [`Report`], writes it
//! as line-oriented markup and parses that markup back. Rendering and the
//! concrete store/narrative backends live in sibling crates.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod files;
pub mod format;
pub mod markup;
pub mod model;
pub mod narrative;
pub mod report;
pub mod store;

pub use aggregate::{Aggregation, MetricsAggregator, SymbolSnapshot};
pub use config::BriefConfig;
pub use error::{BriefError, Result};
pub use model::{KeyField, NewsDisplayItem, NewsItem, PriceSample, Report, ReportSection, SymbolMetrics};
pub use narrative::{
    DisabledNarratives, Narrative, NarrativeCache, NarrativeContext, NarrativeKey, NarrativeSource,
};
pub use report::{GeneratedReport, ReportGenerator};
pub use store::{MarketStore, MemoryStore};
