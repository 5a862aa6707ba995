//! Narrative interfaces consumed by the report generator
//!
//! Narrative text comes from an external text-generation collaborator behind
//! [`NarrativeSource`]. Whatever happens there is folded into a [`Narrative`]
//! value so a failure for one symbol is data in that symbol's section rather
//! than an aborted run.

use crate::error::{BriefError, Result};
use crate::model::{NewsItem, SymbolMetrics};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder written when a symbol has fewer than two samples
pub const INSUFFICIENT_DATA_TEXT: &str = "(need at least 2 trading days of price data)";

/// Outcome of narrative generation for one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Narrative {
    /// Generated or cached text
    Text(String),
    /// The collaborator failed; the reason is shown inline
    Failed { reason: String },
    /// Not attempted because no move could be computed
    InsufficientData,
}

impl Narrative {
    /// Fold a collaborator result into a narrative
    pub fn from_result<E: fmt::Display>(result: std::result::Result<String, E>) -> Self {
        match result {
            Ok(text) => Self::Text(text),
            Err(e) => Self::Failed {
                reason: e.to_string(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Text placed in the section's narrative slot
    pub fn section_text(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Failed { reason } => {
                let reason = reason.split_whitespace().collect::<Vec<_>>().join(" ");
                format!("(Error: {reason})")
            }
            Self::InsufficientData => INSUFFICIENT_DATA_TEXT.to_string(),
        }
    }
}

/// Cache key: at most one narrative per (report date, symbol, model)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NarrativeKey {
    pub report_date: NaiveDate,
    pub symbol: String,
    pub model: String,
}

impl NarrativeKey {
    pub fn new(report_date: NaiveDate, symbol: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            report_date,
            symbol: symbol.into(),
            model: model.into(),
        }
    }
}

/// Everything a narrative is allowed to be based on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeContext {
    pub metrics: SymbolMetrics,
    pub news: Vec<NewsItem>,
}

impl NarrativeContext {
    pub fn symbol(&self) -> &str {
        &self.metrics.symbol
    }
}

/// Persistent storage for generated narratives
#[async_trait]
pub trait NarrativeCache: Send + Sync {
    async fn get(&self, key: &NarrativeKey) -> Result<Option<String>>;

    /// Insert or replace the narrative for a key
    async fn put(&self, key: NarrativeKey, text: String) -> Result<()>;

    /// Drop every narrative for a report date, returning how many were removed
    async fn invalidate(&self, report_date: NaiveDate) -> Result<usize>;
}

/// Producer of narrative text for a symbol's move
#[async_trait]
pub trait NarrativeSource: Send + Sync {
    /// Model identifier, part of the cache key
    fn model_id(&self) -> &str;

    /// Return the cached narrative for (report_date, symbol, model) or compute and cache it
    async fn get_or_compute(
        &self,
        report_date: NaiveDate,
        context: &NarrativeContext,
    ) -> Result<String>;

    /// Forget cached narratives for a report date so the next run regenerates them
    async fn invalidate(&self, report_date: NaiveDate) -> Result<usize>;
}

/// Source used when narratives are switched off; every request fails visibly
#[derive(Debug, Clone, Default)]
pub struct DisabledNarratives;

#[async_trait]
impl NarrativeSource for DisabledNarratives {
    fn model_id(&self) -> &str {
        "disabled"
    }

    async fn get_or_compute(
        &self,
        _report_date: NaiveDate,
        _context: &NarrativeContext,
    ) -> Result<String> {
        Err(BriefError::Narrative("narratives disabled".to_string()))
    }

    async fn invalidate(&self, _report_date: NaiveDate) -> Result<usize> {
        Ok(0)
    }
}
