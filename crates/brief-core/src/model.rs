//! Report data model
//!
//! Raw rows ([`PriceSample`], [`NewsItem`]) come from the store and are never
//! mutated. [`SymbolMetrics`] is derived from them per run. [`Report`] is the
//! structured model shared by the serializer, the parser and the renderer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One daily bar for a symbol, unique by (symbol, date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub source: String,
}

impl PriceSample {
    /// Sample with only the fields the report reads; OHLC collapse to `close`
    pub fn close_only(symbol: impl Into<String>, date: NaiveDate, close: f64, volume: u64) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
            source: String::new(),
        }
    }
}

/// A stored news article, unique by (symbol, published_at, url)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub symbol: String,
    /// ISO-8601 timestamp as stored; may be empty or unparsable
    pub published_at: String,
    pub headline: String,
    pub summary: String,
    pub url: String,
    pub source: String,
}

/// Per-symbol move metrics for one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMetrics {
    pub symbol: String,
    pub prior_date: NaiveDate,
    pub latest_date: NaiveDate,
    pub prior_close: f64,
    pub latest_close: f64,
    /// `None` when fewer than two samples exist
    pub pct_change: Option<f64>,
    pub latest_volume: u64,
    pub range_low: f64,
    pub range_high: f64,
    /// Position of the latest close in the range, 0 = low, 1 = high
    pub range_position: f64,
}

impl SymbolMetrics {
    /// Whether a day-over-day move could be computed
    pub fn has_move(&self) -> bool {
        self.pct_change.is_some()
    }
}

/// Key/value rows of a section, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyField {
    Date,
    Close,
    Volume,
    Range,
}

impl KeyField {
    /// All fields in display order
    pub const ALL: [KeyField; 4] = [Self::Date, Self::Close, Self::Volume, Self::Range];

    /// Label used in the markup and in the document table
    pub fn label(&self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Close => "Close",
            Self::Volume => "Volume",
            Self::Range => "20D Range",
        }
    }
}

/// A news entry as shown in the report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDisplayItem {
    /// `<time> | <source> | <headline>`
    pub display_line: String,
    pub summary: String,
    pub url: String,
}

impl NewsDisplayItem {
    pub fn new(display_line: impl Into<String>) -> Self {
        Self {
            display_line: display_line.into(),
            ..Default::default()
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// One symbol's block in the report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub symbol: String,
    pub key_values: BTreeMap<KeyField, String>,
    pub news: Vec<NewsDisplayItem>,
    pub narrative: String,
}

impl ReportSection {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, field: KeyField, value: impl Into<String>) -> Self {
        self.key_values.insert(field, value.into());
        self
    }

    pub fn with_news(mut self, item: NewsDisplayItem) -> Self {
        self.news.push(item);
        self
    }

    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = narrative.into();
        self
    }

    /// Value for a field, if present and non-empty
    pub fn value(&self, field: KeyField) -> Option<&str> {
        self.key_values
            .get(&field)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Root of the structured report model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub meta_line: Option<String>,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta_line = Some(meta.into());
        self
    }

    pub fn with_section(mut self, section: ReportSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn section(&self, symbol: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.symbol.as_str()).collect()
    }
}
