//! Metrics aggregation
//!
//! Reduces the store's price and news rows into one [`SymbolSnapshot`] per
//! symbol: the latest two closes, the day-over-day move, the latest volume,
//! the position of the latest close in its recent range, and the newest news.

use crate::config::BriefConfig;
use crate::error::Result;
use crate::format::{short_timestamp, single_line};
use crate::model::{NewsDisplayItem, NewsItem, PriceSample, SymbolMetrics};
use crate::narrative::NarrativeContext;
use crate::store::MarketStore;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Placeholder for an empty timestamp or source
pub const UNKNOWN: &str = "(unknown)";
/// Placeholder for an empty headline or summary
pub const MISSING: &str = "(missing)";

/// Range position used when the range is degenerate (low == high)
pub const RANGE_MIDPOINT: f64 = 0.5;

/// Aggregated input for one report
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub report_date: NaiveDate,
    /// Sorted by symbol
    pub symbols: Vec<SymbolSnapshot>,
}

/// Metrics plus the raw news selected for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSnapshot {
    pub metrics: SymbolMetrics,
    /// Newest first, at most `news_limit` items
    pub news: Vec<NewsItem>,
}

impl SymbolSnapshot {
    /// News formatted for display, with placeholders for missing fields
    pub fn news_display(&self) -> Vec<NewsDisplayItem> {
        self.news.iter().map(news_display_item).collect()
    }

    pub fn narrative_context(&self) -> NarrativeContext {
        NarrativeContext {
            metrics: self.metrics.clone(),
            news: self.news.clone(),
        }
    }
}

/// Reduces store rows into per-symbol metrics
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    news_limit: usize,
    range_window: usize,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::from_config(&BriefConfig::default())
    }
}

impl MetricsAggregator {
    pub fn new(news_limit: usize, range_window: usize) -> Self {
        Self {
            news_limit,
            range_window,
        }
    }

    pub fn from_config(config: &BriefConfig) -> Self {
        Self::new(config.news_limit, config.range_window)
    }

    /// Read the store and build snapshots for every symbol with at least one sample
    ///
    /// `today` is the fallback report date when no symbol has any sample.
    pub fn aggregate(&self, store: &dyn MarketStore, today: NaiveDate) -> Result<Aggregation> {
        let samples = store.price_samples()?;
        let latest = latest_by_symbol(&samples);
        let report_date = report_date(&latest, today);

        let mut symbols = Vec::with_capacity(latest.len());
        for (symbol, recent) in &latest {
            let window = store.recent_closes(symbol, self.range_window)?;
            let Some(metrics) = compute_metrics(recent, &window) else {
                continue;
            };
            let news = store.recent_news(symbol, self.news_limit)?;
            debug!(
                symbol = %symbol,
                news = news.len(),
                window = window.len(),
                "Aggregated symbol"
            );
            symbols.push(SymbolSnapshot { metrics, news });
        }

        info!(
            "Aggregated {} symbols for report date {}",
            symbols.len(),
            report_date
        );

        Ok(Aggregation {
            report_date,
            symbols,
        })
    }

    /// Report date the store currently implies
    pub fn report_date(&self, store: &dyn MarketStore, today: NaiveDate) -> Result<NaiveDate> {
        let samples = store.price_samples()?;
        Ok(report_date(&latest_by_symbol(&samples), today))
    }
}

/// Group samples by symbol, keeping the two most recent (newest first)
pub fn latest_by_symbol(samples: &[PriceSample]) -> BTreeMap<String, Vec<PriceSample>> {
    let mut grouped: BTreeMap<String, Vec<PriceSample>> = BTreeMap::new();
    for sample in samples {
        grouped
            .entry(sample.symbol.clone())
            .or_default()
            .push(sample.clone());
    }

    for recent in grouped.values_mut() {
        recent.sort_by(|a, b| b.date.cmp(&a.date));
        recent.truncate(2);
    }

    grouped
}

/// Latest date across all symbols, or `today` when there is none
pub fn report_date(latest: &BTreeMap<String, Vec<PriceSample>>, today: NaiveDate) -> NaiveDate {
    latest
        .values()
        .filter_map(|recent| recent.first().map(|s| s.date))
        .max()
        .unwrap_or(today)
}

/// Metrics from the newest-first samples and the newest-first close window
///
/// Returns `None` when `recent` is empty.
pub fn compute_metrics(recent: &[PriceSample], window: &[f64]) -> Option<SymbolMetrics> {
    let latest = recent.first()?;
    let prior = recent.get(1);

    let pct_change = prior.map(|p| {
        if p.close == 0.0 {
            0.0
        } else {
            (latest.close - p.close) / p.close * 100.0
        }
    });
    let prior = prior.unwrap_or(latest);

    let closes: Vec<f64> = window.iter().copied().filter(|c| c.is_finite()).collect();
    let (range_low, range_high) = if closes.is_empty() {
        (latest.close, latest.close)
    } else {
        let low = closes.iter().copied().fold(f64::INFINITY, f64::min);
        let high = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (low, high)
    };

    Some(SymbolMetrics {
        symbol: latest.symbol.clone(),
        prior_date: prior.date,
        latest_date: latest.date,
        prior_close: prior.close,
        latest_close: latest.close,
        pct_change,
        latest_volume: latest.volume,
        range_low,
        range_high,
        range_position: range_position(latest.close, range_low, range_high),
    })
}

/// Normalized position of `close` in `[low, high]`, 0.5 for a degenerate range
pub fn range_position(close: f64, low: f64, high: f64) -> f64 {
    if high == low {
        return RANGE_MIDPOINT;
    }
    ((close - low) / (high - low)).clamp(0.0, 1.0)
}

/// Whether a string is an absolute http(s) URL
pub fn is_absolute_url(s: &str) -> bool {
    let s = s.trim();
    s.starts_with("http://") || s.starts_with("https://")
}

/// Format a stored news item for display
pub fn news_display_item(item: &NewsItem) -> NewsDisplayItem {
    let timestamp = or_placeholder(short_timestamp(&item.published_at), UNKNOWN);
    let source = or_placeholder(single_line(&item.source), UNKNOWN);
    let headline = or_placeholder(single_line(&item.headline), MISSING);
    let summary = or_placeholder(single_line(&item.summary), MISSING);

    let url = item.url.trim();
    let url = if is_absolute_url(url) {
        url.to_string()
    } else {
        if !url.is_empty() {
            debug!(symbol = %item.symbol, url, "Dropping non-absolute news URL");
        }
        String::new()
    };

    NewsDisplayItem {
        display_line: format!("{timestamp} | {source} | {headline}"),
        summary,
        url,
    }
}

fn or_placeholder(value: String, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value
    }
}
