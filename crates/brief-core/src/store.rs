//! Read interface over the relational store

use crate::error::Result;
use crate::model::{NewsItem, PriceSample};

/// Queries the report pipeline runs against the price/news store
pub trait MarketStore: Send + Sync {
    /// All price samples, ordered by symbol then date descending
    fn price_samples(&self) -> Result<Vec<PriceSample>>;

    /// Up to `limit` most recent news items for a symbol, newest first
    fn recent_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>>;

    /// Up to `limit` most recent closes for a symbol, newest first
    fn recent_closes(&self, symbol: &str, limit: usize) -> Result<Vec<f64>>;
}

/// In-memory store, used for tests and for replaying exported rows
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    prices: Vec<PriceSample>,
    news: Vec<NewsItem>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the sample keyed by (symbol, date)
    pub fn upsert_price(&mut self, sample: PriceSample) {
        self.prices
            .retain(|p| !(p.symbol == sample.symbol && p.date == sample.date));
        self.prices.push(sample);
    }

    /// Insert or replace the item keyed by (symbol, published_at, url)
    pub fn upsert_news(&mut self, item: NewsItem) {
        self.news.retain(|n| {
            !(n.symbol == item.symbol && n.published_at == item.published_at && n.url == item.url)
        });
        self.news.push(item);
    }

    pub fn with_price(mut self, sample: PriceSample) -> Self {
        self.upsert_price(sample);
        self
    }

    pub fn with_news(mut self, item: NewsItem) -> Self {
        self.upsert_news(item);
        self
    }

    fn samples_for(&self, symbol: &str) -> Vec<&PriceSample> {
        let mut samples: Vec<_> = self.prices.iter().filter(|p| p.symbol == symbol).collect();
        samples.sort_by(|a, b| b.date.cmp(&a.date));
        samples
    }
}

impl MarketStore for MemoryStore {
    fn price_samples(&self) -> Result<Vec<PriceSample>> {
        let mut samples = self.prices.clone();
        samples.sort_by(|a, b| a.symbol.cmp(&b.symbol).then(b.date.cmp(&a.date)));
        Ok(samples)
    }

    fn recent_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let mut items: Vec<_> = self
            .news
            .iter()
            .filter(|n| n.symbol == symbol)
            .cloned()
            .collect();
        // ISO-8601 strings order lexically, which is what the SQL query does too
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        items.truncate(limit);
        Ok(items)
    }

    fn recent_closes(&self, symbol: &str, limit: usize) -> Result<Vec<f64>> {
        Ok(self
            .samples_for(symbol)
            .into_iter()
            .take(limit)
            .map(|p| p.close)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn test_price_order_and_upsert() {
        let store = MemoryStore::new()
            .with_price(PriceSample::close_only("BOLT", day(10), 5.0, 10))
            .with_price(PriceSample::close_only("ACME", day(10), 10.0, 10))
            .with_price(PriceSample::close_only("ACME", day(11), 10.5, 10))
            .with_price(PriceSample::close_only("ACME", day(11), 11.0, 20));

        let samples = store.price_samples().unwrap();
        let keys: Vec<_> = samples.iter().map(|p| (p.symbol.as_str(), p.date)).collect();
        assert_eq!(keys, vec![("ACME", day(11)), ("ACME", day(10)), ("BOLT", day(10))]);
        assert_eq!(samples[0].close, 11.0);
    }

    #[test]
    fn test_recent_news_limit() {
        let mut store = MemoryStore::new();
        for hour in 10..15 {
            store.upsert_news(NewsItem {
                symbol: "ACME".to_string(),
                published_at: format!("2026-01-11T{hour}:00:00Z"),
                headline: format!("Headline {hour}"),
                ..Default::default()
            });
        }

        let news = store.recent_news("ACME", 3).unwrap();
        assert_eq!(news.len(), 3);
        assert_eq!(news[0].headline, "Headline 14");
        assert!(store.recent_news("BOLT", 3).unwrap().is_empty());
    }

    #[test]
    fn test_recent_closes() {
        let mut store = MemoryStore::new();
        for d in 1..=25 {
            store.upsert_price(PriceSample::close_only("ACME", day(d), f64::from(d), 1));
        }

        let closes = store.recent_closes("ACME", 20).unwrap();
        assert_eq!(closes.len(), 20);
        assert_eq!(closes[0], 25.0);
        assert_eq!(closes[19], 6.0);
    }
}
