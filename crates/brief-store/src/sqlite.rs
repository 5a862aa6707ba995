//! SQLite-backed store
//!
//! One connection behind a mutex. Report runs are sequential, so the lock is
//! only ever contended by the narrative cache and the aggregation reads of
//! the same run.

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use brief_core::error::Result as BriefResult;
use brief_core::model::{NewsItem, PriceSample};
use brief_core::narrative::{NarrativeCache, NarrativeKey};
use brief_core::store::MarketStore;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

const SCHEMA: &str = include_str!("../sql/schema.sql");
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!("Opened market database at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Insert or replace the bar keyed by (symbol, date)
    pub fn upsert_price(&self, sample: &PriceSample) -> Result<()> {
        let volume = i64::try_from(sample.volume).unwrap_or(i64::MAX);
        self.lock()?.execute(
            "INSERT INTO prices_daily (ticker, date, open, high, low, close, volume, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(ticker, date) DO UPDATE SET
                open = excluded.open,
                high = excluded.high,
                low = excluded.low,
                close = excluded.close,
                volume = excluded.volume,
                source = excluded.source",
            params![
                sample.symbol,
                sample.date.format(DATE_FORMAT).to_string(),
                sample.open,
                sample.high,
                sample.low,
                sample.close,
                volume,
                sample.source,
            ],
        )?;
        Ok(())
    }

    /// Insert or replace the article keyed by (symbol, published_at, url)
    pub fn upsert_news(&self, item: &NewsItem) -> Result<()> {
        self.lock()?.execute(
            "INSERT INTO news (ticker, published_at, headline, summary, url, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(ticker, published_at, url) DO UPDATE SET
                headline = excluded.headline,
                summary = excluded.summary,
                source = excluded.source",
            params![
                item.symbol,
                item.published_at,
                item.headline,
                item.summary,
                item.url,
                item.source,
            ],
        )?;
        Ok(())
    }

    fn query_price_samples(&self) -> Result<Vec<PriceSample>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT ticker, date, open, high, low, close, volume, source
             FROM prices_daily
             ORDER BY ticker, date DESC",
        )?;
        let rows = stmt.query_map([], raw_price)?;

        let mut samples = Vec::new();
        for row in rows {
            let raw = row?;
            match raw.into_sample() {
                Some(sample) => samples.push(sample),
                None => warn!("Skipping price row with unparsable date"),
            }
        }
        debug!("Loaded {} price samples", samples.len());
        Ok(samples)
    }

    fn query_recent_news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT ticker, published_at, headline, summary, url, source
             FROM news
             WHERE ticker = ?1
             ORDER BY published_at DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![symbol, sql_limit(limit)], |row| {
            Ok(NewsItem {
                symbol: row.get(0)?,
                published_at: row.get(1)?,
                headline: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                summary: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                url: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                source: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn query_recent_closes(&self, symbol: &str, limit: usize) -> Result<Vec<f64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT close FROM prices_daily
             WHERE ticker = ?1
             ORDER BY date DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![symbol, sql_limit(limit)], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<f64>>>()?)
    }

    fn query_narrative(&self, key: &NarrativeKey) -> Result<Option<String>> {
        let conn = self.lock()?;
        let summary = conn
            .query_row(
                "SELECT summary FROM ai_summaries
                 WHERE report_date = ?1 AND ticker = ?2 AND model = ?3",
                params![key.report_date.format(DATE_FORMAT).to_string(), key.symbol, key.model],
                |row| row.get(0),
            )
            .optional()?;
        Ok(summary)
    }

    fn save_narrative(&self, key: &NarrativeKey, text: &str) -> Result<()> {
        self.lock()?.execute(
            "INSERT INTO ai_summaries (report_date, ticker, model, summary, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(report_date, ticker, model) DO UPDATE SET
                summary = excluded.summary,
                created_at = excluded.created_at",
            params![
                key.report_date.format(DATE_FORMAT).to_string(),
                key.symbol,
                key.model,
                text,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn clear_narratives(&self, report_date: NaiveDate) -> Result<usize> {
        let removed = self.lock()?.execute(
            "DELETE FROM ai_summaries WHERE report_date = ?1",
            params![report_date.format(DATE_FORMAT).to_string()],
        )?;
        Ok(removed)
    }
}

/// A price row before its date is validated
struct RawPrice {
    symbol: String,
    date: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: f64,
    volume: Option<i64>,
    source: Option<String>,
}

impl RawPrice {
    fn into_sample(self) -> Option<PriceSample> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()?;
        Some(PriceSample {
            symbol: self.symbol,
            date,
            open: self.open.unwrap_or(self.close),
            high: self.high.unwrap_or(self.close),
            low: self.low.unwrap_or(self.close),
            close: self.close,
            volume: self.volume.map_or(0, |v| u64::try_from(v).unwrap_or(0)),
            source: self.source.unwrap_or_default(),
        })
    }
}

fn raw_price(row: &Row<'_>) -> rusqlite::Result<RawPrice> {
    Ok(RawPrice {
        symbol: row.get(0)?,
        date: row.get(1)?,
        open: row.get(2)?,
        high: row.get(3)?,
        low: row.get(4)?,
        close: row.get(5)?,
        volume: row.get(6)?,
        source: row.get(7)?,
    })
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl MarketStore for SqliteStore {
    fn price_samples(&self) -> BriefResult<Vec<PriceSample>> {
        Ok(self.query_price_samples()?)
    }

    fn recent_news(&self, symbol: &str, limit: usize) -> BriefResult<Vec<NewsItem>> {
        Ok(self.query_recent_news(symbol, limit)?)
    }

    fn recent_closes(&self, symbol: &str, limit: usize) -> BriefResult<Vec<f64>> {
        Ok(self.query_recent_closes(symbol, limit)?)
    }
}

#[async_trait]
impl NarrativeCache for SqliteStore {
    async fn get(&self, key: &NarrativeKey) -> BriefResult<Option<String>> {
        Ok(self.query_narrative(key)?)
    }

    async fn put(&self, key: NarrativeKey, text: String) -> BriefResult<()> {
        Ok(self.save_narrative(&key, &text)?)
    }

    async fn invalidate(&self, report_date: NaiveDate) -> BriefResult<usize> {
        let removed = self.clear_narratives(report_date)?;
        debug!("Removed {} cached narratives for {}", removed, report_date);
        Ok(removed)
    }
}
