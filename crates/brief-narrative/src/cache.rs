//! In-memory narrative cache

use async_trait::async_trait;
use brief_core::error::Result;
use brief_core::narrative::{NarrativeCache, NarrativeKey};
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local cache, used when narratives should not outlive the run
#[derive(Debug, Default)]
pub struct MemoryNarrativeCache {
    entries: RwLock<HashMap<NarrativeKey, String>>,
}

impl MemoryNarrativeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl NarrativeCache for MemoryNarrativeCache {
    async fn get(&self, key: &NarrativeKey) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: NarrativeKey, text: String) -> Result<()> {
        self.entries.write().await.insert(key, text);
        Ok(())
    }

    async fn invalidate(&self, report_date: NaiveDate) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| key.report_date != report_date);
        Ok(before - entries.len())
    }
}
