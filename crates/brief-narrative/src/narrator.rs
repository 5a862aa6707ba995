//! Cached narrator
//!
//! Looks up (report date, symbol, model) in the cache and only calls the chat
//! provider on a miss. A cache that cannot be read or written degrades to
//! uncached generation rather than failing the symbol.

use crate::prompt::NarrativePrompt;
use crate::provider::{ChatProvider, ChatRequest};
use async_trait::async_trait;
use brief_core::error::{BriefError, Result};
use brief_core::narrative::{NarrativeCache, NarrativeContext, NarrativeKey, NarrativeSource};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// [`NarrativeSource`] backed by a chat provider and a cache
pub struct CachedNarrator {
    provider: Arc<dyn ChatProvider>,
    cache: Arc<dyn NarrativeCache>,
    prompt: NarrativePrompt,
    model: String,
}

impl CachedNarrator {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        cache: Arc<dyn NarrativeCache>,
        prompt: NarrativePrompt,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            cache,
            prompt,
            model: model.into(),
        }
    }

    async fn cached(&self, key: &NarrativeKey) -> Option<String> {
        match self.cache.get(key).await {
            Ok(Some(text)) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                warn!(symbol = %key.symbol, error = %e, "Narrative cache read failed");
                None
            }
        }
    }
}

#[async_trait]
impl NarrativeSource for CachedNarrator {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn get_or_compute(
        &self,
        report_date: NaiveDate,
        context: &NarrativeContext,
    ) -> Result<String> {
        let key = NarrativeKey::new(report_date, context.symbol(), &self.model);
        if let Some(text) = self.cached(&key).await {
            debug!(symbol = %key.symbol, "Narrative cache hit");
            return Ok(text);
        }

        let prompt = self.prompt.render(context).map_err(BriefError::from)?;
        let text = self
            .provider
            .complete(ChatRequest::new(&self.model, prompt))
            .await
            .map_err(BriefError::from)?;

        info!(
            symbol = %key.symbol,
            provider = self.provider.name(),
            "Generated narrative ({} chars)",
            text.len()
        );

        if let Err(e) = self.cache.put(key, text.clone()).await {
            warn!(symbol = %context.symbol(), error = %e, "Narrative cache write failed");
        }
        Ok(text)
    }

    async fn invalidate(&self, report_date: NaiveDate) -> Result<usize> {
        self.cache.invalidate(report_date).await
    }
}
