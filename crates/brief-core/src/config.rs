//! Configuration for report generation

use crate::error::{BriefError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default narrative model identifier
pub const DEFAULT_MODEL: &str = "gpt-5-mini";

/// Configuration for a report generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefConfig {
    /// Path of the SQLite database holding prices and news
    pub db_path: PathBuf,

    /// Root directory for report artifacts (`md/` and `docs/` live below it)
    pub output_dir: PathBuf,

    /// Model identifier used for narratives and as part of the cache key
    pub model: String,

    /// Maximum number of news items per symbol
    pub news_limit: usize,

    /// Number of most recent closes used for the range
    pub range_window: usize,

    /// Report title prefix, followed by the report date
    pub title_prefix: String,

    /// Column at which narrative lines are soft-wrapped in the markup
    pub wrap_width: usize,
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("market.db"),
            output_dir: PathBuf::from("repo"),
            model: DEFAULT_MODEL.to_string(),
            news_limit: 3,
            range_window: 20,
            title_prefix: "Daily Market Report".to_string(),
            wrap_width: 96,
        }
    }
}

impl BriefConfig {
    /// Create a new configuration builder
    pub fn builder() -> BriefConfigBuilder {
        BriefConfigBuilder::default()
    }

    /// Load overrides from `SQLITE_PATH`, `BRIEF_OUTPUT_DIR` and `OPENAI_MODEL`
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.news_limit == 0 {
            return Err(BriefError::Config(
                "news_limit must be greater than 0".to_string(),
            ));
        }

        if self.range_window == 0 {
            return Err(BriefError::Config(
                "range_window must be greater than 0".to_string(),
            ));
        }

        if self.wrap_width < 20 {
            return Err(BriefError::Config(
                "wrap_width must be at least 20 columns".to_string(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(BriefError::Config("model must not be empty".to_string()));
        }

        Ok(())
    }

    /// Directory holding markup files
    pub fn markup_dir(&self) -> PathBuf {
        self.output_dir.join("md")
    }

    /// Directory holding rendered documents
    pub fn document_dir(&self) -> PathBuf {
        self.output_dir.join("docs")
    }
}

/// Builder for BriefConfig
#[derive(Debug, Default)]
pub struct BriefConfigBuilder {
    db_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    model: Option<String>,
    news_limit: Option<usize>,
    range_window: Option<usize>,
    title_prefix: Option<String>,
    wrap_width: Option<usize>,
}

impl BriefConfigBuilder {
    /// Set the database path
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    /// Set the artifact root directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the narrative model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the per-symbol news limit
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Set the range window length
    pub fn range_window(mut self, window: usize) -> Self {
        self.range_window = Some(window);
        self
    }

    /// Set the title prefix
    pub fn title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = Some(prefix.into());
        self
    }

    /// Set the narrative wrap width
    pub fn wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = Some(width);
        self
    }

    /// Fill unset fields from the environment
    pub fn with_env(mut self) -> Self {
        if self.db_path.is_none() {
            if let Ok(path) = std::env::var("SQLITE_PATH") {
                self.db_path = Some(PathBuf::from(path));
            }
        }
        if self.output_dir.is_none() {
            if let Ok(dir) = std::env::var("BRIEF_OUTPUT_DIR") {
                self.output_dir = Some(PathBuf::from(dir));
            }
        }
        if self.model.is_none() {
            if let Ok(model) = std::env::var("OPENAI_MODEL") {
                self.model = Some(model);
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<BriefConfig> {
        let defaults = BriefConfig::default();

        let config = BriefConfig {
            db_path: self.db_path.unwrap_or(defaults.db_path),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            model: self.model.unwrap_or(defaults.model),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            range_window: self.range_window.unwrap_or(defaults.range_window),
            title_prefix: self.title_prefix.unwrap_or(defaults.title_prefix),
            wrap_width: self.wrap_width.unwrap_or(defaults.wrap_width),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BriefConfig::default();
        assert_eq!(config.news_limit, 3);
        assert_eq!(config.range_window, 20);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = BriefConfig::builder()
            .output_dir("/tmp/brief")
            .news_limit(5)
            .model("local-model")
            .build()
            .unwrap();

        assert_eq!(config.news_limit, 5);
        assert_eq!(config.model, "local-model");
        assert_eq!(config.markup_dir(), PathBuf::from("/tmp/brief/md"));
        assert_eq!(config.document_dir(), PathBuf::from("/tmp/brief/docs"));
    }

    #[test]
    fn test_validation_rejects_zero_limits() {
        let config = BriefConfig {
            news_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = BriefConfig {
            range_window: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_narrow_wrap() {
        let result = BriefConfig::builder().wrap_width(10).build();
        assert!(matches!(result, Err(BriefError::Config(_))));
    }
}
