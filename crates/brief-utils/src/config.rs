//! Configuration loading
//!
//! Precedence: explicit overrides, then the process environment (which
//! `.env` feeds), then [`BriefConfig::default`].

use brief_core::{BriefConfig, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load `.env` from the working directory or its parents, if present
///
/// Variables already set in the process environment are not overwritten.
pub fn load_env_file() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(_) => None,
    }
}

/// Load a specific env file, failing if it cannot be read
pub fn load_env_file_from(path: &Path) -> Result<()> {
    dotenvy::from_path(path).map_err(|e| {
        brief_core::BriefError::Config(format!("cannot load {}: {e}", path.display()))
    })
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub model: Option<String>,
}

impl ConfigOverrides {
    /// Resolve the final configuration
    pub fn resolve(self) -> Result<BriefConfig> {
        let mut builder = BriefConfig::builder();
        if let Some(path) = self.db_path {
            builder = builder.db_path(path);
        }
        if let Some(dir) = self.output_dir {
            builder = builder.output_dir(dir);
        }
        if let Some(model) = self.model {
            builder = builder.model(model);
        }
        builder.with_env().build()
    }
}
