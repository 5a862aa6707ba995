//! Shared utilities for market-brief
//!
//! This crate provides the pieces every entry point needs: tracing setup and
//! resolving a [`brief_core::BriefConfig`] from `.env`, the environment and
//! command-line overrides.

pub mod config;
pub mod logging;

pub use config::{ConfigOverrides, load_env_file, load_env_file_from};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
