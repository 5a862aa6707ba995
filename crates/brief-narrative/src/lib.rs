//! Narrative generation for market-brief
//!
//! Provides the prompt, an OpenAI-compatible chat provider, an in-memory cache
//! and [`CachedNarrator`], which ties them together behind
//! [`brief_core::NarrativeSource`].

pub mod cache;
pub mod error;
pub mod narrator;
pub mod prompt;
pub mod provider;

pub use cache::MemoryNarrativeCache;
pub use error::{NarrativeError, Result};
pub use narrator::CachedNarrator;
pub use prompt::NarrativePrompt;
pub use provider::{ChatProvider, ChatRequest, OpenAiConfig, OpenAiProvider};
