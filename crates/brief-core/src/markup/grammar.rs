//! Line grammar of the report markup (version 1)
//!
//! ```text
//! # <title>
//! ## <meta line>
//! ### <symbol>
//! - Date: <value>
//! - Close: <value>
//! - Volume: <value>
//! - 20D Range: <value>
//! - News (headline + summary):
//!   - <display line>
//!     - Summary: <summary>
//!     - <absolute url>
//! - Summary:
//!   - <narrative line>
//!     <soft-wrapped continuation>
//! ```
//!
//! Every construct is recognised by its line prefix alone. Writers and readers
//! share only these constants, never in-memory state.

use crate::model::KeyField;

pub const TITLE: &str = "# ";
pub const META: &str = "## ";
pub const SECTION: &str = "### ";

/// Prefix that switches to news mode
pub const NEWS_MARKER: &str = "- News";
/// Full news header as written
pub const NEWS_HEADER: &str = "- News (headline + summary):";

pub const NARRATIVE_HEADER: &str = "- Summary:";
/// Header used by older reports
pub const LEGACY_NARRATIVE_HEADER: &str = "- AI Summary:";

/// Single-line form older reports used for symbols with one sample
pub const LEGACY_LATEST: &str = "- Latest:";

/// Two-space bullet: news item or narrative line
pub const ITEM: &str = "  - ";
/// Four-space bullet: news summary or url
pub const DETAIL: &str = "    - ";
/// Four-space indent without a bullet: narrative continuation
pub const CONTINUATION: &str = "    ";

pub const DETAIL_SUMMARY_LABEL: &str = "Summary:";

/// Bullet written in place of an empty news list
pub const NO_NEWS: &str = "(no recent news)";

/// Key/value line prefix for a field, e.g. `- Date:`
pub fn key_prefix(field: KeyField) -> String {
    format!("- {}:", field.label())
}
