//! Intermediate report markup
//!
//! [`serialize`] and [`parse`] are independent implementations of the line
//! grammar in [`grammar`]. The markup file is the durable artifact between
//! generation and rendering, so a document can be rebuilt from it without
//! recomputing metrics or narratives.

pub mod grammar;
pub mod parse;
pub mod serialize;

pub use parse::{parse, MarkupParser};
pub use serialize::{serialize, MarkupWriter, DEFAULT_WRAP_WIDTH};
