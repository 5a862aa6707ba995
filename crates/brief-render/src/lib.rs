//! Paginated document rendering for market-brief
//!
//! The renderer consumes only the markup text (through the parser), never the
//! in-memory report that produced it, so a document can always be rebuilt
//! from a stored markup file.

pub mod error;
pub mod layout;
pub mod style;
pub mod text;
pub mod writer;

pub use error::{RenderError, Result};
pub use layout::{Document, Element, LayoutEngine, Page};
pub use writer::{
    DocumentFormat, HtmlPageWriter, PageWriter, PdfPageWriter, TextPageWriter, WriterFactory,
};

use brief_core::files::{document_path, read_markup, report_date_from_path, write_artifact};
use brief_core::markup;
use brief_core::model::Report;
use std::path::{Path, PathBuf};
use tracing::info;

/// Lays out a report and hands it to a page writer
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    layout: LayoutEngine,
}

impl DocumentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self, report: &Report) -> Document {
        self.layout.layout(report)
    }

    pub fn render(&self, report: &Report, format: DocumentFormat) -> Result<Vec<u8>> {
        WriterFactory::create(format).write(&self.layout(report))
    }

    /// Parse markup text and render it
    pub fn render_markup(&self, markup_text: &str, format: DocumentFormat) -> Result<Vec<u8>> {
        self.render(&markup::parse(markup_text), format)
    }

    /// Render a stored markup file into `document_dir`, returning the document path
    ///
    /// The document is named after the report date in the markup file name,
    /// or after the markup file's stem when the name carries no date.
    pub fn render_markup_file(
        &self,
        markup_path: &Path,
        document_dir: &Path,
        format: DocumentFormat,
    ) -> Result<PathBuf> {
        let markup_text = read_markup(markup_path)?;
        let report = markup::parse(&markup_text);
        let document = self.layout(&report);

        let out = match report_date_from_path(markup_path) {
            Some(date) => document_path(document_dir, date, format.extension()),
            None => {
                let stem = markup_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("report");
                document_dir.join(format!("{stem}.{}", format.extension()))
            }
        };

        let contents = WriterFactory::create(format).write(&document)?;
        write_artifact(&out, &contents)?;
        info!(
            "Rendered {} sections on {} pages to {}",
            report.sections.len(),
            document.pages.len(),
            out.display()
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MARKUP: &str = "\
# Daily Market Report (2026-01-11)
## Symbols: 1 | Narrative model: gpt-5-mini

### ACME
- Date: 2026-01-10 → 2026-01-11
- Close: 10.00 → 10.50 (+5.00%)
- Volume: 100,000
- 20D Range: low 10.00, high 10.50, position 1.00
- News (headline + summary):
  - (no recent news)
- Summary:
  - ACME rose 5%.
";

    #[test]
    fn test_render_markup_text() {
        let bytes = DocumentRenderer::new()
            .render_markup(MARKUP, DocumentFormat::Text)
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("== ACME =="));
        assert!(text.contains("No recent news."));
        assert!(text.contains("  | ACME rose 5%."));
    }

    #[test]
    fn test_render_markup_file_named_by_date() {
        let tmp = TempDir::new().unwrap();
        let md = tmp.path().join("md").join("report_2026-01-11.md");
        write_artifact(&md, MARKUP).unwrap();

        let docs = tmp.path().join("docs");
        let out = DocumentRenderer::new()
            .render_markup_file(&md, &docs, DocumentFormat::Html)
            .unwrap();

        assert_eq!(out, docs.join("report_2026-01-11.html"));
        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.contains("Daily Market Report (2026-01-11)"));
        assert!(html.contains("position 1.00"));
    }

    #[test]
    fn test_render_markup_file_as_pdf() {
        let tmp = TempDir::new().unwrap();
        let md = tmp.path().join("md").join("report_2026-01-11.md");
        write_artifact(&md, MARKUP).unwrap();

        let docs = tmp.path().join("docs");
        let out = DocumentRenderer::new()
            .render_markup_file(&md, &docs, DocumentFormat::default())
            .unwrap();

        assert_eq!(out, docs.join("report_2026-01-11.pdf"));
        let bytes = std::fs::read(&out).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_markup_file_without_date() {
        let tmp = TempDir::new().unwrap();
        let md = tmp.path().join("draft.md");
        write_artifact(&md, "garbage\n").unwrap();

        let out = DocumentRenderer::new()
            .render_markup_file(&md, tmp.path(), DocumentFormat::Text)
            .unwrap();
        assert_eq!(out, tmp.path().join("draft.txt"));
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("Daily Market Report\n"));
    }

    #[test]
    fn test_missing_markup_file() {
        let tmp = TempDir::new().unwrap();
        let err = DocumentRenderer::new()
            .render_markup_file(&tmp.path().join("nope.md"), tmp.path(), DocumentFormat::Html)
            .unwrap_err();
        assert!(matches!(err, RenderError::Core(brief_core::BriefError::Io(_))));
    }
}
