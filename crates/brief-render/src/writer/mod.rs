//! Page writers
//!
//! A writer turns a laid-out [`Document`] into file contents. One writer
//! exists per output format; [`WriterFactory`] picks it.

mod html;
mod pdf;
mod text;

pub use html::HtmlPageWriter;
pub use pdf::PdfPageWriter;
pub use text::TextPageWriter;

use crate::error::{RenderError, Result};
use crate::layout::Document;
use std::fmt;
use std::str::FromStr;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Pdf,
    Html,
    Text,
}

impl DocumentFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Text => "txt",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Html => write!(f, "html"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "html" | "htm" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            other => Err(RenderError::UnknownFormat(other.to_string())),
        }
    }
}

pub trait PageWriter: Send + Sync {
    fn format(&self) -> DocumentFormat;

    /// Encode the document as file contents
    fn write(&self, document: &Document) -> Result<Vec<u8>>;
}

pub struct WriterFactory;

impl WriterFactory {
    pub fn create(format: DocumentFormat) -> Box<dyn PageWriter> {
        match format {
            DocumentFormat::Pdf => Box::new(PdfPageWriter),
            DocumentFormat::Html => Box::new(HtmlPageWriter),
            DocumentFormat::Text => Box::new(TextPageWriter::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("pdf".parse::<DocumentFormat>().unwrap(), DocumentFormat::Pdf);
        assert_eq!("html".parse::<DocumentFormat>().unwrap(), DocumentFormat::Html);
        assert_eq!(" TXT ".parse::<DocumentFormat>().unwrap(), DocumentFormat::Text);
        assert!(matches!(
            "docx".parse::<DocumentFormat>(),
            Err(RenderError::UnknownFormat(f)) if f == "docx"
        ));
    }

    #[test]
    fn test_factory() {
        for format in [DocumentFormat::Pdf, DocumentFormat::Html, DocumentFormat::Text] {
            assert_eq!(WriterFactory::create(format).format(), format);
        }
        assert_eq!(DocumentFormat::Text.extension(), "txt");
        assert_eq!(DocumentFormat::default().to_string(), "pdf");
        assert_eq!(DocumentFormat::default().extension(), "pdf");
    }
}
