//! Plain-text pages, separated by form feeds

use super::{DocumentFormat, PageWriter};
use crate::error::Result;
use crate::layout::{Document, Element, Page};
use comfy_table::presets::ASCII_FULL;
use comfy_table::{ContentArrangement, Table};

const FORM_FEED: char = '\u{000C}';

/// Writes each page as a block of text; key/value rows become a table
#[derive(Debug, Clone)]
pub struct TextPageWriter {
    width: u16,
}

impl Default for TextPageWriter {
    fn default() -> Self {
        Self { width: 96 }
    }
}

impl TextPageWriter {
    pub fn with_width(width: u16) -> Self {
        Self { width }
    }

    pub fn render(&self, document: &Document) -> String {
        document
            .pages
            .iter()
            .map(|page| self.write_page(document, page))
            .collect::<Vec<_>>()
            .join(&FORM_FEED.to_string())
    }

    fn write_page(&self, document: &Document, page: &Page) -> String {
        let mut out = String::new();
        out.push_str(&document.header);
        out.push_str("\n\n");

        let mut table: Option<Table> = None;
        for placed in &page.elements {
            if let Element::KeyValueRow {
                label, value_lines, ..
            } = &placed.element
            {
                table
                    .get_or_insert_with(|| self.new_table())
                    .add_row(vec![label.to_string(), value_lines.join(" ")]);
                continue;
            }
            if let Some(t) = table.take() {
                out.push_str(&t.to_string());
                out.push('\n');
            }
            write_element(&mut out, &placed.element);
        }
        if let Some(t) = table.take() {
            out.push_str(&t.to_string());
            out.push('\n');
        }

        out.push('\n');
        out.push_str(&page.footer());
        out.push('\n');
        out
    }

    fn new_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(ASCII_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_width(self.width);
        table
    }
}

impl PageWriter for TextPageWriter {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Text
    }

    fn write(&self, document: &Document) -> Result<Vec<u8>> {
        Ok(self.render(document).into_bytes())
    }
}

fn write_element(out: &mut String, element: &Element) {
    match element {
        Element::Title { lines } | Element::Meta { lines } => {
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        Element::Banner { symbol } => {
            out.push_str(&format!("== {symbol} ==\n"));
        }
        Element::Heading { text } => {
            out.push_str(&format!("\n{text}\n"));
        }
        Element::NewsItem { lines, .. } => push_indented(out, lines, 2),
        Element::NewsSummary { lines } => push_indented(out, lines, 5),
        Element::NewsLink { href, text } => {
            out.push_str(&format!("     {text} <{href}>\n"));
        }
        Element::Placeholder { text } => {
            out.push_str(&format!("  {text}\n"));
        }
        Element::NarrativeLine { text, .. } => {
            out.push_str(&format!("  | {text}\n"));
        }
        Element::KeyValueRow { .. } | Element::Gap => {}
    }
}

fn push_indented(out: &mut String, lines: &[String], indent: usize) {
    for line in lines {
        out.push_str(&" ".repeat(indent));
        out.push_str(line);
        out.push('\n');
    }
}
