//! Report → markup text

use super::grammar;
use crate::format::single_line;
use crate::model::{KeyField, Report, ReportSection};

/// Default wrap column for narrative lines
pub const DEFAULT_WRAP_WIDTH: usize = 96;

/// Writes a [`Report`] in the markup grammar
#[derive(Debug, Clone)]
pub struct MarkupWriter {
    wrap_width: usize,
}

impl Default for MarkupWriter {
    fn default() -> Self {
        Self::new(DEFAULT_WRAP_WIDTH)
    }
}

impl MarkupWriter {
    pub fn new(wrap_width: usize) -> Self {
        Self { wrap_width }
    }

    /// Serialize the whole report; sections are ordered by symbol
    pub fn write(&self, report: &Report) -> String {
        let mut lines = Vec::new();
        lines.push(format!("{}{}", grammar::TITLE, single_line(&report.title)));
        if let Some(meta) = &report.meta_line {
            lines.push(format!("{}{}", grammar::META, single_line(meta)));
        }
        lines.push(String::new());

        let mut sections: Vec<&ReportSection> = report.sections.iter().collect();
        sections.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        for section in sections {
            self.write_section(section, &mut lines);
            lines.push(String::new());
        }

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    fn write_section(&self, section: &ReportSection, lines: &mut Vec<String>) {
        lines.push(format!("{}{}", grammar::SECTION, single_line(&section.symbol)));

        for field in KeyField::ALL {
            if let Some(value) = section.value(field) {
                lines.push(format!(
                    "{} {}",
                    grammar::key_prefix(field),
                    single_line(value)
                ));
            }
        }

        lines.push(grammar::NEWS_HEADER.to_string());
        if section.news.is_empty() {
            lines.push(format!("{}{}", grammar::ITEM, grammar::NO_NEWS));
        }
        for item in &section.news {
            lines.push(format!("{}{}", grammar::ITEM, single_line(&item.display_line)));
            let summary = single_line(&item.summary);
            if !summary.is_empty() {
                lines.push(format!(
                    "{}{} {}",
                    grammar::DETAIL,
                    grammar::DETAIL_SUMMARY_LABEL,
                    summary
                ));
            }
            let url = item.url.trim();
            if !url.is_empty() {
                lines.push(format!("{}{}", grammar::DETAIL, url));
            }
        }

        lines.push(grammar::NARRATIVE_HEADER.to_string());
        for paragraph in section.narrative.lines() {
            let paragraph = single_line(paragraph);
            if paragraph.is_empty() {
                continue;
            }
            let width = self.wrap_width.saturating_sub(grammar::ITEM.len()).max(1);
            for (i, chunk) in wrap_words(&paragraph, width).into_iter().enumerate() {
                let prefix = if i == 0 {
                    grammar::ITEM
                } else {
                    grammar::CONTINUATION
                };
                lines.push(format!("{prefix}{chunk}"));
            }
        }
    }
}

/// Serialize with the default wrap width
pub fn serialize(report: &Report) -> String {
    MarkupWriter::default().write(report)
}

/// Greedy word wrap; words longer than `width` get a line of their own
fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            out.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
    out
}
