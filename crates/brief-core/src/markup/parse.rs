//! Markup text → Report
//!
//! A line-scanning state machine. Each line is classified by its prefix and
//! the current mode; anything unrecognised is skipped, so the parser never
//! fails and a damaged file still yields every section it can.

use super::grammar;
use crate::aggregate::is_absolute_url;
use crate::model::{KeyField, NewsDisplayItem, Report, ReportSection};
use regex::Regex;
use std::sync::LazyLock;

static ITEM_BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s{2}-\s+(.*)$").unwrap_or_else(|e| panic!("invalid item pattern: {e}"))
});

static DETAIL_BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s{4}-\s+(.*)$").unwrap_or_else(|e| panic!("invalid detail pattern: {e}"))
});

/// What indented lines currently belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    None,
    News,
    Narrative,
}

/// Incremental markup parser
#[derive(Debug)]
pub struct MarkupParser {
    report: Report,
    title_seen: bool,
    meta_seen: bool,
    current: Option<ReportSection>,
    mode: Mode,
    /// Detail bullets attach only while a headline item is open
    item_open: bool,
}

impl Default for MarkupParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupParser {
    pub fn new() -> Self {
        Self {
            report: Report::default(),
            title_seen: false,
            meta_seen: false,
            current: None,
            mode: Mode::None,
            item_open: false,
        }
    }

    /// Consume one line (without its terminator)
    pub fn feed_line(&mut self, raw: &str) {
        let line = raw.trim_end_matches(['\r', '\n']);

        if let Some(title) = line.strip_prefix(grammar::TITLE) {
            if !self.title_seen {
                self.report.title = title.trim().to_string();
                self.title_seen = true;
            }
            return;
        }

        if let Some(meta) = line.strip_prefix(grammar::META) {
            if !self.meta_seen && self.current.is_none() && self.report.sections.is_empty() {
                self.report.meta_line = Some(meta.trim().to_string());
                self.meta_seen = true;
            }
            return;
        }

        if let Some(symbol) = line.strip_prefix(grammar::SECTION) {
            self.close_section();
            self.current = Some(ReportSection::new(symbol.trim()));
            self.mode = Mode::None;
            self.item_open = false;
            return;
        }

        let Some(section) = self.current.as_mut() else {
            return;
        };

        for field in KeyField::ALL {
            if line.starts_with(&grammar::key_prefix(field)) {
                if let Some((_, value)) = line.split_once(':') {
                    section.key_values.insert(field, value.trim().to_string());
                }
                return;
            }
        }

        if line.starts_with(grammar::LEGACY_LATEST) {
            apply_legacy_latest(section, line);
            return;
        }

        if line.starts_with(grammar::NEWS_MARKER) {
            self.mode = Mode::News;
            self.item_open = false;
            return;
        }

        if line.starts_with(grammar::NARRATIVE_HEADER)
            || line.starts_with(grammar::LEGACY_NARRATIVE_HEADER)
        {
            self.mode = Mode::Narrative;
            return;
        }

        match self.mode {
            Mode::News => parse_news_line(section, line, &mut self.item_open),
            Mode::Narrative => parse_narrative_line(section, line),
            Mode::None => {}
        }
    }

    /// Flush the open section and return the report
    pub fn finish(mut self) -> Report {
        self.close_section();
        self.report
    }

    fn close_section(&mut self) {
        let Some(section) = self.current.take() else {
            return;
        };

        // A repeated symbol replaces the earlier block in place
        match self
            .report
            .sections
            .iter_mut()
            .find(|s| s.symbol == section.symbol)
        {
            Some(existing) => *existing = section,
            None => self.report.sections.push(section),
        }
    }
}

/// Parse a complete markup text
pub fn parse(text: &str) -> Report {
    let mut parser = MarkupParser::new();
    for line in text.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

fn parse_news_line(section: &mut ReportSection, line: &str, item_open: &mut bool) {
    if let Some(caps) = ITEM_BULLET.captures(line) {
        let text = caps.get(1).map_or("", |m| m.as_str()).trim();
        *item_open = text != grammar::NO_NEWS;
        if *item_open {
            section.news.push(NewsDisplayItem::new(text));
        }
        return;
    }

    if let Some(caps) = DETAIL_BULLET.captures(line) {
        if !*item_open {
            return;
        }
        let Some(item) = section.news.last_mut() else {
            return;
        };
        let text = caps.get(1).map_or("", |m| m.as_str()).trim();
        if let Some(summary) = strip_prefix_ignore_case(text, grammar::DETAIL_SUMMARY_LABEL) {
            item.summary = summary.trim().to_string();
        } else if is_absolute_url(text) {
            item.url = text.to_string();
        }
    }
}

fn parse_narrative_line(section: &mut ReportSection, line: &str) {
    if let Some(caps) = ITEM_BULLET.captures(line) {
        let text = caps.get(1).map_or("", |m| m.as_str()).trim();
        if section.narrative.is_empty() {
            section.narrative = text.to_string();
        } else {
            section.narrative.push('\n');
            section.narrative.push_str(text);
        }
        return;
    }

    let trimmed = line.trim();
    if !trimmed.is_empty() && !line.starts_with("- ") {
        if section.narrative.is_empty() {
            section.narrative = trimmed.to_string();
        } else {
            section.narrative.push(' ');
            section.narrative.push_str(trimmed);
        }
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// `- Latest: <date> | Close: <close> | Vol: <volume>`
fn apply_legacy_latest(section: &mut ReportSection, line: &str) {
    let Some((_, rest)) = line.split_once(':') else {
        return;
    };

    for (i, part) in rest.split('|').enumerate() {
        let part = part.trim();
        let (field, value) = match (i, part.split_once(':')) {
            (0, _) => (KeyField::Date, part),
            (_, Some(("Close", v))) => (KeyField::Close, v.trim()),
            (_, Some(("Vol", v))) => (KeyField::Volume, v.trim()),
            _ => continue,
        };
        if !value.is_empty() {
            section.key_values.insert(field, value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Daily Market Report (2026-01-11)
## Symbols: 2 | Narrative model: gpt-5-mini

### ACME
- Date: 2026-01-10 → 2026-01-11
- Close: 10.00 → 10.50 (+5.00%)
- Volume: 100,000
- 20D Range: low 10.00, high 10.50, position 1.00
- News (headline + summary):
  - 2026-01-11 14:35 | Wire | ACME ships widgets
    - Summary: Shipments doubled.
    - https://news.example.com/acme
  - 2026-01-11 09:00 | Desk | Second story
- Summary:
  - ACME rose 5%.
  - Watch next: earnings.

### BOLT
- Date: 2026-01-11
- Close: 3.00 (needs more data)
- News (headline + summary):
  - (no recent news)
- Summary:
  - (need at least 2 trading days of price data)
";

    #[test]
    fn test_parse_sample() {
        let report = parse(SAMPLE);

        assert_eq!(report.title, "Daily Market Report (2026-01-11)");
        assert_eq!(
            report.meta_line.as_deref(),
            Some("Symbols: 2 | Narrative model: gpt-5-mini")
        );
        assert_eq!(report.symbols(), vec!["ACME", "BOLT"]);

        let acme = report.section("ACME").unwrap();
        assert_eq!(acme.value(KeyField::Date), Some("2026-01-10 → 2026-01-11"));
        assert_eq!(acme.value(KeyField::Close), Some("10.00 → 10.50 (+5.00%)"));
        assert_eq!(acme.value(KeyField::Volume), Some("100,000"));
        assert_eq!(
            acme.value(KeyField::Range),
            Some("low 10.00, high 10.50, position 1.00")
        );
        assert_eq!(acme.news.len(), 2);
        assert_eq!(acme.news[0].summary, "Shipments doubled.");
        assert_eq!(acme.news[0].url, "https://news.example.com/acme");
        assert_eq!(acme.news[1].display_line, "2026-01-11 09:00 | Desk | Second story");
        assert_eq!(acme.news[1].summary, "");
        assert_eq!(acme.narrative, "ACME rose 5%.\nWatch next: earnings.");

        let bolt = report.section("BOLT").unwrap();
        assert!(bolt.news.is_empty());
        assert_eq!(bolt.value(KeyField::Volume), None);
        assert_eq!(bolt.narrative, "(need at least 2 trading days of price data)");
    }

    #[test]
    fn test_unknown_line_is_ignored() {
        let with_noise = SAMPLE.replace(
            "- Volume: 100,000\n",
            "- Volume: 100,000\n- Beta: 1.2 (added later)\n",
        );
        assert_eq!(parse(&with_noise), parse(SAMPLE));

        let with_comment = SAMPLE.replace(
            "  - ACME rose 5%.\n",
            "  - ACME rose 5%.\n<!-- reviewer note -->\n",
        );
        // A non-bullet line inside the narrative is a continuation, not noise
        assert_ne!(parse(&with_comment), parse(SAMPLE));
    }

    #[test]
    fn test_soft_wrapped_narrative() {
        let text = "\
### ACME
- Summary:
  - Shares rose after the
    product launch and
  strong guidance.
  - Watch next: margins.
";
        let report = parse(text);
        assert_eq!(
            report.sections[0].narrative,
            "Shares rose after the product launch and strong guidance.\nWatch next: margins."
        );
    }

    #[test]
    fn test_legacy_headers() {
        let text = "\
### ACME
- Latest: 2026-01-11 | Close: 10.50 | Vol: 100,000
- AI Summary:
  - Only one day of data.
";
        let section = &parse(text).sections[0];
        assert_eq!(section.value(KeyField::Date), Some("2026-01-11"));
        assert_eq!(section.value(KeyField::Close), Some("10.50"));
        assert_eq!(section.value(KeyField::Volume), Some("100,000"));
        assert_eq!(section.narrative, "Only one day of data.");
    }

    #[test]
    fn test_news_bullet_before_news_header_is_ignored() {
        let text = "\
### ACME
  - stray bullet
    - Summary: stray summary
- News (headline + summary):
  - real item
    - SUMMARY: upper-case label
    - not a url
";
        let section = &parse(text).sections[0];
        assert_eq!(section.news.len(), 1);
        assert_eq!(section.news[0].display_line, "real item");
        assert_eq!(section.news[0].summary, "upper-case label");
        assert_eq!(section.news[0].url, "");
        assert_eq!(section.narrative, "");
    }

    #[test]
    fn test_detail_after_placeholder_is_dropped() {
        let text = "\
### ACME
- News (headline + summary):
  - first story
    - Summary: first summary
  - (no recent news)
    - Summary: orphan summary
    - https://news.example.com/orphan
  - second story
    - Summary: second summary
";
        let section = &parse(text).sections[0];
        assert_eq!(section.news.len(), 2);
        assert_eq!(section.news[0].summary, "first summary");
        assert_eq!(section.news[0].url, "");
        assert_eq!(section.news[1].summary, "second summary");
    }

    #[test]
    fn test_repeated_news_header_closes_open_item() {
        let text = "\
### ACME
- News (headline + summary):
  - only story
    - https://news.example.com/story
- News (headline + summary):
    - Summary: belongs to nothing
    - https://news.example.com/other
";
        let section = &parse(text).sections[0];
        assert_eq!(section.news.len(), 1);
        assert_eq!(section.news[0].summary, "");
        assert_eq!(section.news[0].url, "https://news.example.com/story");
    }

    #[test]
    fn test_lines_outside_sections_are_ignored() {
        let text = "\
- Date: orphan
  - orphan bullet
# Title
# Second title
### ACME
- Volume: 5
## late meta
";
        let report = parse(text);
        assert_eq!(report.title, "Title");
        assert_eq!(report.meta_line, None);
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].value(KeyField::Date), None);
        assert_eq!(report.sections[0].value(KeyField::Volume), Some("5"));
    }

    #[test]
    fn test_duplicate_symbol_last_block_wins() {
        let text = "\
### ACME
- Volume: 1
### BOLT
- Volume: 2
### ACME
- Volume: 3
";
        let report = parse(text);
        assert_eq!(report.symbols(), vec!["ACME", "BOLT"]);
        assert_eq!(report.sections[0].value(KeyField::Volume), Some("3"));
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert_eq!(parse(""), Report::default());

        // Header-looking lines without the separating space are not headers
        assert_eq!(parse("\u{0}\u{1}binary junk\n###\n####x\n#no-space\n"), Report::default());

        let report = parse("### \n- Volume: 1\n");
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].symbol, "");
    }

    #[test]
    fn test_crlf_line_endings() {
        let report = parse(&SAMPLE.replace('\n', "\r\n"));
        assert_eq!(report, parse(SAMPLE));
    }
}
