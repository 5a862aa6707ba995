//! Paginated HTML
//!
//! Each page is a fixed-size Letter sheet; elements are absolutely positioned
//! inside the frame at the offsets the layout computed, so the browser's own
//! flow never changes where a page breaks. Blocks keep the layout's line
//! breaks and clip rather than rewrap.

use super::{DocumentFormat, PageWriter};
use crate::error::Result;
use crate::layout::{Document, Element, Placed};
use crate::style::{self, TextStyle};
use crate::text::{escape_attr, escape_text};

/// Writes one `<section class="page">` per page
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPageWriter;

impl PageWriter for HtmlPageWriter {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Html
    }

    fn write(&self, document: &Document) -> Result<Vec<u8>> {
        Ok(self.render(document).into_bytes())
    }
}

impl HtmlPageWriter {
    pub fn render(&self, document: &Document) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", escape_text(&document.title)));
        out.push_str("<style>\n");
        out.push_str(&stylesheet());
        out.push_str("</style>\n</head>\n<body>\n");

        for page in &document.pages {
            out.push_str(&format!(
                "<section class=\"page\" data-page=\"{}\">\n",
                page.number
            ));
            out.push_str(&format!(
                "<header class=\"running-header\">{}</header>\n",
                escape_text(&document.header)
            ));
            out.push_str("<div class=\"frame\">\n");
            for placed in &page.elements {
                write_element(&mut out, placed);
            }
            out.push_str("</div>\n");
            out.push_str(&format!(
                "<footer class=\"running-footer\">{}</footer>\n",
                escape_text(&page.footer())
            ));
            out.push_str("</section>\n");
        }

        out.push_str("</body>\n</html>\n");
        out
    }
}

fn write_element(out: &mut String, placed: &Placed) {
    let (class, body) = match &placed.element {
        Element::Gap => return,
        Element::Title { lines } => ("title", lines_html(lines)),
        Element::Meta { lines } => ("meta", lines_html(lines)),
        Element::Banner { symbol } => ("banner", escape_text(symbol)),
        Element::KeyValueRow {
            label,
            value_lines,
            shaded,
        } => (
            if *shaded { "kv kv-shaded" } else { "kv" },
            format!(
                "<span class=\"kv-label\">{}</span><span class=\"kv-value\">{}</span>",
                escape_text(label),
                lines_html(value_lines)
            ),
        ),
        Element::Heading { text } => ("heading", escape_text(text)),
        Element::NewsItem { lines, .. } => ("news-item", lines_html(lines)),
        Element::NewsSummary { lines } => ("news-summary", format!("<i>{}</i>", lines_html(lines))),
        Element::NewsLink { href, text } => (
            "news-link",
            format!(
                "<a href=\"{}\">{}</a>",
                escape_attr(href),
                escape_text(text)
            ),
        ),
        Element::Placeholder { text } => ("placeholder", escape_text(text)),
        Element::NarrativeLine { text, first, last } => {
            let class = match (first, last) {
                (true, true) => "narrative narrative-first narrative-last",
                (true, false) => "narrative narrative-first",
                (false, true) => "narrative narrative-last",
                (false, false) => "narrative",
            };
            (class, escape_text(text))
        }
    };

    out.push_str(&format!(
        "<div class=\"{class}\" style=\"top:{:.2}pt;height:{:.2}pt\">{body}</div>\n",
        placed.top, placed.height
    ));
}

fn lines_html(lines: &[String]) -> String {
    lines
        .iter()
        .map(|l| escape_text(l))
        .collect::<Vec<_>>()
        .join("<br>")
}

fn text_rule(selector: &str, s: &TextStyle) -> String {
    format!(
        "{selector} {{ font-size: {}pt; line-height: {}pt; color: {}; font-weight: {}; \
         font-style: {}; padding-top: {}pt; padding-left: {}pt; padding-right: {}pt; }}\n",
        s.font_size,
        s.leading,
        s.color,
        if s.bold { "bold" } else { "normal" },
        if s.italic { "italic" } else { "normal" },
        s.space_before,
        s.left_indent,
        s.right_indent
    )
}

fn stylesheet() -> String {
    let mut css = String::new();
    css.push_str(&format!(
        "body {{ margin: 0; background: #E5E7EB; font-family: Helvetica, Arial, sans-serif; }}\n\
         .page {{ position: relative; width: {}pt; height: {}pt; margin: 12pt auto; background: #FFFFFF; \
         overflow: hidden; break-after: page; }}\n\
         .running-header {{ position: absolute; left: {}pt; top: {}pt; font-size: {}pt; color: {}; }}\n\
         .running-footer {{ position: absolute; right: {}pt; bottom: {}pt; font-size: {}pt; color: {}; }}\n\
         .frame {{ position: absolute; left: {}pt; top: {}pt; width: {}pt; height: {}pt; }}\n\
         .frame > div {{ position: absolute; left: 0; width: {}pt; box-sizing: border-box; \
         white-space: nowrap; overflow: hidden; }}\n",
        style::PAGE_WIDTH,
        style::PAGE_HEIGHT,
        style::MARGIN_LEFT,
        style::HEADER_TOP - style::HEADER_FONT_SIZE,
        style::HEADER_FONT_SIZE,
        style::COLOR_HEADER,
        style::PAGE_WIDTH - 8.0 * style::INCH,
        style::FOOTER_BOTTOM,
        style::HEADER_FONT_SIZE,
        style::COLOR_HEADER,
        style::MARGIN_LEFT,
        style::MARGIN_TOP,
        style::FRAME_WIDTH,
        style::FRAME_HEIGHT,
        style::FRAME_WIDTH,
    ));

    css.push_str(&text_rule(".title", &style::TITLE));
    css.push_str(&text_rule(".meta", &style::META));
    css.push_str(&text_rule(".heading", &style::HEADING));
    css.push_str(&text_rule(".placeholder", &style::SMALL));
    css.push_str(&text_rule(".news-item", &style::NEWS_ITEM));
    css.push_str(&text_rule(".news-summary", &style::NEWS_SUMMARY));
    css.push_str(&text_rule(".news-link", &style::NEWS_LINK));
    css.push_str(&text_rule(".banner", &style::BANNER));
    css.push_str(&format!(
        ".banner {{ width: {}pt !important; background: {}; padding: {}pt {}pt; }}\n",
        style::BLOCK_WIDTH,
        style::COLOR_BANNER,
        style::BANNER_PADDING_Y,
        style::BANNER_PADDING_X
    ));
    css.push_str(&format!(
        ".kv {{ width: {}pt !important; display: flex; font-size: {}pt; line-height: {}pt; color: {}; \
         border: 0.5pt solid {}; padding: {}pt 0; }}\n\
         .kv-shaded {{ background: {}; }}\n\
         .kv-label {{ width: {}pt; padding: 0 {}pt; box-sizing: border-box; border-right: 0.25pt solid {}; }}\n\
         .kv-value {{ width: {}pt; padding: 0 {}pt; box-sizing: border-box; }}\n",
        style::BLOCK_WIDTH,
        style::KV_FONT_SIZE,
        style::KV_LEADING,
        style::COLOR_TEXT,
        style::COLOR_GRID,
        style::KV_PADDING_Y,
        style::COLOR_ROW_SHADED,
        style::KV_LABEL_WIDTH,
        style::KV_PADDING_X,
        style::COLOR_GRID,
        style::KV_VALUE_WIDTH,
        style::KV_PADDING_X,
    ));
    css.push_str(&text_rule(".narrative", &style::NARRATIVE));
    css.push_str(&format!(
        ".narrative {{ width: {}pt !important; background: {}; border-left: 0.6pt solid {}; \
         border-right: 0.6pt solid {}; padding-left: {}pt; padding-right: {}pt; }}\n\
         .narrative-first {{ border-top: 0.6pt solid {}; padding-top: {}pt; }}\n\
         .narrative-last {{ border-bottom: 0.6pt solid {}; }}\n",
        style::BLOCK_WIDTH,
        style::COLOR_BOX,
        style::COLOR_BOX_BORDER,
        style::COLOR_BOX_BORDER,
        style::BOX_PADDING_X + style::NARRATIVE.left_indent,
        style::BOX_PADDING_X + style::NARRATIVE.right_indent,
        style::COLOR_BOX_BORDER,
        style::BOX_PADDING_Y,
        style::COLOR_BOX_BORDER,
    ));
    css.push_str("@media print { body { background: none; } .page { margin: 0; } }\n");
    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutEngine;
    use brief_core::model::{KeyField, NewsDisplayItem, Report, ReportSection};

    fn document() -> Document {
        let report = Report::new("Daily <Market> Report & Co")
            .with_meta("Symbols: 1")
            .with_section(
                ReportSection::new("AC&ME")
                    .with_value(KeyField::Close, "10.00 → 10.50 (+5.00%)")
                    .with_news(
                        NewsDisplayItem::new("2026-01-11 14:35 | Wire | <script>alert(1)</script>")
                            .with_summary("Up & away")
                            .with_url("https://news.example.com/a?x=\"1\"&y=2"),
                    )
                    .with_narrative("Shares <rose>."),
            );
        LayoutEngine::new().layout(&report)
    }

    #[test]
    fn test_document_structure() {
        let html = HtmlPageWriter.render(&document());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert_eq!(html.matches("<section class=\"page\"").count(), 1);
        assert!(html.contains("<footer class=\"running-footer\">Page 1</footer>"));
        assert!(html.contains("<title>Daily &lt;Market&gt; Report &amp; Co</title>"));
        assert!(html.contains("<span class=\"kv-label\">Close</span>"));
    }

    #[test]
    fn test_content_is_escaped() {
        let html = HtmlPageWriter.render(&document());

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains(">AC&amp;ME</div>"));
        assert!(html.contains("<i>Up &amp; away</i>"));
        assert!(html.contains("Shares &lt;rose&gt;."));
        assert!(html.contains("href=\"https://news.example.com/a?x=&quot;1&quot;&amp;y=2\""));
    }

    #[test]
    fn test_positioned_blocks_never_rewrap() {
        let html = HtmlPageWriter.render(&document());
        let rule = html
            .lines()
            .find(|l| l.starts_with(".frame > div"))
            .unwrap();
        assert!(rule.contains("white-space: nowrap"));
        assert!(rule.contains("overflow: hidden"));
    }

    #[test]
    fn test_gaps_are_not_written() {
        let html = HtmlPageWriter.render(&document());
        assert!(!html.contains("class=\"gap\""));
        assert!(html.contains("class=\"narrative narrative-first narrative-last\""));
    }
}
