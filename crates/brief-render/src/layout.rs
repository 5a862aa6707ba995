//! Layout and pagination
//!
//! A [`Report`] is turned into a flat list of flowables (each with a fixed,
//! measured height) which are then poured into pages. A symbol section is
//! kept together when it fits on a fresh page; otherwise it flows, breaking
//! between table rows, news paragraphs and narrative lines.

use crate::style::{self, TextStyle};
use crate::text::{clip_chars, fit_width, short_url, wrap};
use brief_core::model::{KeyField, NewsDisplayItem, Report, ReportSection};
use tracing::{debug, warn};

/// Title used when the report has none
pub const DEFAULT_TITLE: &str = "Daily Market Report";
pub const NO_NEWS_TEXT: &str = "No recent news.";
pub const NO_NARRATIVE_TEXT: &str = "(No AI summary.)";
pub const NEWS_HEADING: &str = "News";
pub const NARRATIVE_HEADING: &str = "Summary";

const FIT_EPSILON: f64 = 1e-6;

/// Something drawn inside the frame
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Title { lines: Vec<String> },
    Meta { lines: Vec<String> },
    Banner { symbol: String },
    KeyValueRow {
        label: &'static str,
        value_lines: Vec<String>,
        shaded: bool,
    },
    Heading { text: &'static str },
    NewsItem { number: usize, lines: Vec<String> },
    NewsSummary { lines: Vec<String> },
    NewsLink { href: String, text: String },
    Placeholder { text: &'static str },
    /// One wrapped line of the narrative box
    NarrativeLine { text: String, first: bool, last: bool },
    Gap,
}

impl Element {
    /// Wrapped text lines of a multi-line element
    fn lines(&self) -> Option<&[String]> {
        match self {
            Self::Title { lines }
            | Self::Meta { lines }
            | Self::NewsItem { lines, .. }
            | Self::NewsSummary { lines } => Some(lines),
            Self::KeyValueRow { value_lines, .. } => Some(value_lines),
            _ => None,
        }
    }

    /// Same element holding only `lines`; continuation rows drop their label
    fn with_lines(&self, lines: Vec<String>, continuation: bool) -> Self {
        match self {
            Self::Title { .. } => Self::Title { lines },
            Self::Meta { .. } => Self::Meta { lines },
            Self::NewsItem { number, .. } => Self::NewsItem {
                number: *number,
                lines,
            },
            Self::NewsSummary { .. } => Self::NewsSummary { lines },
            Self::KeyValueRow { label, shaded, .. } => Self::KeyValueRow {
                label: if continuation { "" } else { label },
                value_lines: lines,
                shaded: *shaded,
            },
            other => other.clone(),
        }
    }
}

/// An element with its vertical extent
#[derive(Debug, Clone, PartialEq)]
pub struct Flowable {
    pub height: f64,
    /// Height of one text line, zero for elements that never split
    pub leading: f64,
    pub element: Element,
}

impl Flowable {
    fn new(height: f64, element: Element) -> Self {
        Self {
            height,
            leading: 0.0,
            element,
        }
    }

    fn lines(height: f64, leading: f64, element: Element) -> Self {
        Self {
            height,
            leading,
            element,
        }
    }

    fn gap(height: f64) -> Self {
        Self::new(height, Element::Gap)
    }

    fn is_gap(&self) -> bool {
        matches!(self.element, Element::Gap)
    }

    /// Cut a multi-line element into parts no taller than `frame_height`
    ///
    /// Each part keeps the element's fixed spacing. Returns the flowable
    /// unchanged when it cannot be split.
    fn split(self, frame_height: f64) -> Vec<Flowable> {
        let Some(lines) = self.element.lines() else {
            return vec![self];
        };
        let count = lines.len();
        if count < 2 || self.leading <= 0.0 {
            return vec![self];
        }

        let spacing = (self.height - self.leading * count as f64).max(0.0);
        let per_part = (((frame_height - spacing) / self.leading).floor().max(1.0)) as usize;
        if per_part >= count {
            return vec![self];
        }

        lines
            .chunks(per_part)
            .enumerate()
            .map(|(i, chunk)| {
                Flowable::lines(
                    spacing + self.leading * chunk.len() as f64,
                    self.leading,
                    self.element.with_lines(chunk.to_vec(), i > 0),
                )
            })
            .collect()
    }
}

/// An element placed on a page; `top` is measured from the frame top
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub top: f64,
    pub height: f64,
    pub element: Element,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based
    pub number: usize,
    pub elements: Vec<Placed>,
}

impl Page {
    /// Frame space used on this page
    pub fn used_height(&self) -> f64 {
        self.elements
            .iter()
            .map(|p| p.top + p.height)
            .fold(0.0, f64::max)
    }

    pub fn footer(&self) -> String {
        format!("Page {}", self.number)
    }
}

/// A paginated document ready for a page writer
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub title: String,
    /// Running header text, the title clipped to 90 characters
    pub header: String,
    pub pages: Vec<Page>,
}

/// Measures and paginates reports
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    frame_height: f64,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            frame_height: style::FRAME_HEIGHT,
        }
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a shorter frame; lets tests force page breaks with little content
    pub fn with_frame_height(mut self, height: f64) -> Self {
        self.frame_height = height;
        self
    }

    pub fn layout(&self, report: &Report) -> Document {
        let title = if report.title.trim().is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            report.title.trim().to_string()
        };

        let mut paginator = Paginator::new(self.frame_height);
        paginator.place(paragraph(&style::TITLE, &title, style::FRAME_WIDTH, |lines| {
            Element::Title { lines }
        }));
        if let Some(meta) = report.meta_line.as_deref().filter(|m| !m.trim().is_empty()) {
            paginator.place(paragraph(&style::META, meta, style::FRAME_WIDTH, |lines| {
                Element::Meta { lines }
            }));
        }

        for section in &report.sections {
            paginator.place_together(section_flowables(section));
            paginator.place(Flowable::gap(style::SECTION_GAP));
        }

        let pages = paginator.finish();
        debug!(
            "Laid out {} sections on {} pages",
            report.sections.len(),
            pages.len()
        );

        Document {
            header: clip_chars(&title, style::HEADER_TITLE_CHARS).to_string(),
            title,
            pages,
        }
    }
}

/// Flowables for one symbol section, in drawing order
pub fn section_flowables(section: &ReportSection) -> Vec<Flowable> {
    let mut out = vec![Flowable::new(
        style::BANNER.leading + 2.0 * style::BANNER_PADDING_Y,
        Element::Banner {
            symbol: fit_width(
                &section.symbol,
                style::BLOCK_WIDTH - 2.0 * style::BANNER_PADDING_X,
                style::BANNER.font_size,
                style::BANNER.bold,
            ),
        },
    )];

    let value_width = style::KV_VALUE_WIDTH - 2.0 * style::KV_PADDING_X;
    for (row, field) in KeyField::ALL
        .into_iter()
        .filter(|f| section.value(*f).is_some())
        .enumerate()
    {
        let value = section.value(field).unwrap_or_default();
        let value_lines = wrap(value, value_width, style::KV_FONT_SIZE, false);
        out.push(Flowable::lines(
            2.0 * style::KV_PADDING_Y + style::KV_LEADING * value_lines.len() as f64,
            style::KV_LEADING,
            Element::KeyValueRow {
                label: field.label(),
                value_lines,
                shaded: row % 2 == 0,
            },
        ));
    }

    out.push(Flowable::gap(style::TABLE_GAP));
    out.push(heading(NEWS_HEADING));
    if section.news.is_empty() {
        out.push(Flowable::new(
            style::SMALL.height(1),
            Element::Placeholder { text: NO_NEWS_TEXT },
        ));
    }
    for (i, item) in section.news.iter().enumerate() {
        out.extend(news_flowables(i + 1, item));
    }

    out.push(Flowable::gap(style::NEWS_GAP));
    out.push(heading(NARRATIVE_HEADING));
    out.extend(narrative_flowables(&section.narrative));
    out
}

fn heading(text: &'static str) -> Flowable {
    Flowable::new(style::HEADING.height(1), Element::Heading { text })
}

fn paragraph(
    style: &TextStyle,
    text: &str,
    width: f64,
    element: impl FnOnce(Vec<String>) -> Element,
) -> Flowable {
    let lines = wrap(text, style.text_width(width), style.font_size, style.bold);
    Flowable::lines(style.height(lines.len()), style.leading, element(lines))
}

fn news_flowables(number: usize, item: &NewsDisplayItem) -> Vec<Flowable> {
    let mut out = vec![paragraph(
        &style::NEWS_ITEM,
        &format!("{number}. {}", item.display_line),
        style::FRAME_WIDTH,
        |lines| Element::NewsItem { number, lines },
    )];

    let summary = item.summary.trim();
    if !summary.is_empty() {
        out.push(paragraph(&style::NEWS_SUMMARY, summary, style::FRAME_WIDTH, |lines| {
            Element::NewsSummary { lines }
        }));
    }

    let url = item.url.trim();
    if !url.is_empty() {
        out.push(Flowable::new(
            style::NEWS_LINK.height(1),
            Element::NewsLink {
                href: url.to_string(),
                text: fit_width(
                    &short_url(url),
                    style::NEWS_LINK.text_width(style::FRAME_WIDTH),
                    style::NEWS_LINK.font_size,
                    style::NEWS_LINK.bold,
                ),
            },
        ));
    }
    out
}

fn narrative_flowables(narrative: &str) -> Vec<Flowable> {
    let narrative = narrative.trim();
    let text = if narrative.is_empty() {
        NO_NARRATIVE_TEXT
    } else {
        narrative
    };

    let style = &style::NARRATIVE;
    let width = style.text_width(style::BLOCK_WIDTH - 2.0 * style::BOX_PADDING_X);
    let lines: Vec<String> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .flat_map(|l| wrap(l, width, style.font_size, style.bold))
        .collect();

    let count = lines.len();
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let first = i == 0;
            let last = i + 1 == count;
            let mut height = style.leading;
            if first {
                height += style::BOX_PADDING_Y;
            }
            if last {
                height += style::BOX_PADDING_Y;
            }
            Flowable::new(height, Element::NarrativeLine { text, first, last })
        })
        .collect()
}

/// Pours flowables into fixed-height frames
struct Paginator {
    frame_height: f64,
    pages: Vec<Page>,
    current: Vec<Placed>,
    cursor: f64,
}

impl Paginator {
    fn new(frame_height: f64) -> Self {
        Self {
            frame_height,
            pages: Vec::new(),
            current: Vec::new(),
            cursor: 0.0,
        }
    }

    fn remaining(&self) -> f64 {
        self.frame_height - self.cursor
    }

    fn fits(&self, height: f64) -> bool {
        height <= self.remaining() + FIT_EPSILON
    }

    fn break_page(&mut self) {
        let number = self.pages.len() + 1;
        self.pages.push(Page {
            number,
            elements: std::mem::take(&mut self.current),
        });
        self.cursor = 0.0;
    }

    /// Place one flowable, splitting it first when no page could hold it
    ///
    /// Anything still taller than the frame after splitting is clipped to it.
    fn place(&mut self, flowable: Flowable) {
        if flowable.height <= self.frame_height + FIT_EPSILON {
            self.place_one(flowable);
            return;
        }

        let parts = flowable.split(self.frame_height);
        if parts.len() > 1 {
            warn!(
                parts = parts.len(),
                frame = self.frame_height,
                "Splitting a block taller than the page frame"
            );
        }

        for mut part in parts {
            if part.height > self.frame_height + FIT_EPSILON {
                warn!(
                    height = part.height,
                    frame = self.frame_height,
                    "Clipping a block taller than the page frame"
                );
                part.height = self.frame_height;
            }
            self.place_one(part);
        }
    }

    /// Place one flowable, starting a new page when it does not fit
    fn place_one(&mut self, flowable: Flowable) {
        if !self.fits(flowable.height) && !self.current.is_empty() {
            self.break_page();
            if flowable.is_gap() {
                return;
            }
        }
        // Gaps never open a page
        if flowable.is_gap() && self.current.is_empty() {
            return;
        }

        self.current.push(Placed {
            top: self.cursor,
            height: flowable.height,
            element: flowable.element,
        });
        self.cursor += flowable.height;
    }

    /// Place a block on one page if any single page can hold it
    fn place_together(&mut self, block: Vec<Flowable>) {
        let total: f64 = block.iter().map(|f| f.height).sum();
        if !self.fits(total) && total <= self.frame_height + FIT_EPSILON && !self.current.is_empty()
        {
            self.break_page();
        }
        for flowable in block {
            self.place(flowable);
        }
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.break_page();
        }
        self.pages
    }
}
