//! PDF pages drawn with the standard Helvetica fonts
//!
//! The layout already measured every line with Helvetica metrics, so each
//! element is drawn at its computed offset and nothing is reflowed here.

use super::{DocumentFormat, PageWriter};
use crate::error::{RenderError, Result};
use crate::layout::{Document, Element, Page, Placed};
use crate::style::{self, TextStyle};
use crate::text::{measure, to_ascii};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Pt, Rect, Rgb,
};
use std::fmt;

const LAYER: &str = "Content";
const GRID_LINE: f32 = 0.5;
const BOX_LINE: f32 = 0.6;

/// Writes a Letter-sized PDF, one page per laid-out page
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPageWriter;

impl PageWriter for PdfPageWriter {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn write(&self, document: &Document) -> Result<Vec<u8>> {
        let (pdf, first_page, first_layer) = PdfDocument::new(
            to_ascii(&document.title),
            mm(style::PAGE_WIDTH),
            mm(style::PAGE_HEIGHT),
            LAYER,
        );
        let fonts = Fonts::load(&pdf)?;

        for (i, page) in document.pages.iter().enumerate() {
            let layer = if i == 0 {
                pdf.get_page(first_page).get_layer(first_layer)
            } else {
                let (page_index, layer_index) =
                    pdf.add_page(mm(style::PAGE_WIDTH), mm(style::PAGE_HEIGHT), LAYER);
                pdf.get_page(page_index).get_layer(layer_index)
            };
            Canvas {
                layer,
                fonts: &fonts,
            }
            .draw_page(document, page);
        }

        pdf.save_to_bytes().map_err(pdf_error)
    }
}

fn pdf_error(err: impl fmt::Display) -> RenderError {
    RenderError::Pdf(err.to_string())
}

fn mm(points: f64) -> Mm {
    Mm::from(Pt(points as f32))
}

/// `#RRGGBB` channels in 0..=1; anything else is black
fn rgb(hex: &str) -> (f32, f32, f32) {
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .map_or(0.0, |v| f32::from(v) / 255.0)
    };
    if hex.len() == 7 && hex.starts_with('#') {
        (channel(1), channel(3), channel(5))
    } else {
        (0.0, 0.0, 0.0)
    }
}

fn color(hex: &str) -> Color {
    let (r, g, b) = rgb(hex);
    Color::Rgb(Rgb::new(r, g, b, None))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(pdf: &PdfDocumentReference) -> Result<Self> {
        Ok(Self {
            regular: pdf
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(pdf_error)?,
            bold: pdf
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(pdf_error)?,
            italic: pdf
                .add_builtin_font(BuiltinFont::HelveticaOblique)
                .map_err(pdf_error)?,
        })
    }
}

/// One page's drawing surface; `y` values are points from the page bottom
struct Canvas<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
}

impl Canvas<'_> {
    fn draw_page(&self, document: &Document, page: &Page) {
        self.text(
            &document.header,
            style::MARGIN_LEFT,
            style::PAGE_HEIGHT - style::HEADER_TOP,
            style::HEADER_FONT_SIZE,
            &self.fonts.regular,
            style::COLOR_HEADER,
        );

        let footer = page.footer();
        let footer_right = style::PAGE_WIDTH - style::MARGIN_RIGHT;
        self.text(
            &footer,
            footer_right - measure(&footer, style::HEADER_FONT_SIZE, false),
            style::FOOTER_BOTTOM,
            style::HEADER_FONT_SIZE,
            &self.fonts.regular,
            style::COLOR_HEADER,
        );

        for placed in &page.elements {
            self.draw(placed);
        }
    }

    fn draw(&self, placed: &Placed) {
        let top = style::PAGE_HEIGHT - style::MARGIN_TOP - placed.top;
        let left = style::MARGIN_LEFT;

        match &placed.element {
            Element::Gap => {}
            Element::Title { lines } => self.paragraph(lines, &style::TITLE, left, top),
            Element::Meta { lines } => self.paragraph(lines, &style::META, left, top),
            Element::Heading { text } => {
                self.paragraph(&[(*text).to_string()], &style::HEADING, left, top);
            }
            Element::Placeholder { text } => {
                self.paragraph(&[(*text).to_string()], &style::SMALL, left, top);
            }
            Element::NewsItem { lines, .. } => self.paragraph(lines, &style::NEWS_ITEM, left, top),
            Element::NewsSummary { lines } => {
                self.paragraph(lines, &style::NEWS_SUMMARY, left, top);
            }
            Element::NewsLink { text, .. } => {
                self.paragraph(&[text.clone()], &style::NEWS_LINK, left, top);
            }
            Element::Banner { symbol } => {
                self.fill(left, top, style::BLOCK_WIDTH, placed.height, style::COLOR_BANNER);
                let s = &style::BANNER;
                self.text(
                    symbol,
                    left + style::BANNER_PADDING_X,
                    baseline(top - style::BANNER_PADDING_Y, s.leading, s.font_size),
                    s.font_size,
                    self.font(s),
                    s.color,
                );
            }
            Element::KeyValueRow {
                label,
                value_lines,
                shaded,
            } => self.key_value_row(label, value_lines, *shaded, left, top, placed.height),
            Element::NarrativeLine { text, first, last } => {
                self.narrative_line(text, *first, *last, left, top, placed.height);
            }
        }
    }

    fn key_value_row(
        &self,
        label: &str,
        value_lines: &[String],
        shaded: bool,
        left: f64,
        top: f64,
        height: f64,
    ) {
        if shaded {
            self.fill(left, top, style::BLOCK_WIDTH, height, style::COLOR_ROW_SHADED);
        }
        self.stroke(left, top, style::BLOCK_WIDTH, height, style::COLOR_GRID, GRID_LINE);

        let line_top = top - style::KV_PADDING_Y;
        self.text(
            label,
            left + style::KV_PADDING_X,
            baseline(line_top, style::KV_LEADING, style::KV_FONT_SIZE),
            style::KV_FONT_SIZE,
            &self.fonts.regular,
            style::COLOR_TEXT,
        );
        let value_left = left + style::KV_LABEL_WIDTH + style::KV_PADDING_X;
        for (i, line) in value_lines.iter().enumerate() {
            self.text(
                line,
                value_left,
                baseline(
                    line_top - style::KV_LEADING * i as f64,
                    style::KV_LEADING,
                    style::KV_FONT_SIZE,
                ),
                style::KV_FONT_SIZE,
                &self.fonts.regular,
                style::COLOR_TEXT,
            );
        }
    }

    fn narrative_line(
        &self,
        text: &str,
        first: bool,
        last: bool,
        left: f64,
        top: f64,
        height: f64,
    ) {
        let s = &style::NARRATIVE;
        self.fill(left, top, style::BLOCK_WIDTH, height, style::COLOR_BOX);

        // Side borders on every line, top and bottom only where the box opens and closes
        let right = left + style::BLOCK_WIDTH;
        self.fill(left, top, f64::from(BOX_LINE), height, style::COLOR_BOX_BORDER);
        self.fill(
            right - f64::from(BOX_LINE),
            top,
            f64::from(BOX_LINE),
            height,
            style::COLOR_BOX_BORDER,
        );
        if first {
            self.fill(left, top, style::BLOCK_WIDTH, f64::from(BOX_LINE), style::COLOR_BOX_BORDER);
        }
        if last {
            self.fill(
                left,
                top - height + f64::from(BOX_LINE),
                style::BLOCK_WIDTH,
                f64::from(BOX_LINE),
                style::COLOR_BOX_BORDER,
            );
        }

        let line_top = if first { top - style::BOX_PADDING_Y } else { top };
        self.text(
            text,
            left + style::BOX_PADDING_X + s.left_indent,
            baseline(line_top, s.leading, s.font_size),
            s.font_size,
            self.font(s),
            s.color,
        );
    }

    fn paragraph(&self, lines: &[String], s: &TextStyle, left: f64, top: f64) {
        let first_line = top - s.space_before;
        for (i, line) in lines.iter().enumerate() {
            self.text(
                line,
                left + s.left_indent,
                baseline(first_line - s.leading * i as f64, s.leading, s.font_size),
                s.font_size,
                self.font(s),
                s.color,
            );
        }
    }

    fn font(&self, s: &TextStyle) -> &IndirectFontRef {
        if s.bold {
            &self.fonts.bold
        } else if s.italic {
            &self.fonts.italic
        } else {
            &self.fonts.regular
        }
    }

    fn text(&self, text: &str, x: f64, y: f64, size: f64, font: &IndirectFontRef, fill: &str) {
        if text.is_empty() {
            return;
        }
        self.layer.set_fill_color(color(fill));
        self.layer
            .use_text(to_ascii(text), size as f32, mm(x), mm(y), font);
    }

    fn fill(&self, left: f64, top: f64, width: f64, height: f64, fill: &str) {
        self.layer.set_fill_color(color(fill));
        self.layer.add_rect(
            Rect::new(mm(left), mm(top - height), mm(left + width), mm(top))
                .with_mode(PaintMode::Fill),
        );
    }

    fn stroke(&self, left: f64, top: f64, width: f64, height: f64, outline: &str, thickness: f32) {
        self.layer.set_outline_color(color(outline));
        self.layer.set_outline_thickness(thickness);
        self.layer.add_rect(
            Rect::new(mm(left), mm(top - height), mm(left + width), mm(top))
                .with_mode(PaintMode::Stroke),
        );
    }
}

/// Baseline of a line whose box starts at `line_top`, centred in the leading
fn baseline(line_top: f64, leading: f64, font_size: f64) -> f64 {
    line_top - (leading + 0.7 * font_size) / 2.0
}
