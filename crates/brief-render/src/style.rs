//! Page geometry and paragraph styles
//!
//! All lengths are in points (1/72 inch).

/// Points per inch
pub const INCH: f64 = 72.0;

/// US Letter
pub const PAGE_WIDTH: f64 = 8.5 * INCH;
pub const PAGE_HEIGHT: f64 = 11.0 * INCH;

pub const MARGIN_LEFT: f64 = 0.7 * INCH;
pub const MARGIN_RIGHT: f64 = 0.7 * INCH;
pub const MARGIN_TOP: f64 = 0.9 * INCH;
pub const MARGIN_BOTTOM: f64 = 0.8 * INCH;

/// Width of the area blocks flow through
pub const FRAME_WIDTH: f64 = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
/// Height available for blocks on every page
pub const FRAME_HEIGHT: f64 = PAGE_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

/// Running header baseline, measured from the page top
pub const HEADER_TOP: f64 = 0.3 * INCH;
/// Footer baseline, measured from the page bottom
pub const FOOTER_BOTTOM: f64 = 0.55 * INCH;
pub const HEADER_FONT_SIZE: f64 = 9.0;
/// Characters of the title kept in the running header
pub const HEADER_TITLE_CHARS: usize = 90;

/// Width of banner, key/value table and narrative box
pub const BLOCK_WIDTH: f64 = 6.8 * INCH;
pub const KV_LABEL_WIDTH: f64 = 1.1 * INCH;
pub const KV_VALUE_WIDTH: f64 = 5.7 * INCH;
pub const KV_PADDING_X: f64 = 6.0;
pub const KV_PADDING_Y: f64 = 5.0;
pub const KV_FONT_SIZE: f64 = 9.6;
pub const KV_LEADING: f64 = 11.5;

pub const BANNER_PADDING_X: f64 = 10.0;
pub const BANNER_PADDING_Y: f64 = 6.0;

pub const BOX_PADDING_X: f64 = 10.0;
pub const BOX_PADDING_Y: f64 = 8.0;

/// Gap after the news list, before the narrative heading
pub const NEWS_GAP: f64 = 8.0;
/// Gap after the key/value table, before the news heading
pub const TABLE_GAP: f64 = 6.0;
/// Gap between sections
pub const SECTION_GAP: f64 = 10.0;

pub const COLOR_TEXT: &str = "#111111";
pub const COLOR_SMALL: &str = "#222222";
pub const COLOR_SUMMARY: &str = "#333333";
pub const COLOR_HEADER: &str = "#444444";
pub const COLOR_META: &str = "#555555";
pub const COLOR_BANNER: &str = "#111827";
pub const COLOR_BANNER_TEXT: &str = "#FFFFFF";
pub const COLOR_ROW_SHADED: &str = "#F6F7F9";
pub const COLOR_GRID: &str = "#DDDDDD";
pub const COLOR_BOX: &str = "#F2F4F7";
pub const COLOR_BOX_BORDER: &str = "#D0D5DD";

/// Paragraph style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    pub leading: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: &'static str,
    pub left_indent: f64,
    pub right_indent: f64,
    pub space_before: f64,
    pub space_after: f64,
}

impl TextStyle {
    const fn base(font_size: f64, leading: f64, color: &'static str) -> Self {
        Self {
            font_size,
            leading,
            bold: false,
            italic: false,
            color,
            left_indent: 0.0,
            right_indent: 0.0,
            space_before: 0.0,
            space_after: 0.0,
        }
    }

    /// Height of a paragraph with `lines` lines, spacing included
    pub fn height(&self, lines: usize) -> f64 {
        self.space_before + self.leading * lines as f64 + self.space_after
    }

    /// Width available for text inside a container of `width`
    pub fn text_width(&self, width: f64) -> f64 {
        (width - self.left_indent - self.right_indent).max(self.font_size)
    }
}

pub const TITLE: TextStyle = TextStyle {
    bold: true,
    space_after: 8.0,
    ..TextStyle::base(18.0, 22.0, COLOR_TEXT)
};

pub const META: TextStyle = TextStyle {
    space_after: 10.0,
    ..TextStyle::base(9.5, 12.0, COLOR_META)
};

pub const BANNER: TextStyle = TextStyle {
    bold: true,
    ..TextStyle::base(12.5, 16.0, COLOR_BANNER_TEXT)
};

pub const HEADING: TextStyle = TextStyle {
    bold: true,
    space_before: 6.0,
    space_after: 4.0,
    ..TextStyle::base(10.2, 13.2, COLOR_TEXT)
};

pub const SMALL: TextStyle = TextStyle {
    space_after: 3.0,
    ..TextStyle::base(9.4, 12.2, COLOR_SMALL)
};

pub const NEWS_ITEM: TextStyle = TextStyle {
    left_indent: 10.0,
    space_after: 2.0,
    ..SMALL
};

pub const NEWS_SUMMARY: TextStyle = TextStyle {
    italic: true,
    left_indent: 18.0,
    color: COLOR_SUMMARY,
    ..SMALL
};

pub const NEWS_LINK: TextStyle = TextStyle {
    italic: false,
    ..NEWS_SUMMARY
};

/// Narrative text inside the box; box padding is added by the layout
pub const NARRATIVE: TextStyle = TextStyle {
    left_indent: 8.0,
    right_indent: 8.0,
    space_after: 0.0,
    ..SMALL
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_geometry() {
        assert!((PAGE_WIDTH - 612.0).abs() < f64::EPSILON);
        assert!((PAGE_HEIGHT - 792.0).abs() < f64::EPSILON);
        assert!((FRAME_WIDTH - 511.2).abs() < 1e-9);
        assert!((FRAME_HEIGHT - 669.6).abs() < 1e-9);
        assert!(BLOCK_WIDTH <= FRAME_WIDTH);
        assert!((KV_LABEL_WIDTH + KV_VALUE_WIDTH - BLOCK_WIDTH).abs() < 1e-9);
    }

    #[test]
    fn test_paragraph_height() {
        assert!((HEADING.height(1) - 23.2).abs() < 1e-9);
        assert!((NEWS_ITEM.height(2) - 26.4).abs() < 1e-9);
        assert!((NEWS_ITEM.text_width(100.0) - 90.0).abs() < 1e-9);
    }
}
