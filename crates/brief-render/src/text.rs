//! Text helpers: escaping, link shortening, measuring and wrapping

use url::Url;

/// Characters of the URL tail kept in a shortened link
pub const LINK_TAIL_CHARS: usize = 10;
/// Characters kept when a link is not an http(s) URL
pub const LINK_FALLBACK_CHARS: usize = 60;

const ELLIPSIS: char = '…';

/// Escape text content
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value
pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

/// Display form of a link: `domain…<last 10 chars>`
///
/// Anything that is not an http(s) URL shows its first 60 characters instead.
pub fn short_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }

    let domain = Url::parse(url).ok().and_then(|parsed| {
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }
        let host = parsed.host_str()?.to_string();
        Some(match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host,
        })
    });

    match domain {
        Some(domain) => format!("{domain}{ELLIPSIS}{}", tail_chars(url, LINK_TAIL_CHARS)),
        None => truncate_chars(url, LINK_FALLBACK_CHARS),
    }
}

/// First `max` characters, with an ellipsis when something was cut
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}{ELLIPSIS}", &s[..idx]),
        None => s.to_string(),
    }
}

/// First `max` characters, cut silently
pub fn clip_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn tail_chars(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    match s.char_indices().nth(count - n) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

/// Width charged for characters the standard fonts cannot draw
const UNKNOWN_WIDTH: u16 = 1000;

/// Helvetica advance widths for ' '..='~', per 1000 em
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for ' '..='~', per 1000 em
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// ASCII stand-in for punctuation outside the standard PDF encoding
pub fn ascii_stand_in(c: char) -> Option<&'static str> {
    match c {
        '\u{2192}' => Some("->"),
        '\u{2026}' => Some("..."),
        '\u{2018}' | '\u{2019}' => Some("'"),
        '\u{201C}' | '\u{201D}' => Some("\""),
        '\u{2013}' | '\u{2014}' | '\u{2212}' => Some("-"),
        '\u{2022}' => Some("*"),
        '\u{00A0}' => Some(" "),
        _ => None,
    }
}

/// Text as the standard fonts draw it; unknown characters become `?`
pub fn to_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() && !c.is_ascii_control() {
            out.push(c);
        } else if let Some(stand_in) = ascii_stand_in(c) {
            out.push_str(stand_in);
        } else if c == '\t' {
            out.push(' ');
        } else if !c.is_control() {
            out.push('?');
        }
    }
    out
}

/// Advance width in 1/1000 em
fn char_width(c: char, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    match c {
        ' '..='~' => table[c as usize - ' ' as usize],
        '\t' => table[0],
        c if c.is_control() => 0,
        c => ascii_stand_in(c).map_or(UNKNOWN_WIDTH, |s| {
            s.chars().map(|c| table[c as usize - ' ' as usize]).sum()
        }),
    }
}

/// Width of `text` set in Helvetica at `font_size` points
pub fn measure(text: &str, font_size: f64, bold: bool) -> f64 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c, bold))).sum();
    f64::from(units) / 1000.0 * font_size
}

/// Longest prefix of `text` that fits `max_width`, with an ellipsis when cut
pub fn fit_width(text: &str, max_width: f64, font_size: f64, bold: bool) -> String {
    if measure(text, font_size, bold) <= max_width {
        return text.to_string();
    }
    let mut kept: String = text.to_string();
    while kept.pop().is_some() {
        let candidate = format!("{kept}{ELLIPSIS}");
        if measure(&candidate, font_size, bold) <= max_width {
            return candidate;
        }
    }
    String::new()
}

/// Cut a word wider than `max_width` into pieces that fit
///
/// A piece holds at least one character, so a single glyph wider than the
/// line is still emitted.
fn split_word(word: &str, max_width: f64, font_size: f64, bold: bool) -> Vec<String> {
    if measure(word, font_size, bold) <= max_width {
        return vec![word.to_string()];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in word.chars() {
        piece.push(c);
        if piece.chars().count() > 1 && measure(&piece, font_size, bold) > max_width {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Greedy wrap by measured width; overlong words are broken between characters
///
/// Always returns at least one line so empty paragraphs still occupy space.
pub fn wrap(text: &str, max_width: f64, font_size: f64, bold: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        for piece in split_word(word, max_width, font_size, bold) {
            if current.is_empty() {
                current = piece;
                continue;
            }
            let candidate = format!("{current} {piece}");
            if measure(&candidate, font_size, bold) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, piece));
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
