//! Display formatting shared by the aggregator and the report builder

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const SHORT_TIMESTAMP: &str = "%Y-%m-%d %H:%M";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Truncate an ISO-8601 timestamp to minute precision (`YYYY-MM-DD HH:MM`)
///
/// Offsets are kept as written, not converted to UTC. Input that does not
/// parse is returned trimmed but otherwise unchanged.
pub fn short_timestamp(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let normalized = match trimmed.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => trimmed.to_string(),
    };

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return dt.format(SHORT_TIMESTAMP).to_string();
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return dt.format(SHORT_TIMESTAMP).to_string();
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return format!("{} 00:00", date.format("%Y-%m-%d"));
    }

    trimmed.to_string()
}

/// Integer with `,` thousands separators
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fixed two-decimal price
pub fn price(value: f64) -> String {
    format!("{value:.2}")
}

/// Signed two-decimal percentage, e.g. `+5.00%`
pub fn signed_pct(value: f64) -> String {
    format!("{value:+.2}%")
}

/// Collapse runs of whitespace (including line breaks) into single spaces
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
