//! Cell value parsing and canonical formatting
//!
//! Lenient parsers for the raw strings found in uploaded sheets, and the
//! formatters the row serializer renders typed values with. Parsers return
//! `None` rather than failing; an unparseable cell is simply not evidence for
//! a type.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Currency symbols recognised in headers and cell values
pub const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹'];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// First currency symbol appearing in `raw`, if any
pub fn currency_symbol(raw: &str) -> Option<char> {
    raw.chars().find(|c| CURRENCY_SYMBOLS.contains(c))
}

#[inline]
pub fn has_percent_suffix(raw: &str) -> bool {
    raw.trim().ends_with('%')
}

/// Parse a number the way it tends to appear in a spreadsheet.
///
/// Accepts thousands separators, currency symbols, a trailing `%`, a leading
/// sign and accounting-style negatives in parentheses: `"$1,200"`,
/// `"(350.00)"`, `"-€12.5"`, `"23%"`. The percent sign is stripped, not
/// applied: `"23%"` parses to `23.0`.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let mut s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') && s.len() > 2 {
        negative = true;
        s = s[1..s.len() - 1].trim();
    }

    s = s.strip_suffix('%').unwrap_or(s).trim_end();

    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    s = s.trim_matches(|c: char| CURRENCY_SYMBOLS.contains(&c) || c.is_whitespace());

    // "$-12" puts the sign after the symbol
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest;
    }

    if s.is_empty() || !s.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let cleaned: String = s.chars().filter(|c| *c != ',' && *c != '_').collect();
    let value = cleaned.parse::<f64>().ok().filter(|v| v.is_finite())?;

    Some(if negative { -value } else { value })
}

/// Parse a date under the common spreadsheet formats
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Canonical number: no separators, at most four decimals, trailing zeros trimmed
pub fn format_number(value: f64) -> String {
    let formatted = format!("{:.4}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Monetary amount with thousands separators; cents only when non-zero
pub fn format_currency(value: f64, symbol: char) -> String {
    let cents_total = (value.abs() * 100.0).round();
    let whole = (cents_total / 100.0).trunc() as u64;
    let cents = (cents_total % 100.0) as u64;
    let sign = if value < 0.0 && cents_total > 0.0 { "-" } else { "" };

    if cents == 0 {
        format!("{}{}{}", sign, symbol, group_thousands(whole))
    } else {
        format!("{}{}{}.{:02}", sign, symbol, group_thousands(whole), cents)
    }
}

/// Percentage with a `%` suffix. When `fractional` the value is a share of
/// one (`0.23`) and gets scaled by 100.
pub fn format_percentage(value: f64, fractional: bool) -> String {
    let scaled = if fractional { value * 100.0 } else { value };
    format!("{}%", format_number(scaled))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn group_thousands(value: u64) -> String {
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
