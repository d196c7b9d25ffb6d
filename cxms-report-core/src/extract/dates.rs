//! Date grammar for session logs.
//!
//! Exactly two forms are recognised:
//! - ISO: `2026-01-24`
//! - Month name: `Jan 24, 2026` or `Jan 24 2026` (three-letter English
//!   abbreviation, any case)
//!
//! Everything else is ignored. Parsed dates are calendar dates with no zone;
//! callers treat them as UTC midnight.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

static MONTH_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2},?\s+\d{4}")
        .unwrap()
});

static MONTH_DATE_PARTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{3})\s+(\d{1,2}),?\s+(\d{4})$").unwrap());

/// Collect date-like substrings: all ISO matches, then all month-name matches.
///
/// Order within each form follows the document; nothing is sorted or parsed.
pub fn collect_date_strings(text: &str) -> Vec<String> {
    ISO_DATE_RE
        .find_iter(text)
        .chain(MONTH_DATE_RE.find_iter(text))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Parse one date string in either accepted form.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    let caps = MONTH_DATE_PARTS_RE.captures(raw)?;
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// The first date in `text` by position that parses, in either form.
pub fn first_date(text: &str) -> Option<NaiveDate> {
    ISO_DATE_RE
        .find_iter(text)
        .chain(MONTH_DATE_RE.find_iter(text))
        .filter_map(|m| parse_date(m.as_str()).map(|date| (m.start(), date)))
        .min_by_key(|(start, _)| *start)
        .map(|(_, date)| date)
}

/// Parse and sort chronologically, dropping anything unparsable.
pub fn sorted_dates<S: AsRef<str>>(raw: &[S]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = raw.iter().filter_map(|s| parse_date(s.as_ref())).collect();
    dates.sort_unstable();
    dates
}

fn month_number(abbrev: &str) -> Option<u32> {
    let month = match abbrev.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
