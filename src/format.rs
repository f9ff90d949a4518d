//! Field formatting primitives.
//!
//! Every field of every record is written through one of these functions, so
//! each one always returns exactly `width` ASCII characters. None of them
//! fail: absent or unparseable input degrades to zero or space fill.

use crate::money::Money;
use chrono::{Datelike, NaiveDate};
use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Zero-filled numeric field.
///
/// Non-digit characters are stripped. When more than `width` digits remain,
/// the rightmost `width` are kept.
pub fn numeric(value: &str, width: usize) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() > width {
        warn!(
            "Numeric value {} truncated to its rightmost {} digits",
            digits, width
        );
        return digits[digits.len() - width..].to_string();
    }
    format!("{:0>width$}", digits, width = width)
}

/// [`numeric`] for optional values; absent values are all zeros.
pub fn numeric_opt(value: Option<&str>, width: usize) -> String {
    match value {
        Some(v) => numeric(v, width),
        None => zeros(width),
    }
}

/// Zero-filled numeric field from an integer.
pub fn number(value: u64, width: usize) -> String {
    numeric(&value.to_string(), width)
}

/// Space-filled alphanumeric field.
///
/// Diacritics are stripped, punctuation removed and the result uppercased,
/// then padded or truncated to `width`.
pub fn alpha(value: &str, width: usize) -> String {
    let cleaned: String = strip_accents(value)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect::<String>()
        .to_ascii_uppercase();
    fit(cleaned.trim(), width)
}

/// [`alpha`] for optional values; absent values are all spaces.
pub fn alpha_opt(value: Option<&str>, width: usize) -> String {
    match value {
        Some(v) => alpha(v, width),
        None => blanks(width),
    }
}

/// Space-filled field that keeps case and punctuation.
///
/// Used for instant-transfer keys and transaction ids, where `@`, `.`, `-`
/// and lowercase letters are significant. Diacritics and any remaining
/// non-ASCII characters are still removed.
pub fn verbatim(value: Option<&str>, width: usize) -> String {
    match value {
        Some(v) => {
            let cleaned: String = strip_accents(v)
                .chars()
                .filter(|c| c.is_ascii() && !c.is_ascii_control())
                .collect();
            fit(cleaned.trim(), width)
        }
        None => blanks(width),
    }
}

/// Date field in `DDMMYYYY` form.
///
/// Accepts ISO `YYYY-MM-DD` (optionally followed by a time part) or an
/// already encoded `DDMMYYYY`. Missing or invalid input gives `00000000`.
pub fn date(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => match parse_date(v) {
            Some(d) => date_of(d),
            None => {
                warn!("Unparseable date {:?}, writing zeros", v);
                zeros(8)
            }
        },
        None => zeros(8),
    }
}

/// Date field from a calendar date.
pub fn date_of(value: NaiveDate) -> String {
    format!("{:02}{:02}{:04}", value.day(), value.month(), value.year())
}

/// Reference period in `MMYYYY` form, from the same inputs [`date`] accepts.
pub fn month_year(value: Option<&str>) -> String {
    match value.map(str::trim).and_then(parse_date) {
        Some(d) => format!("{:02}{:04}", d.month(), d.year()),
        None => zeros(6),
    }
}

/// Parses the date forms accepted by [`date`].
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() == 8 && value.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::parse_from_str(value, "%d%m%Y").ok();
    }
    let iso = value.get(..10)?;
    NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()
}

/// Monetary field as an implicit-decimal integer.
///
/// The amount is multiplied by `10^decimals`, rounded to the nearest integer
/// and zero-filled. The sign is not representable and is dropped.
pub fn money(value: Option<Money>, width: usize, decimals: u32) -> String {
    match value {
        Some(m) => decimal(m.as_decimal(), width, decimals),
        None => zeros(width),
    }
}

/// [`money`] with the usual 2 implied decimals.
pub fn amount(value: Option<Money>, width: usize) -> String {
    money(value, width, 2)
}

fn decimal(value: Decimal, width: usize, decimals: u32) -> String {
    let scaled = value.abs() * Decimal::from(10u64.pow(decimals));
    let rounded = scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    match rounded.to_u64() {
        Some(units) => numeric(&units.to_string(), width),
        None => zeros(width),
    }
}

/// `width` zeros.
pub fn zeros(width: usize) -> String {
    "0".repeat(width)
}

/// `width` spaces.
pub fn blanks(width: usize) -> String {
    " ".repeat(width)
}

/// Removes diacritics by decomposing and dropping combining marks.
pub fn strip_accents(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn fit(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len > width {
        value.chars().take(width).collect()
    } else {
        format!("{:<width$}", value, width = width)
    }
}
