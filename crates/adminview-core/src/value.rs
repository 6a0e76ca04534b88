//! Cell values produced by column accessors
//!
//! A column accessor turns a record into a [`CellValue`]. Filtering matches
//! against the value's string form; sorting compares values by kind.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::str::FromStr;

/// A single cell, as read from a record by a column accessor
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(Decimal),
    Date(DateTime<Utc>),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Non-finite floats have no decimal form and become [`CellValue::Empty`]
    pub fn number(value: f64) -> Self {
        Decimal::from_f64(value)
            .map(|d| CellValue::Number(d.normalize()))
            .unwrap_or(CellValue::Empty)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Case-insensitive substring test. `needle` must already be lower-cased.
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        self.to_string().to_lowercase().contains(needle)
    }

    /// Total order used by the sort stage.
    ///
    /// Values are ranked by kind first: empty, then booleans, then numbers,
    /// then dates, then other text. Text that parses as a number ranks with
    /// numbers and text that parses as a date ranks with dates, so `"9"`
    /// sorts before `"10"` and both sort before `"1a"`. Within a rank,
    /// numbers compare numerically, dates chronologically and text
    /// case-insensitively.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }

    pub fn sort_key(&self) -> SortKey {
        match self {
            CellValue::Empty => SortKey::Empty,
            CellValue::Bool(b) => SortKey::Bool(*b),
            CellValue::Number(n) => SortKey::Number(n.normalize()),
            CellValue::Date(d) => SortKey::Date(*d),
            CellValue::Text(s) => {
                if let Some(n) = parse_number(s) {
                    SortKey::Number(n.normalize())
                } else if let Some(d) = parse_date(s) {
                    SortKey::Date(d)
                } else {
                    SortKey::Text(s.to_lowercase())
                }
            }
        }
    }
}

/// Comparable form of a [`CellValue`]. Variant order is rank order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Empty,
    Bool(bool),
    Number(Decimal),
    Date(DateTime<Utc>),
    Text(String),
}

fn parse_number(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim()).ok()
}

/// RFC 3339 timestamps and bare `YYYY-MM-DD` dates
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Date(d) => write!(f, "{}", d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(Decimal::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::Date(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}
