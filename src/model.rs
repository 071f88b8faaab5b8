use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MIN_YEAR: i32 = 2025;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid date identifier (use YYYY-MM-DD): {0}")]
    InvalidDateKey(String),
}

/// Canonical `YYYY-MM-DD` identifier of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        DateKey(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl FromStr for DateKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ModelError::InvalidDateKey(s.to_string()))?;
        let key = DateKey(date);
        // chrono accepts unpadded fields; identifiers must be zero-padded
        if key.to_string() != raw {
            return Err(ModelError::InvalidDateKey(s.to_string()));
        }
        Ok(key)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The set of dates the user has marked.
///
/// Persisted as a JSON object of `"YYYY-MM-DD": true` entries. Absence of a
/// key means the date is not marked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkedDates {
    dates: BTreeSet<DateKey>,
}

impl MarkedDates {
    pub fn new() -> Self {
        MarkedDates::default()
    }

    /// Builds the set from a stored JSON value.
    ///
    /// Anything that is not an object yields an empty set. Entries with falsy
    /// values or keys that are not date identifiers are dropped.
    pub fn from_json(value: &Value) -> Self {
        let mut marked = MarkedDates::new();
        if let Value::Object(entries) = value {
            for (raw, flag) in entries {
                if !is_truthy(flag) {
                    continue;
                }
                match raw.parse::<DateKey>() {
                    Ok(key) => {
                        marked.dates.insert(key);
                    }
                    Err(err) => log::debug!("skipping stored entry: {}", err),
                }
            }
        }
        marked
    }

    pub fn to_json(&self) -> Value {
        let entries = self
            .dates
            .iter()
            .map(|key| (key.to_string(), Value::Bool(true)))
            .collect::<Map<String, Value>>();
        Value::Object(entries)
    }

    pub fn contains(&self, key: &DateKey) -> bool {
        self.dates.contains(key)
    }

    /// Flips membership of `key` and returns whether it is now marked.
    pub fn toggle(&mut self, key: DateKey) -> bool {
        if self.dates.remove(&key) {
            false
        } else {
            self.dates.insert(key);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateKey> {
        self.dates.iter()
    }

    pub fn in_year(&self, year: i32) -> impl Iterator<Item = &DateKey> {
        self.dates.iter().filter(move |key| key.year() == year)
    }
}

impl FromIterator<DateKey> for MarkedDates {
    fn from_iter<I: IntoIterator<Item = DateKey>>(iter: I) -> Self {
        MarkedDates {
            dates: iter.into_iter().collect(),
        }
    }
}

impl Serialize for MarkedDates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.dates.iter().map(|key| (key, true)))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The displayed year, never below `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearCursor {
    year: i32,
    min: i32,
}

impl YearCursor {
    pub fn new(seed: i32, min: i32) -> Self {
        YearCursor {
            year: seed.max(min),
            min,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn can_go_prev(&self) -> bool {
        self.year > self.min
    }

    pub fn next(&mut self) -> bool {
        if self.year >= NaiveDate::MAX.year() {
            return false;
        }
        self.year += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if !self.can_go_prev() {
            return false;
        }
        self.year -= 1;
        true
    }
}
