//! Calendar date value for cycle entries.
//!
//! # Responsibility
//! - Parse and format the fixed-width `YYYY-MM-DD` representation.
//! - Provide whole-day arithmetic on local calendar dates.
//!
//! # Invariants
//! - Only zero-padded `YYYY-MM-DD` text is accepted; everything else is
//!   rejected instead of being misparsed.
//! - `Ord` on `CycleDate` equals lexicographic order of its canonical text.

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

/// Date parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Text is not shaped like `YYYY-MM-DD`.
    Malformed(String),
    /// Text is well-shaped but names no calendar day (e.g. `2024-02-30`).
    NonexistentDay(String),
}

impl Display for DateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => {
                write!(f, "malformed date `{value}`; expected YYYY-MM-DD")
            }
            Self::NonexistentDay(value) => write!(f, "date `{value}` does not exist"),
        }
    }
}

impl Error for DateError {}

/// Local calendar date without time-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleDate(NaiveDate);

impl CycleDate {
    /// Parses strict `YYYY-MM-DD` text.
    pub fn parse(value: &str) -> Result<Self, DateError> {
        if !DATE_SHAPE_RE.is_match(value) {
            return Err(DateError::Malformed(value.to_string()));
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Self)
            .map_err(|_| DateError::NonexistentDay(value.to_string()))
    }

    /// Today's date on the local wall clock.
    pub fn today_local() -> Self {
        Self(Local::now().date_naive())
    }

    /// Next calendar day, `None` at the end of the representable range.
    pub fn succ(self) -> Option<Self> {
        self.0
            .succ_opt()
            .filter(|next| next.year() <= 9999)
            .map(Self)
    }

    /// Whole days from `earlier` to `self`; negative when `earlier` is later.
    pub fn days_since(self, earlier: Self) -> i64 {
        (self.0 - earlier.0).num_days()
    }
}

impl Display for CycleDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for CycleDate {
    type Err = DateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for CycleDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CycleDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
