// chatview-rs - Themeable chat view runtime for embedded hosts
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use super::pattern::translate_pattern;
use super::render::TargetPattern;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Utc};

/// Pattern used when the theme supplies none.
pub const DEFAULT_PATTERN: &str = "j:mm";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("cannot parse `{0}` as a timestamp")]
    UnparsableDate(String),
    #[error("epoch milliseconds {0} are out of range")]
    OutOfRange(i64),
}

/// A value accepted by [`DateTimeFormatter::format`].
#[derive(Debug, Clone, PartialEq)]
pub enum DateValue {
    Naive(NaiveDateTime),
    Local(DateTime<Local>),
    Utc(DateTime<Utc>),
    Fixed(DateTime<FixedOffset>),
    EpochMillis(i64),
    Text(String),
}

impl DateValue {
    /// Normalizes the value to a wall-clock timestamp in local time.
    pub fn to_local(&self) -> Result<NaiveDateTime, FormatError> {
        match self {
            Self::Naive(t) => Ok(*t),
            Self::Local(t) => Ok(t.naive_local()),
            Self::Utc(t) => Ok(t.with_timezone(&Local).naive_local()),
            Self::Fixed(t) => Ok(t.with_timezone(&Local).naive_local()),
            Self::EpochMillis(ms) => DateTime::from_timestamp_millis(*ms)
                .map(|t| t.with_timezone(&Local).naive_local())
                .ok_or(FormatError::OutOfRange(*ms)),
            Self::Text(text) => parse_text(text),
        }
    }
}

fn parse_text(text: &str) -> Result<NaiveDateTime, FormatError> {
    let trimmed = text.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(t.with_timezone(&Local).naive_local());
    }
    for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
    {
        if let Ok(t) = NaiveDateTime::parse_from_str(trimmed, layout) {
            return Ok(t);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| FormatError::UnparsableDate(text.to_owned()))
}

impl From<NaiveDateTime> for DateValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Naive(value)
    }
}

impl From<DateTime<Local>> for DateValue {
    fn from(value: DateTime<Local>) -> Self {
        Self::Local(value)
    }
}

impl From<DateTime<Utc>> for DateValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Utc(value)
    }
}

impl From<DateTime<FixedOffset>> for DateValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Fixed(value)
    }
}

impl From<i64> for DateValue {
    fn from(value: i64) -> Self {
        Self::EpochMillis(value)
    }
}

impl From<&str> for DateValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for DateValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Formats timestamps with a pattern translated once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeFormatter {
    pattern: TargetPattern,
}

impl DateTimeFormatter {
    /// Builds a formatter from a pattern in either source syntax.
    /// `None` or an empty pattern selects [`DEFAULT_PATTERN`].
    #[must_use]
    pub fn new(source: Option<&str>) -> Self {
        let source = source.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_PATTERN);
        Self { pattern: TargetPattern::compile(&translate_pattern(source)) }
    }

    /// The translated pattern in target syntax.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn format(&self, value: impl Into<DateValue>) -> Result<String, FormatError> {
        let at = value.into().to_local()?;
        Ok(self.pattern.render(&at))
    }
}

impl Default for DateTimeFormatter {
    fn default() -> Self {
        Self::new(None)
    }
}

/// One-shot formatting with a throwaway formatter.
pub fn date_format(value: impl Into<DateValue>, pattern: Option<&str>) -> Result<String, FormatError> {
    DateTimeFormatter::new(pattern).format(value)
}

/// Tracks the calendar date of the last message so a separator can be
/// inserted when the day changes.
#[derive(Debug, Default, Clone)]
pub struct DayTracker {
    last: Option<NaiveDate>,
}

impl DayTracker {
    /// Records `at` and returns whether its date differs from the previous one.
    pub fn update(&mut self, at: NaiveDateTime) -> bool {
        let date = at.date();
        let changed = self.last != Some(date);
        self.last = Some(date);
        changed
    }

    /// Forgets the previous date, e.g. after the view was cleared.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
