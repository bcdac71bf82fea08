//! Class records as published in the catalog.
//!
//! A `ClassEvent` is read-only input: it is deserialized from the catalog
//! and never modified by classcal. Dates and times are kept as the raw
//! strings the catalog provides; they are parsed when an event is exported
//! so that one bad record does not prevent browsing the rest.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ClassCalError, ClassCalResult};

/// Identifier of a class. Catalogs use either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassId::Number(n) => write!(f, "{}", n),
            ClassId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ClassId {
    fn from(n: i64) -> Self {
        ClassId::Number(n)
    }
}

impl From<&str> for ClassId {
    fn from(s: &str) -> Self {
        ClassId::Text(s.to_string())
    }
}

impl From<String> for ClassId {
    fn from(s: String) -> Self {
        ClassId::Text(s)
    }
}

/// A scheduled class session.
///
/// Only `id` is required. Missing or `null` text fields load as empty
/// strings; an empty date or time is reported when the class is exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEvent {
    pub id: ClassId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Calendar date, YYYY-MM-DD
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    /// Local start time, HH:MM (24-hour)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub time: String,
    /// Local end time, HH:MM (24-hour)
    #[serde(rename = "endTime", default, deserialize_with = "null_as_empty")]
    pub end_time: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub modality: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub instructor: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ClassEvent {
    pub fn parsed_date(&self) -> ClassCalResult<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            self.data_error(format!("invalid date '{}', expected YYYY-MM-DD", self.date))
        })
    }

    /// Local start time, if it parses.
    pub fn start_time(&self) -> Option<NaiveTime> {
        parse_time(&self.time)
    }

    /// Local start and end of the class.
    ///
    /// Fails when either time cannot be parsed or when the class does not
    /// end strictly after it starts (overnight classes are not supported).
    pub fn local_span(&self) -> ClassCalResult<(NaiveDateTime, NaiveDateTime)> {
        let date = self.parsed_date()?;
        let start = self.start_time().ok_or_else(|| {
            self.data_error(format!("invalid start time '{}', expected HH:MM", self.time))
        })?;
        let end = parse_time(&self.end_time).ok_or_else(|| {
            self.data_error(format!("invalid end time '{}', expected HH:MM", self.end_time))
        })?;

        if start >= end {
            return Err(self.data_error(format!(
                "start time {} is not before end time {}",
                self.time, self.end_time
            )));
        }

        Ok((date.and_time(start), date.and_time(end)))
    }

    /// Human readable time range, e.g. "09:00 - 12:00"
    pub fn display_time(&self) -> String {
        format!("{} - {}", self.time.trim(), self.end_time.trim())
    }

    fn data_error(&self, reason: String) -> ClassCalError {
        ClassCalError::DataQuality {
            id: self.id.clone(),
            reason,
        }
    }
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}
