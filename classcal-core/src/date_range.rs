//! Date range for filtering classes.

use chrono::NaiveDate;

/// Inclusive date range. None values mean unbounded in that direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Parse optional YYYY-MM-DD bounds. "today" is accepted for either side.
    pub fn from_args(
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, String> {
        let from = from.map(|s| parse_date(s, today)).transpose()?;
        let to = to.map(|s| parse_date(s, today)).transpose()?;

        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(format!("Invalid range: {} is after {}", f, t));
            }
        }

        Ok(DateRange { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|f| date >= f) && self.to.is_none_or(|t| date <= t)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

fn parse_date(s: &str, today: NaiveDate) -> Result<NaiveDate, String> {
    if s.eq_ignore_ascii_case("today") {
        return Ok(today);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}
