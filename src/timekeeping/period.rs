use chrono::{Datelike, Months, NaiveDate};

use crate::error::TimekeepingError;

/// Inclusive `[start, end]` date range of a timekeeping query.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TimekeepingError> {
        if start > end {
            return Err(TimekeepingError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whole calendar month from a "YYYY-MM" string.
    pub fn from_month(month: &str) -> Result<Self, TimekeepingError> {
        let invalid = || TimekeepingError::InvalidMonth {
            value: month.to_string(),
        };

        let start = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
            .map_err(|_| invalid())?;
        Self::month_of(start).ok_or_else(invalid)
    }

    /// Calendar month containing `day`.
    pub fn month_of(day: NaiveDate) -> Option<Self> {
        let start = day.with_day(1)?;
        let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self { start, end })
    }

    /// True when the period is exactly one calendar month.
    pub fn is_whole_month(&self) -> bool {
        Self::month_of(self.start) == Some(*self)
    }
}
