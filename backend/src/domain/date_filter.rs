//! Day/month/year filtering for the cattle and sales views.
//!
//! A filter is either inactive (the full collection passes through) or active
//! with a non-empty [`DatePattern`]. Filtering never touches the underlying
//! collection, so clearing the filter brings back the original view unchanged.

use chrono::{Datelike, NaiveDate};
use shared::{Cattle, DatePattern, Sale};

use super::error::{FarmError, FarmResult};

/// Records that expose the date the filters match against
pub trait FilterDate {
    fn filter_date(&self) -> NaiveDate;
}

impl FilterDate for Cattle {
    /// Registration date, UTC calendar day
    fn filter_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

impl FilterDate for Sale {
    fn filter_date(&self) -> NaiveDate {
        self.date
    }
}

/// Check `date` against every provided part of the pattern
pub fn matches_pattern(pattern: &DatePattern, date: NaiveDate) -> bool {
    pattern.day.map_or(true, |day| date.day() == day)
        && pattern.month.map_or(true, |month| date.month() == month)
        && pattern.year.map_or(true, |year| date.year() == year)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter {
    pattern: DatePattern,
    active: bool,
}

impl DateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn pattern(&self) -> DatePattern {
        self.pattern
    }

    /// Activate the filter. An all-empty pattern is rejected and the current
    /// filter state is kept.
    pub fn apply(&mut self, pattern: DatePattern) -> FarmResult<()> {
        if pattern.is_empty() {
            return Err(FarmError::EmptyFilter);
        }
        self.pattern = pattern;
        self.active = true;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pattern = DatePattern::default();
        self.active = false;
    }

    /// Records passing the filter, in their original order
    pub fn filter<T: FilterDate + Clone>(&self, records: &[T]) -> Vec<T> {
        if !self.active {
            return records.to_vec();
        }
        records
            .iter()
            .filter(|record| matches_pattern(&self.pattern, record.filter_date()))
            .cloned()
            .collect()
    }
}
