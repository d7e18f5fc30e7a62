//! Calendar value types and the year/month expansion used to build archive
//! download requests.

use crate::error::Era5VisError;
use chrono::NaiveDate;
use std::fmt;
use std::fmt::{Display, Formatter};

/// A calendar month within a specific year.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The first instant of this month, used for window slicing.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// An inclusive month window, from the first day of `start` to the first day
/// of `end`.
///
/// # Examples
///
/// ```
/// use era5vis::{DateRange, Month};
///
/// let range = DateRange::new(Month::new(1985, 10), Month::new(1986, 3));
/// let (years, months) = range.expand();
/// assert_eq!(years, ["1985", "1986"]);
/// assert_eq!(months, ["01", "02", "03", "10", "11", "12"]);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: Month,
    pub end: Month,
}

impl DateRange {
    pub fn new(start: Month, end: Month) -> Self {
        Self { start, end }
    }

    /// Expands the window into the year and month code lists the archive
    /// request format wants.
    ///
    /// Same-year windows produce the single year and the literal inclusive
    /// month run. Multi-year windows produce every year in the span and
    /// either all twelve months or, when the start month is later in the
    /// calendar than the end month, the sorted union of `start..=12` and
    /// `1..=end`. That union applies to *every* year in the span; the
    /// expansion cannot exclude months from only the first or last year,
    /// which over-fetches at the edges of a wrapped window.
    ///
    /// Years are plain integer-to-string conversions (no digit padding);
    /// months are always two-digit zero-padded codes.
    ///
    /// The multi-year path does not validate that the start precedes the end;
    /// callers that need chronology enforced should check
    /// [`DateRange::is_chronological`] first.
    pub fn expand(&self) -> (Vec<String>, Vec<String>) {
        if self.start.year == self.end.year {
            let years = vec![self.start.year.to_string()];
            let months = (self.start.month..=self.end.month)
                .map(|m| format!("{m:02}"))
                .collect();
            return (years, months);
        }

        let years = (self.start.year..=self.end.year)
            .map(|y| y.to_string())
            .collect();

        let months = if self.start.month > self.end.month {
            let mut wrapped: Vec<u32> = (self.start.month..=12)
                .chain(1..=self.end.month)
                .collect();
            wrapped.sort_unstable();
            wrapped.dedup();
            wrapped.into_iter().map(|m| format!("{m:02}")).collect()
        } else {
            (1..=12).map(|m| format!("{m:02}")).collect()
        };

        (years, months)
    }

    /// Whether the end instant is strictly after the start instant.
    pub fn is_chronological(&self) -> bool {
        match (self.start.first_day(), self.end.first_day()) {
            (Some(start), Some(end)) => start < end,
            _ => false,
        }
    }

    /// First day of the start month.
    pub fn start_date(&self) -> Result<NaiveDate, Era5VisError> {
        self.start
            .first_day()
            .ok_or(Era5VisError::InvalidMonth(self.start))
    }

    /// First day of the end month.
    pub fn end_date(&self) -> Result<NaiveDate, Era5VisError> {
        self.end
            .first_day()
            .ok_or(Era5VisError::InvalidMonth(self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(sy: i32, sm: u32, ey: i32, em: u32) -> DateRange {
        DateRange::new(Month::new(sy, sm), Month::new(ey, em))
    }

    #[test]
    fn multi_year_window_expands_to_all_months() {
        let (years, months) = range(1985, 1, 1988, 2).expand();
        assert_eq!(years, ["1985", "1986", "1987", "1988"]);
        assert_eq!(
            months,
            ["01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12"]
        );
    }

    #[test]
    fn same_year_window_expands_to_the_literal_month_run() {
        let (years, months) = range(1985, 1, 1985, 9).expand();
        assert_eq!(years, ["1985"]);
        assert_eq!(
            months,
            ["01", "02", "03", "04", "05", "06", "07", "08", "09"]
        );
    }

    #[test]
    fn wrapped_months_are_sorted_and_deduplicated() {
        let (years, months) = range(1985, 10, 1986, 3).expand();
        assert_eq!(years, ["1985", "1986"]);
        assert_eq!(months, ["01", "02", "03", "10", "11", "12"]);
    }

    #[test]
    fn years_are_never_truncated_in_the_supported_window() {
        let (years, _) = range(1979, 1, 2020, 12).expand();
        assert_eq!(years.len(), 42);
        assert_eq!(years.first().map(String::as_str), Some("1979"));
        assert_eq!(years.last().map(String::as_str), Some("2020"));
        assert!(years.iter().all(|y| y.len() == 4));
    }

    #[test]
    fn chronology_check() {
        assert!(range(1999, 2, 2000, 12).is_chronological());
        assert!(range(2000, 1, 2000, 2).is_chronological());
        assert!(!range(2000, 2, 2000, 2).is_chronological());
        assert!(!range(2000, 2, 1999, 1).is_chronological());
    }

    #[test]
    fn window_instants_are_first_of_month() {
        let r = range(1998, 12, 2000, 2);
        assert_eq!(
            r.start_date().unwrap(),
            NaiveDate::from_ymd_opt(1998, 12, 1).unwrap()
        );
        assert_eq!(
            r.end_date().unwrap(),
            NaiveDate::from_ymd_opt(2000, 2, 1).unwrap()
        );
    }
}
