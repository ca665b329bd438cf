use core::fmt;
use core::str::FromStr;

use api_types::ledger::PeriodQuery;
use chrono::{Datelike, Local, NaiveDate};

use crate::error::TrackerError;

/// Month scope of a query: a calendar month or all time.
///
/// On the wire a month is `YYYY-MM` and all time is the empty string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PeriodKey {
    #[default]
    AllTime,
    Month { year: i32, month: u32 },
}

impl PeriodKey {
    pub fn month(year: i32, month: u32) -> Result<Self, TrackerError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(TrackerError::Validation(format!(
                "invalid month {year:04}-{month:02}"
            )));
        }
        Ok(Self::Month { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current local month.
    #[must_use]
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    #[must_use]
    pub fn is_all_time(&self) -> bool {
        matches!(self, Self::AllTime)
    }

    #[must_use]
    pub fn to_query(&self) -> PeriodQuery {
        PeriodQuery {
            year_month: self.to_string(),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllTime => Ok(()),
            Self::Month { year, month } => write!(f, "{year:04}-{month:02}"),
        }
    }
}

impl FromStr for PeriodKey {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::AllTime);
        }
        let date = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map_err(|_| TrackerError::Validation(format!("invalid period '{s}', expected YYYY-MM")))?;
        Ok(Self::containing(date))
    }
}

/// The two independently selected months of the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodSelector {
    pub dashboard: PeriodKey,
    pub report: PeriodKey,
}

impl PeriodSelector {
    /// Both selectors on the same month.
    #[must_use]
    pub fn starting_at(period: PeriodKey) -> Self {
        Self {
            dashboard: period,
            report: period,
        }
    }
}

impl Default for PeriodSelector {
    fn default() -> Self {
        Self::starting_at(PeriodKey::current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_months() {
        let period: PeriodKey = "2024-03".parse().unwrap();
        assert_eq!(period, PeriodKey::Month { year: 2024, month: 3 });
        assert_eq!(period.to_string(), "2024-03");
        assert_eq!(period.to_query().year_month, "2024-03");
    }

    #[test]
    fn empty_is_all_time() {
        let period: PeriodKey = "".parse().unwrap();
        assert!(period.is_all_time());
        assert_eq!(period.to_string(), "");
    }

    #[test]
    fn rejects_garbage() {
        assert!("2024-13".parse::<PeriodKey>().is_err());
        assert!("march".parse::<PeriodKey>().is_err());
        assert!(PeriodKey::month(2024, 0).is_err());
    }

    #[test]
    fn selector_defaults_to_current_month() {
        let selector = PeriodSelector::default();
        assert_eq!(selector.dashboard, selector.report);
        assert!(!selector.dashboard.is_all_time());
    }
}
