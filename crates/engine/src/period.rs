use chrono::{DateTime, Datelike, NaiveDate};

use crate::{EngineError, ResultEngine};

/// Month bucket used to scope aggregate and report queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    AllTime,
    Month { year: i32, month: u32 },
}

impl Period {
    /// Parses `YYYY-MM`, or the empty string for all time.
    pub fn parse(raw: &str) -> ResultEngine<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::AllTime);
        }

        let date = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
            .map_err(|_| EngineError::InvalidPeriod(raw.to_string()))?;
        Ok(Self::Month {
            year: date.year(),
            month: date.month(),
        })
    }

    /// Returns `true` if the month bucket falls inside the period.
    pub fn contains(self, bucket: MonthBucket) -> bool {
        match self {
            Self::AllTime => true,
            Self::Month { year, month } => bucket.year == year && bucket.month == month,
        }
    }
}

/// Calendar month of a stored transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
}

/// Converts a nanosecond timestamp into its UTC month bucket and the
/// `YYYY-MM-DD HH:MM:SS` rendering stored with the transaction.
pub(crate) fn bucket_and_date(timestamp_ns: u64) -> ResultEngine<(MonthBucket, String)> {
    let nanos = i64::try_from(timestamp_ns)
        .map_err(|_| EngineError::InvalidBatch(format!("timestamp out of range: {timestamp_ns}")))?;
    let at = DateTime::from_timestamp_nanos(nanos);
    let bucket = MonthBucket {
        year: at.year(),
        month: at.month(),
    };
    Ok((bucket, at.format("%Y-%m-%d %H:%M:%S").to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_month_and_all_time() {
        assert_eq!(Period::parse("").unwrap(), Period::AllTime);
        assert_eq!(
            Period::parse("2024-02").unwrap(),
            Period::Month {
                year: 2024,
                month: 2
            }
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Period::parse("2024-13").is_err());
        assert!(Period::parse("february").is_err());
    }

    #[test]
    fn timestamp_maps_to_utc_month() {
        // 2024-02-29 23:59:59 UTC
        let ns = 1_709_251_199u64 * 1_000_000_000;
        let (bucket, date) = bucket_and_date(ns).unwrap();
        assert_eq!(bucket, MonthBucket { year: 2024, month: 2 });
        assert_eq!(date, "2024-02-29 23:59:59");
    }
}
