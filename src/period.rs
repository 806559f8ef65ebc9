//! Period calculus: canonical identifiers for calendar buckets.
//!
//! Every goal is scoped to one period at a given [`Granularity`]:
//!
//! - **daily** — `YYYY-MM-DD`
//! - **weekly** — `YYYY-Www`, ISO-8601 week numbering (weeks start Monday;
//!   week 1 is the week containing the year's first Thursday)
//! - **monthly** — `YYYY-MM`
//!
//! Weekly identifiers use the ISO *week-based* year, so the last days of
//! December can belong to week 1 of the next year and the first days of
//! January to the last week of the previous year. Callers must not assume a
//! period id and the calendar year share the same prefix.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PeriodError;

/// Result type for period operations.
pub type PeriodResult<T> = std::result::Result<T, PeriodError>;

static DAILY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());
static WEEKLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-W(\d{2})$").unwrap());
static MONTHLY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").unwrap());

/// Time-bucket size of a goal.
///
/// The three granularities form a fixed ladder: daily links under weekly,
/// weekly under monthly. Serialized lowercase (the document field is `type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// All granularities, finest first.
    pub const ALL: [Granularity; 3] = [Self::Daily, Self::Weekly, Self::Monthly];

    /// The next coarser granularity, or `None` for monthly.
    pub fn coarser(self) -> Option<Granularity> {
        match self {
            Self::Daily => Some(Self::Weekly),
            Self::Weekly => Some(Self::Monthly),
            Self::Monthly => None,
        }
    }

    /// Lowercase name as used in the persisted document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!(
                "unknown granularity \"{other}\" (expected daily, weekly, or monthly)"
            )),
        }
    }
}

/// Canonical period identifier for `date` at `granularity`.
///
/// Deterministic, pure, total over valid dates.
pub fn period_id(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day()),
        Granularity::Weekly => {
            let iso = date.iso_week();
            format!("{:04}-W{:02}", iso.year(), iso.week())
        }
        Granularity::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
    }
}

/// Inverse of [`period_id`]: a representative date inside the period.
///
/// Daily ids resolve to the day itself, weekly ids to the Monday of that ISO
/// week, monthly ids to the first of the month. Fails with
/// [`PeriodError::Malformed`] if the string matches none of the three
/// recognized shapes or names an impossible bucket.
pub fn representative_date(period_id: &str) -> PeriodResult<NaiveDate> {
    let malformed = || PeriodError::Malformed {
        period_id: period_id.to_string(),
    };

    if let Some(caps) = DAILY_RE.captures(period_id) {
        let year: i32 = caps[1].parse().map_err(|_| malformed())?;
        let month: u32 = caps[2].parse().map_err(|_| malformed())?;
        let day: u32 = caps[3].parse().map_err(|_| malformed())?;
        return NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed);
    }

    if let Some(caps) = WEEKLY_RE.captures(period_id) {
        let year: i32 = caps[1].parse().map_err(|_| malformed())?;
        let week: u32 = caps[2].parse().map_err(|_| malformed())?;
        return NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(malformed);
    }

    if let Some(caps) = MONTHLY_RE.captures(period_id) {
        let year: i32 = caps[1].parse().map_err(|_| malformed())?;
        let month: u32 = caps[2].parse().map_err(|_| malformed())?;
        return NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(malformed);
    }

    Err(malformed())
}

/// Period identifier of the next coarser bucket covering `period_id`.
///
/// Daily periods map to the weekly id covering their date; weekly periods map
/// to the monthly id covering their representative Monday; monthly periods
/// have no parent. Computed by resolving the period to a date and re-deriving
/// at the coarser granularity.
pub fn parent_period_id(granularity: Granularity, child_period_id: &str) -> PeriodResult<Option<String>> {
    let Some(coarser) = granularity.coarser() else {
        return Ok(None);
    };
    let date = representative_date(child_period_id)?;
    Ok(Some(period_id(date, coarser)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_period_id() {
        assert_eq!(period_id(date(2024, 1, 5), Granularity::Daily), "2024-01-05");
        assert_eq!(period_id(date(2024, 11, 30), Granularity::Daily), "2024-11-30");
    }

    #[test]
    fn monthly_period_id() {
        assert_eq!(period_id(date(2024, 1, 5), Granularity::Monthly), "2024-01");
        assert_eq!(period_id(date(2024, 12, 31), Granularity::Monthly), "2024-12");
    }

    #[test]
    fn weekly_period_id_mid_year() {
        // 2024-06-12 is a Wednesday in ISO week 24.
        assert_eq!(period_id(date(2024, 6, 12), Granularity::Weekly), "2024-W24");
    }

    #[test]
    fn weekly_period_id_uses_iso_week_year() {
        // Dec 30 2024 is the Monday of ISO week 1 of 2025.
        assert_eq!(period_id(date(2024, 12, 30), Granularity::Weekly), "2025-W01");
        // Jan 1 2027 is a Friday in ISO week 53 of 2026.
        assert_eq!(period_id(date(2027, 1, 1), Granularity::Weekly), "2026-W53");
        // Jan 2 2021 is a Saturday in ISO week 53 of 2020.
        assert_eq!(period_id(date(2021, 1, 2), Granularity::Weekly), "2020-W53");
    }

    #[test]
    fn representative_date_daily() {
        assert_eq!(representative_date("2024-03-17").unwrap(), date(2024, 3, 17));
    }

    #[test]
    fn representative_date_weekly_is_monday() {
        assert_eq!(representative_date("2025-W01").unwrap(), date(2024, 12, 30));
        assert_eq!(representative_date("2024-W24").unwrap(), date(2024, 6, 10));
    }

    #[test]
    fn representative_date_monthly_is_first() {
        assert_eq!(representative_date("2024-02").unwrap(), date(2024, 2, 1));
    }

    #[test]
    fn representative_date_rejects_garbage() {
        for bad in ["", "2024", "2024-W1", "W01-2024", "2024-13", "2024-00",
                    "2024-02-30", "2024-W54", "2024-W00", "24-01-01", "2024/01/01"] {
            assert!(
                representative_date(bad).is_err(),
                "expected \"{bad}\" to be rejected"
            );
        }
    }

    #[test]
    fn round_trip_stays_in_bucket() {
        let samples = [
            date(2024, 1, 1),
            date(2024, 2, 29),
            date(2024, 6, 12),
            date(2024, 12, 30),
            date(2025, 1, 1),
        ];
        for d in samples {
            for g in Granularity::ALL {
                let id = period_id(d, g);
                let rep = representative_date(&id).unwrap();
                // The representative must re-derive the same identifier.
                assert_eq!(period_id(rep, g), id, "bucket drift for {d} at {g}");
            }
        }
    }

    #[test]
    fn parent_of_daily_is_covering_week() {
        assert_eq!(
            parent_period_id(Granularity::Daily, "2024-06-12").unwrap(),
            Some("2024-W24".into())
        );
        // Year-boundary day belongs to next year's week 1.
        assert_eq!(
            parent_period_id(Granularity::Daily, "2024-12-30").unwrap(),
            Some("2025-W01".into())
        );
    }

    #[test]
    fn parent_of_weekly_is_month_of_monday() {
        assert_eq!(
            parent_period_id(Granularity::Weekly, "2024-W24").unwrap(),
            Some("2024-06".into())
        );
        // Week 1 of 2025 starts on 2024-12-30, so its month is 2024-12.
        assert_eq!(
            parent_period_id(Granularity::Weekly, "2025-W01").unwrap(),
            Some("2024-12".into())
        );
    }

    #[test]
    fn monthly_has_no_parent() {
        assert_eq!(parent_period_id(Granularity::Monthly, "2024-06").unwrap(), None);
    }

    #[test]
    fn parent_of_malformed_period_errors() {
        assert!(parent_period_id(Granularity::Daily, "not-a-period").is_err());
    }

    #[test]
    fn granularity_ladder() {
        assert_eq!(Granularity::Daily.coarser(), Some(Granularity::Weekly));
        assert_eq!(Granularity::Weekly.coarser(), Some(Granularity::Monthly));
        assert_eq!(Granularity::Monthly.coarser(), None);
    }

    #[test]
    fn granularity_parse_and_display() {
        for g in Granularity::ALL {
            assert_eq!(g.as_str().parse::<Granularity>().unwrap(), g);
        }
        assert!("hourly".parse::<Granularity>().is_err());
    }
}
