//! Calendar bucket math for rolling player stats.
//!
//! Stateless pure functions; `now` is always an explicit parameter so
//! recompute behavior stays deterministic under test.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

use crate::models::PeriodType;

/// Bucket identifier for the period containing `date`.
///
/// "2024-07" (month), "2024-Q3" (quarter), "2024-H2" (half year),
/// "2024" (year).
pub fn period_key(period: PeriodType, date: NaiveDate) -> String {
    match period {
        PeriodType::Month => format!("{:04}-{:02}", date.year(), date.month()),
        PeriodType::Quarter => format!("{:04}-Q{}", date.year(), (date.month0() / 3) + 1),
        PeriodType::HalfYear => {
            format!("{:04}-H{}", date.year(), if date.month() <= 6 { 1 } else { 2 })
        }
        PeriodType::Year => format!("{:04}", date.year()),
    }
}

/// Calendar-aligned first day of the period containing `date`.
pub fn bucket_start(period: PeriodType, date: NaiveDate) -> NaiveDate {
    let (year, month) = match period {
        PeriodType::Month => (date.year(), date.month()),
        PeriodType::Quarter => (date.year(), (date.month0() / 3) * 3 + 1),
        PeriodType::HalfYear => (date.year(), if date.month() <= 6 { 1 } else { 7 }),
        PeriodType::Year => (date.year(), 1),
    };
    NaiveDate::from_ymd_opt(year, month, 1).expect("first day of period is a valid date")
}

/// First day of the period after the one containing `date`.
pub fn next_bucket_start(period: PeriodType, date: NaiveDate) -> NaiveDate {
    let start = bucket_start(period, date);
    let months = match period {
        PeriodType::Month => 1,
        PeriodType::Quarter => 3,
        PeriodType::HalfYear => 6,
        PeriodType::Year => 12,
    };
    let total = start.month0() + months;
    let (year, month0) = (start.year() + (total / 12) as i32, total % 12);
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).expect("first day of period is a valid date")
}

/// Half-open window `[start, end)` for the bucket containing `date`.
///
/// The natural end is the next period's first midnight; when that lies in
/// the future the window is capped at `now`, so future matches never leak
/// into a still-open bucket. The cap is exclusive too: a match timestamped
/// at the exact recompute instant is picked up by the next recompute.
pub fn bucket_bounds(
    period: PeriodType,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = midnight_utc(bucket_start(period, date));
    let natural_end = midnight_utc(next_bucket_start(period, date));
    (start, natural_end.min(now))
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is a valid time"))
}
