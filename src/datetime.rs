//! Date and time conversions at the store boundary.
//!
//! All timestamp-to-calendar-day interpretation lives here: the store keeps
//! absolute `DateTime<Utc>` instants, every layer above works with plain
//! `NaiveDate` days bucketed in **local** time. Day keys are derived from
//! local year/month/day fields, never from ISO-string slicing, so users west
//! of UTC do not see events shift a day at midnight boundaries.

use chrono::{DateTime, Datelike, Local, LocalResult, NaiveDate, TimeZone, Utc};

/// The local calendar day an instant falls on.
pub fn local_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Today's local calendar day.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// 00:00:00 local time on the given day, as a store timestamp.
pub fn start_of_local_day(day: NaiveDate) -> DateTime<Utc> {
    let naive = day.and_hms_opt(0, 0, 0).unwrap();
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // Local midnight skipped by a DST jump; fall back to the UTC reading.
        LocalResult::None => DateTime::from_naive_utc_and_offset(naive, Utc),
    }
}

/// 23:59:59 local time on the given day, as a store timestamp.
pub fn end_of_local_day(day: NaiveDate) -> DateTime<Utc> {
    let naive = day.and_hms_opt(23, 59, 59).unwrap();
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => DateTime::from_naive_utc_and_offset(naive, Utc),
    }
}

/// Stable `YYYY-MM-DD` key for a calendar day.
pub fn date_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

const SHORT_DAYS: [&str; 7] = ["ma", "di", "wo", "do", "vr", "za", "zo"];
const SHORT_MONTHS: [&str; 12] = [
    "jan", "feb", "mrt", "apr", "mei", "jun", "jul", "aug", "sep", "okt", "nov", "dec",
];
const FULL_DAYS: [&str; 7] = [
    "maandag",
    "dinsdag",
    "woensdag",
    "donderdag",
    "vrijdag",
    "zaterdag",
    "zondag",
];
const FULL_MONTHS: [&str; 12] = [
    "januari",
    "februari",
    "maart",
    "april",
    "mei",
    "juni",
    "juli",
    "augustus",
    "september",
    "oktober",
    "november",
    "december",
];

/// Short Dutch day label for the date tape, e.g. `za 1 jun`.
pub fn format_day_label(day: NaiveDate) -> String {
    format!(
        "{} {} {}",
        SHORT_DAYS[day.weekday().num_days_from_monday() as usize],
        day.day(),
        SHORT_MONTHS[day.month0() as usize],
    )
}

/// Full Dutch date for event detail views, e.g. `zaterdag 1 juni 2025`.
pub fn format_event_date(instant: DateTime<Utc>) -> String {
    let day = local_day(instant);
    format!(
        "{} {} {} {}",
        FULL_DAYS[day.weekday().num_days_from_monday() as usize],
        day.day(),
        FULL_MONTHS[day.month0() as usize],
        day.year(),
    )
}
