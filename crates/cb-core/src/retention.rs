//! # Retention
//!
//! Listings are garbage-collected when they are read: jobs expire a fixed
//! number of days after posting, events expire once their date has passed.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, Utc};

/// Default age after which a job posting is dropped.
pub const JOB_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub job_max_age: Duration,
}

impl RetentionPolicy {
    pub fn from_days(days: i64) -> Self {
        Self {
            job_max_age: Duration::days(days),
        }
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::from_days(JOB_RETENTION_DAYS)
    }
}

/// Parses a posting timestamp.
///
/// Accepts RFC 3339, a naive ISO date-time (read as UTC) and a bare
/// `YYYY-MM-DD` date (midnight UTC). Anything else yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parses an event date down to the calendar day.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(day);
    }
    parse_timestamp(raw).map(|ts| ts.with_timezone(&Local).date_naive())
}

/// A job expires once more than `max_age` has elapsed since `posted_at`.
/// Unparseable timestamps never expire.
pub fn job_is_expired(posted_at: &str, max_age: Duration, now: DateTime<Utc>) -> bool {
    parse_timestamp(posted_at).is_some_and(|posted| now - posted > max_age)
}

/// An event expires once its day is strictly before `today`.
/// Unparseable dates never expire.
pub fn event_is_expired(date: &str, today: NaiveDate) -> bool {
    parse_day(date).is_some_and(|day| day < today)
}

/// The current calendar day as seen by the server.
pub fn local_day(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}
