use chrono::{DateTime, NaiveDate, Utc};

use crate::types::track::LegSchedule;

/// Returned when a leg's dates are missing or inverted. The value has no
/// deeper meaning than "somewhere mid-journey"; it only drives a visual
/// indicator.
pub const FALLBACK_PROGRESS: f64 = 50.0;

/// Actual dates take precedence over planned ones. Calendar dates are read as
/// midnight UTC.
pub fn estimate_progress(
    planned_start: Option<NaiveDate>,
    planned_end: Option<NaiveDate>,
    actual_start: Option<NaiveDate>,
    actual_end: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> f64 {
    let (Some(start), Some(end)) = (actual_start.or(planned_start), actual_end.or(planned_end))
    else {
        return FALLBACK_PROGRESS;
    };

    let start = midnight_utc(start);
    let end = midnight_utc(end);
    if start >= end {
        return FALLBACK_PROGRESS;
    }

    if now <= start {
        return 0.0;
    }
    if now >= end {
        return 100.0;
    }

    let total = (end - start).num_seconds() as f64;
    let elapsed = (now - start).num_seconds() as f64;
    (elapsed / total * 100.0).clamp(0.0, 100.0)
}

pub fn estimate_schedule(schedule: &LegSchedule, now: DateTime<Utc>) -> f64 {
    estimate_progress(
        schedule.planned_start,
        schedule.planned_end,
        schedule.actual_start,
        schedule.actual_end,
        now,
    )
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}
