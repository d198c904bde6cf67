//! Timing - elapsed spans, duration text and pressure decay

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::locale::Strings;
use crate::units::bar_to_psi;

/// Span between two times of day on the same test date.
///
/// An end time earlier than the start time is taken to be on the next
/// calendar day (the hold ran past midnight).
pub fn elapsed_between(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Duration {
    let start_at = date.and_time(start);
    let mut end_at = date.and_time(end);
    if end_at < start_at {
        end_at += Duration::days(1);
    }
    end_at - start_at
}

/// Span between two instants, without any rollover.
pub fn elapsed_instants(start: NaiveDateTime, end: NaiveDateTime) -> Duration {
    end - start
}

/// Whole minutes, rounded to nearest.
pub fn total_minutes(span: Duration) -> i64 {
    (span.num_milliseconds() as f64 / 60_000.0).round() as i64
}

/// `(hours, minutes)` with `0 <= minutes < 60`.
pub fn split_minutes(total: i64) -> (i64, i64) {
    (total.div_euclid(60), total.rem_euclid(60))
}

pub fn fmt_duration(span: Duration, strings: &Strings) -> String {
    let (h, m) = split_minutes(total_minutes(span));
    format!("{} {} {} {}", h, strings.hours, m, strings.minutes)
}

pub fn hours(span: Duration) -> f64 {
    span.num_milliseconds() as f64 / 3_600_000.0
}

/// Pressure drop per hour during the hold. Positive means pressure was lost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecayRate {
    pub bar_per_hour: f64,
    pub psi_per_hour: f64,
}

/// `None` when the span is not strictly positive.
pub fn decay_rate(start_bar: f64, end_bar: f64, span: Duration) -> Option<DecayRate> {
    let h = hours(span);
    if h <= 0.0 {
        return None;
    }
    let bar_per_hour = (start_bar - end_bar) / h;
    Some(DecayRate {
        bar_per_hour,
        psi_per_hour: bar_to_psi(Some(bar_per_hour))?,
    })
}
