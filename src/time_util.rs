//! Contest-calendar constants and arithmetic.
//!
//! Baselines and `passed_weeks` are grounded on
//! `original_source/app/constants.py` and `app/utils.py::get_passed_weeks`.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc, Weekday};

/// Contest number and UTC start time of a known weekly contest, used as the
/// anchor for projecting all other weekly contest numbers/times.
pub const WEEKLY_CONTEST_BASE: (u32, &str) = (294, "2022-05-22T02:30:00Z");
/// Same, for biweekly contests.
pub const BIWEEKLY_CONTEST_BASE: (u32, &str) = (78, "2022-05-14T14:30:00Z");

pub fn weekly_base_time() -> DateTime<Utc> {
    WEEKLY_CONTEST_BASE.1.parse().expect("valid baseline")
}

pub fn biweekly_base_time() -> DateTime<Utc> {
    BIWEEKLY_CONTEST_BASE.1.parse().expect("valid baseline")
}

/// Number of whole weeks elapsed between `base` and `now` (can be negative
/// if `now` precedes `base`, matching the original's integer-week semantics).
pub fn passed_weeks(now: DateTime<Utc>, base: DateTime<Utc>) -> i64 {
    (now - base).num_weeks()
}

/// Projects the current weekly contest number from the baseline.
pub fn current_weekly_contest_number(now: DateTime<Utc>) -> u32 {
    let weeks = passed_weeks(now, weekly_base_time());
    (WEEKLY_CONTEST_BASE.0 as i64 + weeks).max(0) as u32
}

/// Projects the current biweekly contest number from the baseline. Biweekly
/// contests occur every other week aligned to the baseline's parity.
pub fn current_biweekly_contest_number(now: DateTime<Utc>) -> u32 {
    let weeks = passed_weeks(now, biweekly_base_time());
    let cycles = weeks.div_euclid(2);
    (BIWEEKLY_CONTEST_BASE.0 as i64 + cycles).max(0) as u32
}

/// Whether `now` falls on a biweekly contest's start week (even number of
/// weeks since the baseline).
pub fn is_biweekly_week(now: DateTime<Utc>) -> bool {
    passed_weeks(now, biweekly_base_time()).rem_euclid(2) == 0
}

/// True when `now` is within one scheduler tick (`tolerance`) of `weekday` at
/// `hour:minute` UTC.
pub fn is_at(now: DateTime<Utc>, weekday: Weekday, hour: u32, minute: u32) -> bool {
    now.weekday() == weekday && now.hour() == hour && now.minute() == minute
}

/// Minute-resolution grid of `count` timestamps starting one minute after
/// `start`, used by rank/question reconstruction (SPEC_FULL.md §4.5).
pub fn minute_grid(start: DateTime<Utc>, count: i64) -> Vec<DateTime<Utc>> {
    (1..=count).map(|m| start + Duration::minutes(m)).collect()
}
