//! Per-question minute-grid finish-count reconstruction (SPEC_FULL.md §4.5),
//! a port of `original_source/app/core/rank.py::aggregate_question_real_time_count`.

use chrono::{DateTime, Utc};

use crate::domain::Submission;

/// Cumulative accepted-submission count for `question_id` at each grid point.
/// Unlike rank reconstruction, no penalty offset applies to this curve.
pub fn finish_count_series(
    submissions: &[Submission],
    question_id: u64,
    grid: &[DateTime<Utc>],
) -> Vec<u32> {
    let relevant: Vec<DateTime<Utc>> = submissions
        .iter()
        .filter(|s| s.question_id == question_id)
        .map(|s| s.date)
        .collect();

    grid.iter()
        .map(|&t| relevant.iter().filter(|&&d| d <= t).count() as u32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DataRegion;
    use chrono::TimeZone;

    fn submission(user: &str, question_id: u64, minute: i64) -> Submission {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Submission {
            contest_slug: "weekly-contest-400".into(),
            data_region: DataRegion::Us,
            username: user.into(),
            question_id,
            date: base + chrono::Duration::minutes(minute),
            fail_count: 0,
            credit: 3,
            update_time: base,
        }
    }

    #[test]
    fn counts_are_monotonically_nondecreasing() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let subs = vec![
            submission("a", 1, 5),
            submission("b", 1, 15),
            submission("c", 2, 8),
        ];
        let grid = crate::time_util::minute_grid(base, 20);
        let series = finish_count_series(&subs, 1, &grid);
        assert_eq!(series.len(), 20);
        assert_eq!(series[3], 0); // minute 4 < 5, not yet counted
        assert_eq!(series[4], 1); // minute 5 == 5
        assert_eq!(series[14], 2); // minute 15 == 15
        for w in series.windows(2) {
            assert!(w[1] >= w[0]);
        }
    }
}
