//! Submission entity (SPEC_FULL.md §3), grounded on
//! `original_source/app/db/models.py::Submission` and
//! `app/crawler/contest_records.py::save_archive_contest_records`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::region::DataRegion;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub contest_slug: String,
    pub data_region: DataRegion,
    pub username: String,
    pub question_id: u64,
    /// Timestamp of the accepted submission.
    pub date: DateTime<Utc>,
    pub fail_count: u32,
    pub credit: u32,
    pub update_time: DateTime<Utc>,
}

impl Submission {
    /// Penalty-adjusted timestamp used for dense ranking (SPEC_FULL.md §4.5):
    /// the accepted time plus 5 minutes per prior failed attempt.
    pub fn penalty_date(&self) -> DateTime<Utc> {
        self.date + chrono::Duration::minutes(5 * self.fail_count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn penalty_date_adds_five_minutes_per_fail() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap();
        let s = Submission {
            contest_slug: "weekly-contest-400".into(),
            data_region: DataRegion::Us,
            username: "alice".into(),
            question_id: 1,
            date,
            fail_count: 2,
            credit: 3,
            update_time: date,
        };
        assert_eq!(s.penalty_date(), date + chrono::Duration::minutes(10));
    }
}
