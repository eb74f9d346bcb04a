//! Contest entity (SPEC_FULL.md §3), grounded on
//! `original_source/app/db/models.py::Contest`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::status::ReadinessStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub title_slug: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub duration: Duration,
    #[serde(default)]
    pub is_past: bool,
    pub update_time: DateTime<Utc>,
    #[serde(default)]
    pub predict_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cn_user_num: Option<u32>,
    #[serde(default)]
    pub us_user_num: Option<u32>,
}

impl Contest {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + self.duration
    }

    /// Once a contest has been predicted, its predict rows are frozen
    /// (SPEC_FULL.md §3 invariants).
    pub fn is_predicted(&self) -> bool {
        self.predict_time.is_some()
    }

    pub fn is_biweekly(&self) -> bool {
        self.title_slug.starts_with("biweekly-contest-")
    }

    pub fn is_weekly(&self) -> bool {
        self.title_slug.starts_with("weekly-contest-")
    }

    /// Derives a [`ReadinessStatus`] from `is_past`/`predict_time` for
    /// operator-facing logging (SPEC_FULL.md §9 REDESIGN FLAGS). A contest
    /// that's past its end time but never got predicted counts as `Failed`
    /// rather than silently staying `Ongoing` forever.
    pub fn readiness_status(&self, now: DateTime<Utc>) -> ReadinessStatus {
        if self.is_predicted() {
            ReadinessStatus::Passed
        } else if self.is_past || now > self.end_time() {
            ReadinessStatus::Failed
        } else {
            ReadinessStatus::Ongoing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::status::ReadinessStatus;
    use chrono::TimeZone;

    fn sample() -> Contest {
        Contest {
            title_slug: "weekly-contest-400".into(),
            title: "Weekly Contest 400".into(),
            start_time: Utc.with_ymd_and_hms(2024, 6, 2, 2, 30, 0).unwrap(),
            duration: Duration::minutes(90),
            is_past: false,
            update_time: Utc.with_ymd_and_hms(2024, 6, 2, 2, 30, 0).unwrap(),
            predict_time: None,
            cn_user_num: None,
            us_user_num: None,
        }
    }

    #[test]
    fn end_time_is_start_plus_duration() {
        let c = sample();
        assert_eq!(c.end_time(), c.start_time + Duration::minutes(90));
    }

    #[test]
    fn predicted_flag_tracks_predict_time() {
        let mut c = sample();
        assert!(!c.is_predicted());
        c.predict_time = Some(c.start_time);
        assert!(c.is_predicted());
    }

    #[test]
    fn readiness_status_tracks_prediction_and_end_time() {
        let mut c = sample();
        assert_eq!(c.readiness_status(c.start_time), ReadinessStatus::Ongoing);
        assert_eq!(
            c.readiness_status(c.end_time() + Duration::minutes(1)),
            ReadinessStatus::Failed
        );
        c.predict_time = Some(c.end_time());
        assert_eq!(c.readiness_status(c.end_time()), ReadinessStatus::Passed);
    }

    #[test]
    fn classifies_weekly_vs_biweekly() {
        let mut c = sample();
        assert!(c.is_weekly());
        assert!(!c.is_biweekly());
        c.title_slug = "biweekly-contest-130".into();
        assert!(c.is_biweekly());
        assert!(!c.is_weekly());
    }
}
