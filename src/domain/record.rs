//! ContestRecordPredict / ContestRecordArchive entities (SPEC_FULL.md §3),
//! grounded on `original_source/app/db/models.py::ContestRecordPredict`/
//! `ContestRecordArchive`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::region::DataRegion;

/// Shared identity + scoring fields common to both predict and archive rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordKey {
    pub contest_slug: String,
    pub data_region: DataRegion,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestRecordPredict {
    pub key: RecordKey,
    pub rank: u32,
    pub score: i32,
    pub finish_time: DateTime<Utc>,
    #[serde(default)]
    pub old_rating: Option<f64>,
    #[serde(default)]
    pub attended_contests_count: Option<u32>,
    #[serde(default)]
    pub delta_rating: Option<f64>,
    #[serde(default)]
    pub new_rating: Option<f64>,
    #[serde(default)]
    pub predict_time: Option<DateTime<Utc>>,
}

impl ContestRecordPredict {
    pub fn is_scored(&self) -> bool {
        self.score != 0
    }

    pub fn is_predicted(&self) -> bool {
        self.new_rating.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestRecordArchive {
    pub key: RecordKey,
    pub rank: u32,
    pub score: i32,
    pub finish_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    /// 90-length minute-grid rank trajectory (SPEC_FULL.md §4.5). Only
    /// populated for participants with `score != 0` (Open Question #2 in
    /// DESIGN.md).
    #[serde(default)]
    pub real_time_rank: Option<Vec<u32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key() -> RecordKey {
        RecordKey {
            contest_slug: "weekly-contest-400".into(),
            data_region: DataRegion::Us,
            username: "alice".into(),
        }
    }

    #[test]
    fn predict_scored_and_predicted_flags() {
        let mut r = ContestRecordPredict {
            key: key(),
            rank: 1,
            score: 0,
            finish_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            old_rating: None,
            attended_contests_count: None,
            delta_rating: None,
            new_rating: None,
            predict_time: None,
        };
        assert!(!r.is_scored());
        assert!(!r.is_predicted());
        r.score = 18;
        r.new_rating = Some(1600.0);
        assert!(r.is_scored());
        assert!(r.is_predicted());
    }
}
