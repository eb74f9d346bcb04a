//! Question entity (SPEC_FULL.md §3), grounded on
//! `original_source/app/db/models.py::Question`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub contest_slug: String,
    pub question_id: u64,
    pub credit: u32,
    pub title: String,
    /// 1-indexed ordinal position within the contest (1..=4).
    pub qi: u8,
    /// 90-length minute-grid cumulative finish count (SPEC_FULL.md §4.5).
    #[serde(default)]
    pub real_time_count: Option<Vec<u32>>,
    pub update_time: DateTime<Utc>,
}
