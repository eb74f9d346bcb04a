//! User entity (SPEC_FULL.md §3), grounded on
//! `original_source/app/db/models.py::User` and
//! `app/crawler/users.py::DEFAULT_RATING_FOR_NEWCOMER`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::region::DataRegion;

/// Default rating/attended-count assigned to a participant not yet present
/// in the User store (new to the platform).
pub const DEFAULT_RATING_FOR_NEWCOMER: f64 = 1500.0;
pub const DEFAULT_ATTENDED_COUNT_FOR_NEWCOMER: u32 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub data_region: DataRegion,
    pub username: String,
    pub rating: f64,
    pub attended_contests_count: u32,
    pub update_time: DateTime<Utc>,
}

impl User {
    pub fn newcomer(data_region: DataRegion, username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            data_region,
            username: username.into(),
            rating: DEFAULT_RATING_FOR_NEWCOMER,
            attended_contests_count: DEFAULT_ATTENDED_COUNT_FOR_NEWCOMER,
            update_time: now,
        }
    }

    /// Whether this record is stale enough to warrant a refresh, bounding
    /// upstream load per SPEC_FULL.md §3 lifecycle ("stale reads within 36h
    /// are reused").
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        (now - self.update_time).num_hours() >= 36
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn newcomer_gets_default_rating() {
        let now = Utc::now();
        let u = User::newcomer(DataRegion::Us, "bob", now);
        assert_eq!(u.rating, 1500.0);
        assert_eq!(u.attended_contests_count, 0);
    }

    #[test]
    fn staleness_threshold_is_36_hours() {
        let now = Utc::now();
        let mut u = User::newcomer(DataRegion::Us, "bob", now - Duration::hours(35));
        assert!(!u.is_stale(now));
        u.update_time = now - Duration::hours(36);
        assert!(u.is_stale(now));
    }
}
