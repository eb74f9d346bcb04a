//! Per-user rating GraphQL response parsing (SPEC_FULL.md §4.2), grounded on
//! `original_source/app/crawler/users.py`.

use crate::domain::user::{DEFAULT_ATTENDED_COUNT_FOR_NEWCOMER, DEFAULT_RATING_FOR_NEWCOMER};

#[derive(Debug, Clone, PartialEq)]
pub struct UserRating {
    pub rating: f64,
    pub attended_contests_count: u32,
}

/// GraphQL query body for `userContestRanking`.
pub const USER_CONTEST_RANKING_QUERY: &str = r#"
    query userContestRankingInfo($username: String!) {
        userContestRanking(username: $username) {
            attendedContestsCount
            rating
        }
    }
"#;

/// Parses the `userContestRanking` GraphQL payload. A `null` result (the
/// user has never entered a rated contest) yields the newcomer defaults,
/// matching `DEFAULT_RATING_FOR_NEWCOMER` in the reference crawler.
pub fn parse_user_rating(data: &serde_json::Value) -> UserRating {
    let node = &data["userContestRanking"];
    if node.is_null() {
        return UserRating {
            rating: DEFAULT_RATING_FOR_NEWCOMER,
            attended_contests_count: DEFAULT_ATTENDED_COUNT_FOR_NEWCOMER,
        };
    }
    UserRating {
        rating: node["rating"].as_f64().unwrap_or(DEFAULT_RATING_FOR_NEWCOMER),
        attended_contests_count: node["attendedContestsCount"].as_u64().unwrap_or(0) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_ranking_yields_newcomer_defaults() {
        let data = json!({"userContestRanking": null});
        let rating = parse_user_rating(&data);
        assert_eq!(rating.rating, 1500.0);
        assert_eq!(rating.attended_contests_count, 0);
    }

    #[test]
    fn parses_existing_rating() {
        let data = json!({"userContestRanking": {"attendedContestsCount": 12, "rating": 1732.5}});
        let rating = parse_user_rating(&data);
        assert_eq!(rating.rating, 1732.5);
        assert_eq!(rating.attended_contests_count, 12);
    }
}
