//! End-to-end scenarios across the rating, reconstruction, and config layers.
//!
//! These exercise the crate's public API the way a full pipeline run would
//! chain it, without a live MongoDB instance. Handler-level tests that need
//! a live store (`save_predict_contest_records`, tombstone sweeps against
//! real collections) require a running MongoDB and are not included here —
//! see DESIGN.md for the note on store-backed test coverage.

use chrono::{TimeZone, Utc};
use contest_predictor::domain::{DataRegion, Submission, User};
use contest_predictor::rating::{RatingInput, elo};
use contest_predictor::reconstruct::{question, rank};
use contest_predictor::time_util::minute_grid;

fn newcomer_rating() -> f64 {
    User::newcomer(DataRegion::Us, "new_participant", Utc::now()).rating
}

#[test]
fn new_user_gets_default_rating_before_scoring() {
    assert_eq!(newcomer_rating(), 1500.0);
}

#[test]
fn weekly_contest_predicts_rating_deltas_for_a_mixed_field() {
    // A field of five participants: one newcomer, four with established
    // ratings spanning a realistic weekly-contest spread.
    let input = RatingInput {
        rank: vec![1.0, 2.0, 3.0, 4.0, 5.0],
        rating: vec![1850.0, 1700.0, 1500.0, 1500.0, 1300.0],
        attended_count: vec![40, 25, 0, 0, 10],
    };
    let deltas = elo::elo_delta(&input);
    assert_eq!(deltas.len(), 5);

    // Best placement among equal-rated newcomers should not lose rating.
    assert!(deltas[2] >= deltas[3]);
    // The lowest-rated participant, placing last, should lose rating.
    assert!(*deltas.last().unwrap() < 0.0);

    let new_ratings: Vec<f64> = input
        .rating
        .iter()
        .zip(deltas.iter())
        .map(|(r, d)| r + d)
        .collect();
    assert!(new_ratings.iter().all(|r| r.is_finite()));
}

#[test]
fn dense_rank_and_finish_count_reconstruct_consistently_over_the_grid() {
    let start = Utc.with_ymd_and_hms(2024, 6, 2, 2, 30, 0).unwrap();
    let submissions = vec![
        Submission {
            contest_slug: "weekly-contest-400".into(),
            data_region: DataRegion::Us,
            username: "alice".into(),
            question_id: 1,
            date: start + chrono::Duration::minutes(3),
            fail_count: 0,
            credit: 3,
            update_time: start + chrono::Duration::minutes(3),
        },
        Submission {
            contest_slug: "weekly-contest-400".into(),
            data_region: DataRegion::Us,
            username: "bob".into(),
            question_id: 1,
            date: start + chrono::Duration::minutes(5),
            fail_count: 1,
            credit: 3,
            update_time: start + chrono::Duration::minutes(5),
        },
    ];
    let grid = minute_grid(start, 90);
    assert_eq!(grid.len(), 90);

    let counts = question::finish_count_series(&submissions, 1, &grid);
    assert_eq!(counts[0], 0); // minute 1: nobody finished yet
    assert_eq!(counts[2], 1); // minute 3: alice
    assert_eq!(counts[4], 2); // minute 5: alice + bob

    let series = rank::real_time_rank_series(
        &submissions,
        &grid,
        &[
            ("alice".to_string(), DataRegion::Us),
            ("bob".to_string(), DataRegion::Us),
        ],
    );
    let alice_ranks = &series[&("alice".to_string(), DataRegion::Us)];
    let bob_ranks = &series[&("bob".to_string(), DataRegion::Us)];
    // Before anyone has submitted, both are tied last (rank 1, nobody ahead).
    assert_eq!(alice_ranks[0], 1);
    assert_eq!(bob_ranks[0], 1);
    // After alice finishes (accounting for bob's fail-count penalty), alice
    // should rank at or ahead of bob.
    assert!(alice_ranks[89] <= bob_ranks[89]);
}

#[test]
fn config_round_trips_with_scheduler_defaults() {
    let toml_str = r#"
        [mongodb]
        ip = "localhost"
        port = 27017
        username = "predictor"
        password = "secret"
        db = "lccn_predictor"
    "#;
    let cfg: contest_predictor::config::Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.scheduler.tick_interval_secs, 60);
    assert_eq!(cfg.logging.rotation, "daily");
    assert!(cfg.mongodb.connection_string().starts_with("mongodb://"));
}
