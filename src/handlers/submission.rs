//! `saveSubmission` (SPEC_FULL.md §4.6), grounded on
//! `original_source/app/core/rank.py::save_submission`.

use chrono::Utc;

use crate::domain::{DataRegion, Submission};
use crate::error::PipelineError;
use crate::reconstruct::{question, rank};
use crate::store::Store;
use crate::time_util::minute_grid;

/// Persists `submissions`, tombstone-sweeps stale rows, then refreshes the
/// per-question finish-count curves and the real-time-rank series for every
/// scored participant (SPEC_FULL.md §4.5, §4.6).
pub async fn save_submission(
    store: &Store,
    contest_slug: &str,
    region: DataRegion,
    submissions: Vec<Submission>,
    scored_usernames: Vec<String>,
    contest_start: chrono::DateTime<Utc>,
) -> Result<(), PipelineError> {
    let crawl_start = Utc::now();
    for s in &submissions {
        store.submissions().upsert(s).await?;
    }
    store
        .submissions()
        .tombstone_sweep(contest_slug, region, crawl_start)
        .await?;

    let grid = minute_grid(contest_start, 90);

    let question_ids: std::collections::HashSet<u64> =
        submissions.iter().map(|s| s.question_id).collect();
    for question_id in question_ids {
        let counts = question::finish_count_series(&submissions, question_id, &grid);
        store
            .questions()
            .set_real_time_count(contest_slug, question_id, counts)
            .await?;
    }

    let scored_participants: Vec<(String, DataRegion)> =
        scored_usernames.into_iter().map(|u| (u, region)).collect();
    let series = rank::real_time_rank_series(&submissions, &grid, &scored_participants);
    for ((username, region), ranks) in series {
        store
            .archive_records()
            .set_real_time_rank(contest_slug, region, &username, ranks)
            .await?;
    }

    Ok(())
}
