//! `predictContest` and the CN-readiness gate (SPEC_FULL.md §4.6), grounded
//! on `original_source/app/crawler/contest_records.py::check_cn_data_is_ready`
//! and `app/handler/contest_record.py`.

use std::future::Future;

use chrono::Utc;

use crate::domain::{Contest, User};
use crate::error::PipelineError;
use crate::rating::{RatingInput, elo};
use crate::store::Store;

/// Readiness probe: CN is considered ready once it reports at least as many
/// participants as US and does not flag `fallback_local`.
pub fn is_cn_data_ready(cn_user_num: u32, us_user_num: u32, cn_fallback_local: bool) -> bool {
    cn_user_num >= us_user_num && !cn_fallback_local
}

const READINESS_MAX_POLLS: u32 = 25;
const READINESS_POLL_INTERVAL_SECS: u64 = 60;

/// Polls `probe` up to 25 times at 60s intervals, returning `true` once ready
/// or `false` on timeout (SPEC_FULL.md §4.6: proceed anyway and log
/// incomplete-data on timeout, rather than failing).
pub async fn wait_for_cn_data<F, Fut>(mut probe: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for attempt in 0..READINESS_MAX_POLLS {
        if probe().await {
            return true;
        }
        if attempt + 1 < READINESS_MAX_POLLS {
            tokio::time::sleep(std::time::Duration::from_secs(READINESS_POLL_INTERVAL_SECS)).await;
        }
    }
    tracing::warn!("CN readiness timed out after {READINESS_MAX_POLLS} polls; proceeding with incomplete data");
    false
}

/// Computes and writes back rating deltas for every scored predict row of
/// `contest`, then stamps `predict_time`. Idempotent: a contest that already
/// has `predict_time` set is a no-op (SPEC_FULL.md §3, §8).
///
/// Biweekly contests propagate the new rating into the User store
/// immediately (DESIGN.md Open Question #1), since the following day's
/// weekly pre-warm depends on it.
pub async fn predict_contest(store: &Store, contest: &Contest) -> Result<(), PipelineError> {
    if contest.is_predicted() {
        return Ok(());
    }

    let rows = store.predict_records().find_by_contest(&contest.title_slug).await?;
    let scored: Vec<_> = rows.into_iter().filter(|r| r.is_scored()).collect();
    if scored.is_empty() {
        store
            .contests()
            .mark_predicted(&contest.title_slug, Utc::now())
            .await?;
        return Ok(());
    }

    let input = RatingInput {
        rank: scored.iter().map(|r| r.rank as f64).collect(),
        rating: scored
            .iter()
            .map(|r| r.old_rating.unwrap_or(1500.0))
            .collect(),
        attended_count: scored
            .iter()
            .map(|r| r.attended_contests_count.unwrap_or(0))
            .collect(),
    };
    let deltas = elo::elo_delta(&input);

    let predict_time = Utc::now();
    for (row, delta) in scored.iter().zip(deltas.iter()) {
        let old_rating = row.old_rating.unwrap_or(1500.0);
        let new_rating = old_rating + delta;
        store
            .predict_records()
            .apply_prediction(
                &contest.title_slug,
                row.key.data_region,
                &row.key.username,
                *delta,
                new_rating,
                predict_time,
            )
            .await?;

        if contest.is_biweekly() {
            store
                .users()
                .upsert(&User {
                    data_region: row.key.data_region,
                    username: row.key.username.clone(),
                    rating: new_rating,
                    attended_contests_count: row.attended_contests_count.unwrap_or(0) + 1,
                    update_time: predict_time,
                })
                .await?;
        }
    }

    let marked = store
        .contests()
        .mark_predicted(&contest.title_slug, predict_time)
        .await?;
    if !marked {
        // Another invocation raced us and already stamped predict_time;
        // the predict rows it wrote stay authoritative (frozen-predict
        // invariant, SPEC_FULL.md §3).
        tracing::info!(contest = %contest.title_slug, "predict_time already set by a concurrent run");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_requires_parity_and_no_fallback() {
        assert!(is_cn_data_ready(100, 100, false));
        assert!(is_cn_data_ready(150, 100, false));
        assert!(!is_cn_data_ready(99, 100, false));
        assert!(!is_cn_data_ready(100, 100, true));
    }

    #[tokio::test]
    async fn wait_for_cn_data_returns_true_as_soon_as_ready() {
        let mut calls = 0;
        let ready = wait_for_cn_data(|| {
            calls += 1;
            async move { calls >= 2 }
        })
        .await;
        assert!(ready);
    }
}
