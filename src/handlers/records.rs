//! `savePredictContestRecords` / `saveArchiveContestRecords` (SPEC_FULL.md §4.6),
//! grounded on `original_source/app/crawler/contest_records.py`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::submission::save_submission;
use crate::domain::{ContestRecordArchive, ContestRecordPredict, DataRegion, RecordKey, Submission, User};
use crate::error::{PipelineError, RetryPolicy};
use crate::fetch;
use crate::store::Store;
use crate::upstream::{
    UpstreamClient, USER_CONTEST_RANKING_QUERY, page_count, parse_ranking_page, parse_submissions_page,
    parse_user_rating,
};

/// Ranking-page fetch concurrency per region (SPEC_FULL.md §4.7 "Concurrency
/// limits"): US tolerates a wide fan-out, CN is throttled much harder.
fn ranking_page_concurrency(region: DataRegion) -> usize {
    match region {
        DataRegion::Us => 20,
        DataRegion::Cn => 1,
    }
}

/// User-rating GraphQL fetch concurrency per region (SPEC_FULL.md §4.7).
fn user_rating_concurrency(region: DataRegion) -> usize {
    match region {
        DataRegion::Us => 25,
        DataRegion::Cn => 4,
    }
}

/// Live-queries `userContestRanking` for any scored participant missing from
/// the local User store cache, so a never-seen username still resolves to
/// its true prior rating rather than unconditionally falling back to the
/// newcomer default (SPEC_FULL.md §4.2's User rating adapter).
async fn fetch_missing_user_ratings(
    client: &UpstreamClient,
    region: DataRegion,
    usernames: Vec<String>,
) -> HashMap<String, User> {
    if usernames.is_empty() {
        return HashMap::new();
    }
    let fetch_client = client.clone();
    let now = Utc::now();

    let results = fetch::fetch(
        usernames,
        user_rating_concurrency(region),
        &RetryPolicy::default(),
        move |username| {
            let client = fetch_client.clone();
            async move {
                let variables = serde_json::json!({ "username": username });
                client
                    .post_graphql(region, USER_CONTEST_RANKING_QUERY, variables)
                    .await
                    .map_err(|_| ())
            }
        },
    )
    .await;

    results
        .into_iter()
        .filter_map(|(username, data)| {
            let data = data?;
            let rating = parse_user_rating(&data);
            Some((
                username.clone(),
                User {
                    data_region: region,
                    username,
                    rating: rating.rating,
                    attended_contests_count: rating.attended_contests_count,
                    update_time: now,
                },
            ))
        })
        .collect()
}

/// Fetches every ranking page body for `contest_slug` through the Fetch
/// Queue, in page order, failing if any page exhausts its retries.
async fn fetch_ranking_page_bodies(
    client: &UpstreamClient,
    region: DataRegion,
    contest_slug: &str,
    user_num: u32,
) -> Result<Vec<serde_json::Value>, PipelineError> {
    let pages = page_count(user_num).max(1);
    let page_numbers: Vec<u32> = (1..=pages).collect();
    let fetch_client = client.clone();
    let fetch_slug = contest_slug.to_string();

    let results = fetch::fetch(
        page_numbers,
        ranking_page_concurrency(region),
        &RetryPolicy::default(),
        move |page| {
            let client = fetch_client.clone();
            let contest_slug = fetch_slug.clone();
            async move {
                let url = UpstreamClient::ranking_page_url(region, &contest_slug, page);
                client.get_json(&url).await.map_err(|_| ())
            }
        },
    )
    .await;

    let mut bodies = Vec::with_capacity(pages as usize);
    for page in 1..=pages {
        match results.get(&page).and_then(|r| r.as_ref()) {
            Some(body) => bodies.push(body.clone()),
            None => {
                return Err(PipelineError::PermanentUpstream(format!(
                    "ranking page {page} for {contest_slug} exhausted retries"
                )));
            }
        }
    }
    Ok(bodies)
}

async fn fetch_full_ranking(
    client: &UpstreamClient,
    region: DataRegion,
    contest_slug: &str,
    user_num: u32,
) -> Result<Vec<crate::upstream::RankingRow>, PipelineError> {
    let bodies = fetch_ranking_page_bodies(client, region, contest_slug, user_num).await?;
    let mut rows = Vec::new();
    for body in &bodies {
        rows.extend(parse_ranking_page(body)?);
    }
    Ok(rows)
}

/// Like [`fetch_full_ranking`] but also extracts each row's nested
/// `submissions` entry, in the same order, for `saveArchiveContestRecords`'s
/// submission persistence (SPEC_FULL.md §4.6).
async fn fetch_ranking_and_submissions(
    client: &UpstreamClient,
    region: DataRegion,
    contest_slug: &str,
    user_num: u32,
) -> Result<(Vec<crate::upstream::RankingRow>, Vec<Vec<crate::upstream::RawSubmission>>), PipelineError> {
    let bodies = fetch_ranking_page_bodies(client, region, contest_slug, user_num).await?;
    let mut rows = Vec::new();
    let mut submissions = Vec::new();
    for body in &bodies {
        rows.extend(parse_ranking_page(body)?);
        submissions.extend(parse_submissions_page(body)?);
    }
    Ok((rows, submissions))
}

/// Pre-warm stage: fetch the full ranking, delete-then-insert predict rows
/// deduped on `(region, username)`, then fill `old_rating`/`attended_count`
/// from the User store for non-zero-score rows.
pub async fn save_predict_contest_records(
    store: &Store,
    client: &UpstreamClient,
    contest_slug: &str,
    region: DataRegion,
    user_num: u32,
) -> Result<(), PipelineError> {
    let ranking = fetch_full_ranking(client, region, contest_slug, user_num).await?;

    let mut seen = std::collections::HashSet::new();
    let mut rows = Vec::new();
    for row in ranking {
        if !seen.insert(row.username.clone()) {
            continue;
        }
        rows.push(ContestRecordPredict {
            key: RecordKey {
                contest_slug: contest_slug.to_string(),
                data_region: region,
                username: row.username,
            },
            rank: row.rank,
            score: row.score,
            finish_time: chrono::DateTime::from_timestamp(row.finish_time_epoch_secs, 0)
                .unwrap_or_else(Utc::now),
            old_rating: None,
            attended_contests_count: None,
            delta_rating: None,
            new_rating: None,
            predict_time: None,
        });
    }

    store
        .predict_records()
        .replace_all(contest_slug, region, rows.clone())
        .await?;

    let scored_usernames: Vec<(DataRegion, String)> = rows
        .iter()
        .filter(|r| r.is_scored())
        .map(|r| (region, r.key.username.clone()))
        .collect();
    let mut known = store.users().find_many(&scored_usernames).await?;

    let missing: Vec<String> = scored_usernames
        .iter()
        .filter(|k| !known.contains_key(k))
        .map(|(_, username)| username.clone())
        .collect();
    let fetched = fetch_missing_user_ratings(client, region, missing).await;
    for (username, user) in fetched {
        store.users().upsert(&user).await?;
        known.insert((region, username), user);
    }

    for (username, old_rating, attended_contests_count) in resolve_prior_ratings(&rows, &known) {
        store
            .predict_records()
            .fill_prior_rating(contest_slug, region, &username, old_rating, attended_contests_count)
            .await?;
    }

    Ok(())
}

/// Finalization stage: fetch ranking + submissions, upsert archive rows,
/// tombstone-sweep rows older than the crawl start, then persist submissions
/// (which in turn refreshes the per-question finish-count curves and the
/// real-time-rank series, SPEC_FULL.md §4.5/§4.6).
pub async fn save_archive_contest_records(
    store: &Store,
    client: &UpstreamClient,
    contest_slug: &str,
    region: DataRegion,
    user_num: u32,
    contest_start: DateTime<Utc>,
) -> Result<(), PipelineError> {
    let crawl_start = Utc::now();
    let (ranking, submissions_by_row) =
        fetch_ranking_and_submissions(client, region, contest_slug, user_num).await?;

    for row in &ranking {
        let archived = ContestRecordArchive {
            key: RecordKey {
                contest_slug: contest_slug.to_string(),
                data_region: region,
                username: row.username.clone(),
            },
            rank: row.rank,
            score: row.score,
            finish_time: chrono::DateTime::from_timestamp(row.finish_time_epoch_secs, 0)
                .unwrap_or(crawl_start),
            update_time: crawl_start,
            real_time_rank: None,
        };
        store.archive_records().upsert(&archived).await?;
    }

    store
        .archive_records()
        .tombstone_sweep(contest_slug, region, crawl_start)
        .await?;

    let questions = store.questions().find_by_contest(contest_slug).await?;
    let credit_by_question: HashMap<u64, u32> =
        questions.iter().map(|q| (q.question_id, q.credit)).collect();

    let mut submissions = Vec::new();
    for (row, raw_subs) in ranking.iter().zip(submissions_by_row.iter()) {
        for raw in raw_subs {
            submissions.push(Submission {
                contest_slug: contest_slug.to_string(),
                data_region: region,
                username: row.username.clone(),
                question_id: raw.question_id,
                date: chrono::DateTime::from_timestamp(raw.date_epoch_secs, 0).unwrap_or(crawl_start),
                fail_count: raw.fail_count,
                credit: credit_by_question.get(&raw.question_id).copied().unwrap_or(0),
                update_time: crawl_start,
            });
        }
    }

    let scored_usernames: Vec<String> = ranking
        .iter()
        .filter(|r| r.score != 0)
        .map(|r| r.username.clone())
        .collect();

    save_submission(store, contest_slug, region, submissions, scored_usernames, contest_start).await
}

/// Resolves each predict row's prior rating in one batch lookup, falling
/// back to newcomer defaults — factored out of [`save_predict_contest_records`]
/// for unit testing without a live store.
pub fn resolve_prior_ratings(
    rows: &[ContestRecordPredict],
    known_users: &HashMap<(DataRegion, String), User>,
) -> Vec<(String, f64, u32)> {
    rows.iter()
        .filter(|r| r.is_scored())
        .map(|r| {
            let key = (r.key.data_region, r.key.username.clone());
            match known_users.get(&key) {
                Some(u) => (r.key.username.clone(), u.rating, u.attended_contests_count),
                None => (r.key.username.clone(), 1500.0, 0),
            }
        })
        .collect()
}
