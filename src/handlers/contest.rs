//! `saveRecentAndNextTwoContests` and the contest-info refresh (SPEC_FULL.md
//! §4.6), grounded on `original_source/app/crawler/{contests,contest}.py`.

use chrono::Utc;

use crate::domain::{Contest, DataRegion, Question};
use crate::error::PipelineError;
use crate::store::Store;
use crate::upstream::past_contests::page_data_url;
use crate::upstream::{UpstreamClient, extract_build_id, extract_top_two_contests, parse_contest_info};

/// Refreshes metadata for the two upcoming contests discovered via the
/// Next.js buildId scrape (SPEC_FULL.md §4.2's supplemented homepage-scrape
/// adapter), upserting placeholder `Contest` rows keyed by `titleSlug`.
///
/// Full contest details (start time, duration, question list) are filled in
/// later by `save_predict_contest_records`'s contest-info fetch once the
/// contest is close enough to pre-warm; this handler's job is only to
/// discover *which* slugs are next.
pub async fn save_recent_and_next_two_contests(
    store: &Store,
    client: &UpstreamClient,
) -> Result<Vec<String>, PipelineError> {
    let homepage_url = format!(
        "{}/contest/",
        UpstreamClient::base_url(crate::domain::DataRegion::Us)
    );
    let html = client.get_text(&homepage_url).await?;
    let build_id = extract_build_id(&html)?;
    let page_data = client.get_json(&page_data_url(&build_id)).await?;
    let top_two = extract_top_two_contests(&page_data)?;

    let now = Utc::now();
    for slug in &top_two.title_slugs {
        if store.contests().find_by_slug(slug).await?.is_none() {
            let placeholder = Contest {
                title_slug: slug.clone(),
                title: slug.clone(),
                start_time: now,
                duration: chrono::Duration::minutes(90),
                is_past: false,
                update_time: now,
                predict_time: None,
                cn_user_num: None,
                us_user_num: None,
            };
            store.contests().upsert(&placeholder).await?;
        }
    }
    Ok(top_two.title_slugs)
}

/// Fetches the per-region contest-info endpoint (SPEC_FULL.md §4.2), updating
/// `title`/`{cn,us}_user_num` on the stored `Contest` and upserting its
/// question list. Called as the first step of pre-warming a contest, before
/// the ranking-page fetch.
pub async fn refresh_contest_info(
    store: &Store,
    client: &UpstreamClient,
    contest_slug: &str,
) -> Result<Contest, PipelineError> {
    let mut contest = store
        .contests()
        .find_by_slug(contest_slug)
        .await?
        .ok_or_else(|| PipelineError::Logic(format!("contest {contest_slug} not yet known")))?;

    for region in DataRegion::all() {
        let url = UpstreamClient::contest_info_url(region, contest_slug);
        let body = match client.get_json(&url).await {
            Ok(body) => body,
            Err(PipelineError::Transient(_)) => continue, // not yet published on this region
            Err(e) => return Err(e),
        };
        let info = parse_contest_info(&body)?;

        match region {
            DataRegion::Us => {
                contest.title = info.title;
                contest.us_user_num = Some(info.user_num);
            }
            DataRegion::Cn => {
                contest.cn_user_num = Some(info.user_num);
            }
        }

        let now = Utc::now();
        for (idx, q) in info.questions.iter().enumerate() {
            let question = Question {
                contest_slug: contest_slug.to_string(),
                question_id: q.question_id,
                credit: q.credit,
                title: q.title.clone(),
                qi: (idx + 1) as u8,
                real_time_count: None,
                update_time: now,
            };
            store.questions().upsert(&question).await?;
        }
    }

    contest.update_time = Utc::now();
    store.contests().upsert(&contest).await?;
    Ok(contest)
}
