//! Ranking-page parsing (SPEC_FULL.md §4.2), grounded on
//! `original_source/app/crawler/contest_records.py::request_contest_records`.

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq)]
pub struct RankingRow {
    pub username: String,
    pub rank: u32,
    pub score: i32,
    pub finish_time_epoch_secs: i64,
}

/// Page size for ranking pages; `page_max = ceil(user_num / PAGE_SIZE)`
/// (`original_source/app/crawler/contest_records.py`).
pub const PAGE_SIZE: u32 = 25;

pub fn page_count(user_num: u32) -> u32 {
    user_num.div_ceil(PAGE_SIZE)
}

/// Parses one ranking-page JSON body into its rows.
pub fn parse_ranking_page(body: &serde_json::Value) -> Result<Vec<RankingRow>, PipelineError> {
    let rows = body
        .get("total_rank")
        .and_then(|v| v.as_array())
        .ok_or_else(|| PipelineError::Parse("missing total_rank array".into()))?;

    rows.iter()
        .map(|r| {
            let username = r
                .get("username")
                .or_else(|| r.get("user_slug"))
                .and_then(|v| v.as_str())
                .ok_or_else(|| PipelineError::Parse("missing username".into()))?
                .to_string();
            let rank = r
                .get("rank")
                .and_then(|v| v.as_u64())
                .ok_or_else(|| PipelineError::Parse("missing rank".into()))? as u32;
            let score = r
                .get("score")
                .and_then(|v| v.as_i64())
                .ok_or_else(|| PipelineError::Parse("missing score".into()))? as i32;
            let finish_time_epoch_secs = r
                .get("finish_time")
                .and_then(|v| v.as_i64())
                .ok_or_else(|| PipelineError::Parse("missing finish_time".into()))?;
            Ok(RankingRow {
                username,
                rank,
                score,
                finish_time_epoch_secs,
            })
        })
        .collect()
}

/// One accepted (or attempted) question slot from a ranking row's nested
/// submission object.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSubmission {
    pub question_id: u64,
    pub date_epoch_secs: i64,
    pub fail_count: u32,
}

/// Parses the `submissions` array from a ranking-page body: one nested
/// object per ranked row (in the same order as `total_rank`), itself keyed
/// by an arbitrary question-slot index, mirroring
/// `original_source/app/crawler/contest_records.py`'s
/// `res_dict.get("submissions")` / `app/crawler/submission.py::save_submission`.
pub fn parse_submissions_page(body: &serde_json::Value) -> Result<Vec<Vec<RawSubmission>>, PipelineError> {
    let rows = body
        .get("submissions")
        .and_then(|v| v.as_array())
        .ok_or_else(|| PipelineError::Parse("missing submissions array".into()))?;

    rows.iter()
        .map(|row| {
            let entries = row
                .as_object()
                .ok_or_else(|| PipelineError::Parse("submissions row is not an object".into()))?;
            entries
                .values()
                .map(|entry| {
                    let question_id = entry
                        .get("question_id")
                        .and_then(|v| v.as_u64())
                        .ok_or_else(|| PipelineError::Parse("missing question_id".into()))?;
                    let date_epoch_secs = entry
                        .get("date")
                        .and_then(|v| v.as_i64())
                        .ok_or_else(|| PipelineError::Parse("missing date".into()))?;
                    let fail_count = entry
                        .get("fail_count")
                        .and_then(|v| v.as_u64())
                        .unwrap_or(0) as u32;
                    Ok(RawSubmission {
                        question_id,
                        date_epoch_secs,
                        fail_count,
                    })
                })
                .collect::<Result<Vec<_>, PipelineError>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(25), 1);
        assert_eq!(page_count(26), 2);
        assert_eq!(page_count(0), 0);
    }

    #[test]
    fn parses_rows() {
        let body = json!({
            "total_rank": [
                {"username": "alice", "rank": 1, "score": 18, "finish_time": 1_700_000_000i64}
            ]
        });
        let rows = parse_ranking_page(&body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "alice");
        assert_eq!(rows[0].rank, 1);
    }

    #[test]
    fn parses_nested_submissions_aligned_with_ranking_rows() {
        let body = json!({
            "submissions": [
                {"0": {"id": 1, "date": 1_700_000_100i64, "fail_count": 1, "question_id": 2222}},
                {}
            ]
        });
        let rows = parse_submissions_page(&body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0][0].question_id, 2222);
        assert_eq!(rows[0][0].fail_count, 1);
        assert!(rows[1].is_empty());
    }

    #[test]
    fn rejects_missing_submissions_array() {
        let body = json!({"total_rank": []});
        assert!(parse_submissions_page(&body).is_err());
    }
}
