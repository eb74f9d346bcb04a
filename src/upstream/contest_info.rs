//! Contest summary + question list parsing (SPEC_FULL.md §4.2), grounded on
//! `original_source/app/crawler/contest.py`.

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionInfo {
    pub question_id: u64,
    pub credit: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContestInfo {
    pub title: String,
    pub user_num: u32,
    pub questions: Vec<QuestionInfo>,
}

/// Parses the `contest/api/info/{slug}/` JSON body. For CN responses, the
/// `english_title` field (when present) is substituted for `title`, matching
/// the reference crawler's handling of Chinese contest titles.
pub fn parse_contest_info(body: &serde_json::Value) -> Result<ContestInfo, PipelineError> {
    let contest = body
        .get("contest")
        .ok_or_else(|| PipelineError::Parse("missing contest field".into()))?;

    let title = contest
        .get("english_title")
        .and_then(|v| v.as_str())
        .or_else(|| contest.get("title").and_then(|v| v.as_str()))
        .ok_or_else(|| PipelineError::Parse("missing title".into()))?
        .to_string();

    let user_num = contest
        .get("user_num")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| PipelineError::Parse("missing user_num".into()))? as u32;

    let questions_json = body
        .get("questions")
        .and_then(|v| v.as_array())
        .ok_or_else(|| PipelineError::Parse("missing questions array".into()))?;

    let questions = questions_json
        .iter()
        .map(|q| {
            let question_id = q
                .get("question_id")
                .and_then(|v| v.as_str().and_then(|s| s.parse().ok()).or(v.as_u64()))
                .ok_or_else(|| PipelineError::Parse("missing question_id".into()))?;
            let credit = q
                .get("credit")
                .and_then(|v| v.as_u64())
                .ok_or_else(|| PipelineError::Parse("missing credit".into()))? as u32;
            let title = q
                .get("title")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            Ok(QuestionInfo {
                question_id,
                credit,
                title,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    Ok(ContestInfo {
        title,
        user_num,
        questions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_english_title_for_cn_contests() {
        let body = json!({
            "contest": {"title": "第 400 场周赛", "english_title": "Weekly Contest 400", "user_num": 5000},
            "questions": []
        });
        let info = parse_contest_info(&body).unwrap();
        assert_eq!(info.title, "Weekly Contest 400");
    }

    #[test]
    fn falls_back_to_title_when_no_english_title() {
        let body = json!({
            "contest": {"title": "Weekly Contest 400", "user_num": 5000},
            "questions": [{"question_id": 1234, "credit": 3, "title": "Two Sum"}]
        });
        let info = parse_contest_info(&body).unwrap();
        assert_eq!(info.title, "Weekly Contest 400");
        assert_eq!(info.questions.len(), 1);
        assert_eq!(info.questions[0].question_id, 1234);
    }

    #[test]
    fn rejects_missing_contest_field() {
        let body = json!({"questions": []});
        assert!(parse_contest_info(&body).is_err());
    }
}
