//! Next.js buildId scraping for upcoming contests (SPEC_FULL.md §4.2,
//! supplemented from `original_source/app/crawler/contests.py`): the US
//! platform has no dedicated "upcoming contests" endpoint, so the adapter
//! scrapes the contest homepage for its Next.js `buildId`, then requests the
//! hydrated page-data JSON and extracts `topTwoContests` from it.

use regex_lite::Regex;

use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq)]
pub struct TopTwoContests {
    pub title_slugs: Vec<String>,
}

/// Extracts the Next.js `buildId` from the homepage HTML, e.g.
/// `"buildId":"abcdef123456"`.
pub fn extract_build_id(html: &str) -> Result<String, PipelineError> {
    let re = Regex::new(r#""buildId":"([^"]+)""#).expect("valid regex");
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| PipelineError::Parse("buildId not found in homepage HTML".into()))
}

pub fn page_data_url(build_id: &str) -> String {
    format!("https://leetcode.com/_next/data/{build_id}/contest.json")
}

/// Extracts `topTwoContests` title slugs from the hydrated page-data JSON.
pub fn extract_top_two_contests(
    body: &serde_json::Value,
) -> Result<TopTwoContests, PipelineError> {
    let contests = body
        .pointer("/pageProps/dehydratedState/queries/0/state/data/topTwoContests")
        .and_then(|v| v.as_array())
        .ok_or_else(|| PipelineError::Parse("topTwoContests not found".into()))?;

    let title_slugs = contests
        .iter()
        .map(|c| {
            c.get("titleSlug")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .ok_or_else(|| PipelineError::Parse("missing titleSlug".into()))
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    Ok(TopTwoContests { title_slugs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_build_id() {
        let html = r#"<script>{"buildId":"abc123xyz","other":1}</script>"#;
        assert_eq!(extract_build_id(html).unwrap(), "abc123xyz");
    }

    #[test]
    fn missing_build_id_errors() {
        assert!(extract_build_id("<html></html>").is_err());
    }

    #[test]
    fn extracts_top_two_contests() {
        let body = json!({
            "pageProps": {
                "dehydratedState": {
                    "queries": [
                        {"state": {"data": {"topTwoContests": [
                            {"titleSlug": "weekly-contest-401"},
                            {"titleSlug": "biweekly-contest-131"}
                        ]}}}
                    ]
                }
            }
        });
        let top_two = extract_top_two_contests(&body).unwrap();
        assert_eq!(
            top_two.title_slugs,
            vec!["weekly-contest-401", "biweekly-contest-131"]
        );
    }
}
