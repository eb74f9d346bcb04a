//! Prediction-progress status tag (SPEC_FULL.md §9 REDESIGN FLAGS: closed set
//! `{Ongoing, Passed, Failed}`), same `as_str`/`from_str` idiom as [`super::region::DataRegion`].

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessStatus {
    Ongoing,
    Passed,
    Failed,
}

impl ReadinessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessStatus::Ongoing => "ONGOING",
            ReadinessStatus::Passed => "PASSED",
            ReadinessStatus::Failed => "FAILED",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, PipelineError> {
        match s {
            "ONGOING" => Ok(ReadinessStatus::Ongoing),
            "PASSED" => Ok(ReadinessStatus::Passed),
            "FAILED" => Ok(ReadinessStatus::Failed),
            other => Err(PipelineError::Parse(format!(
                "unknown readiness status: {other}"
            ))),
        }
    }
}
