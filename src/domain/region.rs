//! Closed-set data-region tag (SPEC_FULL.md §3, §9 "Tagged variants for sum types").
//!
//! A small tagged enum with an explicit `as_str`/`from_str` pair, the same
//! shape used for every closed-set tag in this crate (see [`super::status::ReadinessStatus`]).

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataRegion {
    Cn,
    Us,
}

impl DataRegion {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataRegion::Cn => "CN",
            DataRegion::Us => "US",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, PipelineError> {
        match s {
            "CN" => Ok(DataRegion::Cn),
            "US" => Ok(DataRegion::Us),
            other => Err(PipelineError::Parse(format!("unknown data region: {other}"))),
        }
    }

    pub fn all() -> [DataRegion; 2] {
        [DataRegion::Cn, DataRegion::Us]
    }
}

impl std::fmt::Display for DataRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for r in DataRegion::all() {
            assert_eq!(DataRegion::from_str(r.as_str()).unwrap(), r);
        }
    }

    #[test]
    fn rejects_unknown_region() {
        assert!(DataRegion::from_str("EU").is_err());
    }
}
