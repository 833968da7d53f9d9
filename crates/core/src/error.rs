use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Which external write (or pass-through read) against the ad platform
/// failed. Carried inside [`PipelineError::Platform`] so callers can tell
/// an orphaned campaign from a run that never wrote anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionStage {
    Campaign,
    AdSet,
    Ad,
    Audience,
    Insights,
}

impl ProvisionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisionStage::Campaign => "campaign",
            ProvisionStage::AdSet => "ad_set",
            ProvisionStage::Ad => "ad",
            ProvisionStage::Audience => "audience",
            ProvisionStage::Insights => "insights",
        }
    }
}

impl fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("no eligible source content available")]
    NoContentAvailable,

    #[error("Content fetch error: {0}")]
    ContentFetch(String),

    #[error("Text generation error: {0}")]
    Generation(String),

    #[error("Ad platform error at {stage} stage: {message}")]
    Platform {
        stage: ProvisionStage,
        message: String,
    },

    /// The collaborator was never reached (or its body was undecodable).
    /// Distinct from [`PipelineError::Platform`], which means the platform
    /// answered and reported a failure.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl PipelineError {
    /// Convenience constructor used by the marketing API client, which tags
    /// every failure with the stage it was performing.
    pub fn platform(stage: ProvisionStage, message: impl Into<String>) -> Self {
        PipelineError::Platform {
            stage,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_names_its_stage() {
        let err = PipelineError::platform(ProvisionStage::AdSet, "budget too low");
        assert_eq!(
            err.to_string(),
            "Ad platform error at ad_set stage: budget too low"
        );
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&ProvisionStage::AdSet).unwrap();
        assert_eq!(json, "\"ad_set\"");
    }
}
