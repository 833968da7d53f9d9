use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a selected content item came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Post,
    Video,
}

/// One eligible piece of page content, selected for a single orchestration
/// run. Immutable once produced by the content selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    pub text: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Free-text audience description produced by the audience analyzer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AudienceDescription(pub String);

impl AudienceDescription {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AudienceDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ad copy plus the optional image carried over from the source content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdCreative {
    pub text: String,
    pub image_url: Option<String>,
}

/// Platform-assigned campaign identifier plus the attributes its child
/// objects need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSetRef {
    pub id: String,
    pub campaign_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdRef {
    pub id: String,
    pub ad_set_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceRef {
    pub id: String,
    pub name: String,
}

/// The three-level object graph created by one provisioning sequence.
/// Children are only ever created after their parent, so holding a graph
/// implies all three writes succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionedGraph {
    pub campaign: CampaignRef,
    pub ad_set: AdSetRef,
    pub ad: AdRef,
}

/// Final output of one successful orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub run_id: Uuid,
    pub content: ContentItem,
    pub audience: AudienceDescription,
    pub creative: AdCreative,
    pub campaign: CampaignRef,
    pub ad_set: AdSetRef,
    pub ad: AdRef,
    pub completed_at: DateTime<Utc>,
}
