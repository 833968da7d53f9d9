//! Marketing API client. Each trait method performs exactly one write
//! request; a non-2xx status or an `"error"` object inside a 200 body is a
//! `Platform` error tagged with the failing stage.

use crate::targeting::Targeting;
use adpilot_core::config::{HttpConfig, PlatformConfig};
use adpilot_core::types::{AdCreative, AdRef, AdSetRef, AudienceRef, CampaignRef};
use adpilot_core::{PipelineError, PipelineResult, ProvisionStage};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Write (and one read) surface of the advertising platform.
#[async_trait]
pub trait AdPlatform: Send + Sync {
    async fn create_campaign(&self, name: &str, objective: &str) -> PipelineResult<CampaignRef>;

    async fn create_ad_set(
        &self,
        campaign: &CampaignRef,
        name: &str,
        daily_budget_minor: u64,
        targeting: &Targeting,
    ) -> PipelineResult<AdSetRef>;

    async fn create_ad(
        &self,
        ad_set: &AdSetRef,
        name: &str,
        creative: &AdCreative,
    ) -> PipelineResult<AdRef>;

    async fn create_audience(&self, name: &str, description: &str) -> PipelineResult<AudienceRef>;
}

/// Read-only ad-account insights. Separate from [`AdPlatform`] so the
/// pass-through endpoint can be stubbed without a write surface.
#[async_trait]
pub trait InsightsSource: Send + Sync {
    /// A platform-reported failure (an `"error"` object, even in a 200
    /// body) is a `Platform` error; never reaching the platform is a
    /// `Transport` error.
    async fn fetch_insights(&self) -> PipelineResult<serde_json::Value>;
}

#[derive(Deserialize)]
struct CreateResponse {
    id: Option<String>,
    error: Option<GraphErrorBody>,
}

#[derive(Deserialize)]
struct GraphErrorBody {
    message: String,
}

/// Graph-style marketing API client scoped to one ad account.
#[derive(Clone)]
pub struct MarketingApiClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    ad_account_id: String,
    page_id: String,
    access_token: String,
}

impl MarketingApiClient {
    pub fn new(platform: &PlatformConfig, http_cfg: &HttpConfig) -> PipelineResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(http_cfg.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Ok(Self::with_client(http, platform))
    }

    pub fn with_client(http: reqwest::Client, platform: &PlatformConfig) -> Self {
        Self {
            http,
            base_url: platform.base_url.clone(),
            api_version: platform.api_version.clone(),
            ad_account_id: platform.ad_account_id.clone(),
            page_id: platform.page_id.clone(),
            access_token: platform.access_token.clone(),
        }
    }

    fn account_url(&self, edge: &str) -> String {
        format!(
            "{}/{}/act_{}/{}",
            self.base_url, self.api_version, self.ad_account_id, edge
        )
    }

    /// One object-creation POST. Returns the platform-assigned id.
    async fn post_object(
        &self,
        stage: ProvisionStage,
        edge: &str,
        mut body: serde_json::Value,
    ) -> PipelineResult<String> {
        body["access_token"] = json!(self.access_token);
        debug!(stage = %stage, edge, "Creating platform object");

        let response = self
            .http
            .post(self.account_url(edge))
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::platform(stage, e.to_string()))?;

        let status = response.status();
        let parsed: CreateResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::platform(stage, e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(PipelineError::platform(stage, err.message));
        }
        if !status.is_success() {
            return Err(PipelineError::platform(
                stage,
                format!("platform returned HTTP {status}"),
            ));
        }

        parsed.id.ok_or_else(|| {
            PipelineError::platform(stage, "platform response carried no object id")
        })
    }

}

#[async_trait]
impl InsightsSource for MarketingApiClient {
    async fn fetch_insights(&self) -> PipelineResult<serde_json::Value> {
        let stage = ProvisionStage::Insights;
        let response = self
            .http
            .get(self.account_url("insights"))
            .query(&[
                ("fields", "impressions,clicks,cpc,ctr,spend,reach"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::Transport(e.to_string()))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PipelineError::Transport(e.to_string()))?;

        if let Some(message) = body["error"]["message"].as_str() {
            return Err(PipelineError::platform(stage, message.to_string()));
        }
        if !status.is_success() {
            return Err(PipelineError::platform(
                stage,
                format!("platform returned HTTP {status}"),
            ));
        }

        Ok(body)
    }
}

#[async_trait]
impl AdPlatform for MarketingApiClient {
    async fn create_campaign(&self, name: &str, objective: &str) -> PipelineResult<CampaignRef> {
        let id = self
            .post_object(
                ProvisionStage::Campaign,
                "campaigns",
                json!({
                    "name": name,
                    "objective": objective,
                    // Created paused so an automated run never spends on its own.
                    "status": "PAUSED",
                    "special_ad_categories": [],
                }),
            )
            .await?;

        info!(campaign_id = %id, "Campaign created");
        Ok(CampaignRef {
            id,
            name: name.to_string(),
        })
    }

    async fn create_ad_set(
        &self,
        campaign: &CampaignRef,
        name: &str,
        daily_budget_minor: u64,
        targeting: &Targeting,
    ) -> PipelineResult<AdSetRef> {
        let id = self
            .post_object(
                ProvisionStage::AdSet,
                "adsets",
                json!({
                    "name": name,
                    "campaign_id": campaign.id,
                    "daily_budget": daily_budget_minor,
                    "billing_event": "IMPRESSIONS",
                    "optimization_goal": "LINK_CLICKS",
                    "bid_strategy": "LOWEST_COST_WITHOUT_CAP",
                    "targeting": targeting,
                    "status": "PAUSED",
                }),
            )
            .await?;

        info!(ad_set_id = %id, campaign_id = %campaign.id, "Ad set created");
        Ok(AdSetRef {
            id,
            campaign_id: campaign.id.clone(),
        })
    }

    async fn create_ad(
        &self,
        ad_set: &AdSetRef,
        name: &str,
        creative: &AdCreative,
    ) -> PipelineResult<AdRef> {
        // Creative is supplied inline as an object-story spec so the ad
        // stage stays a single write.
        let mut link_data = json!({
            "message": creative.text,
            "link": format!("https://facebook.com/{}", self.page_id),
        });
        if let Some(image_url) = &creative.image_url {
            link_data["picture"] = json!(image_url);
        }

        let id = self
            .post_object(
                ProvisionStage::Ad,
                "ads",
                json!({
                    "name": name,
                    "adset_id": ad_set.id,
                    "creative": {
                        "object_story_spec": {
                            "page_id": self.page_id,
                            "link_data": link_data,
                        }
                    },
                    "status": "PAUSED",
                }),
            )
            .await?;

        info!(ad_id = %id, ad_set_id = %ad_set.id, "Ad created");
        Ok(AdRef {
            id,
            ad_set_id: ad_set.id.clone(),
        })
    }

    async fn create_audience(&self, name: &str, description: &str) -> PipelineResult<AudienceRef> {
        let id = self
            .post_object(
                ProvisionStage::Audience,
                "customaudiences",
                json!({
                    "name": name,
                    "subtype": "CUSTOM",
                    "description": description,
                    "customer_file_source": "USER_PROVIDED_ONLY",
                }),
            )
            .await?;

        info!(audience_id = %id, "Custom audience created");
        Ok(AudienceRef {
            id,
            name: name.to_string(),
        })
    }
}
