//! Campaign Provisioner: the strictly ordered campaign → ad set → ad write
//! sequence. A child object is never attempted before its parent reference
//! exists; the first failed stage terminates the sequence.

use crate::client::AdPlatform;
use crate::targeting::Targeting;
use adpilot_core::config::ProvisioningConfig;
use adpilot_core::types::{AdCreative, AudienceDescription, AudienceRef, ProvisionedGraph};
use adpilot_core::{PipelineError, PipelineResult};
use std::sync::Arc;
use tracing::info;

/// Inputs for one provisioning sequence. `daily_budget` is in major
/// currency units; the provisioner owns the minor-unit conversion.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub campaign_name: String,
    pub objective: String,
    pub daily_budget: f64,
    pub creative: AdCreative,
}

/// Convert a major-currency-unit amount to the platform's minor-unit
/// integer (amount x 100). Callers must pass a finite, positive amount;
/// [`CampaignProvisioner::provision`] enforces that before any write.
pub fn minor_units(major: f64) -> u64 {
    (major * 100.0).round() as u64
}

#[derive(Clone)]
pub struct CampaignProvisioner {
    platform: Arc<dyn AdPlatform>,
    targeting: Targeting,
}

impl CampaignProvisioner {
    pub fn new(platform: Arc<dyn AdPlatform>, config: &ProvisioningConfig) -> Self {
        Self {
            platform,
            targeting: Targeting::from_config(config),
        }
    }

    /// Creation is not transactional on the platform side: a failure after
    /// the campaign write leaves that campaign in place. Callers get the
    /// failing stage in the error; nothing is rolled back.
    pub async fn provision(&self, request: &ProvisionRequest) -> PipelineResult<ProvisionedGraph> {
        if !request.daily_budget.is_finite() || request.daily_budget <= 0.0 {
            return Err(PipelineError::Config(format!(
                "daily budget must be a positive amount in major currency units, got {}",
                request.daily_budget
            )));
        }

        let campaign = self
            .platform
            .create_campaign(&request.campaign_name, &request.objective)
            .await?;

        let ad_set = self
            .platform
            .create_ad_set(
                &campaign,
                &format!("{} - Ad Set", request.campaign_name),
                minor_units(request.daily_budget),
                &self.targeting,
            )
            .await?;

        let ad = self
            .platform
            .create_ad(
                &ad_set,
                &format!("{} - Ad", request.campaign_name),
                &request.creative,
            )
            .await?;

        info!(
            campaign_id = %campaign.id,
            ad_set_id = %ad_set.id,
            ad_id = %ad.id,
            "Provisioned campaign graph"
        );

        Ok(ProvisionedGraph {
            campaign,
            ad_set,
            ad,
        })
    }

    /// Simpler variant: a single custom-audience object from an audience
    /// description, no campaign graph.
    pub async fn provision_audience(
        &self,
        name: &str,
        description: &AudienceDescription,
    ) -> PipelineResult<AudienceRef> {
        self.platform
            .create_audience(name, description.as_str())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adpilot_core::types::{AdRef, AdSetRef, AudienceRef, CampaignRef};
    use adpilot_core::{PipelineError, ProvisionStage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    /// Counts every write and can be told to fail at one stage.
    #[derive(Default)]
    struct CountingPlatform {
        campaigns: AtomicUsize,
        ad_sets: AtomicUsize,
        ads: AtomicUsize,
        audiences: AtomicUsize,
        last_budget_minor: AtomicU64,
        fail_at: Option<ProvisionStage>,
    }

    impl CountingPlatform {
        fn failing_at(stage: ProvisionStage) -> Self {
            Self {
                fail_at: Some(stage),
                ..Self::default()
            }
        }

        fn check(&self, stage: ProvisionStage) -> PipelineResult<()> {
            if self.fail_at == Some(stage) {
                return Err(PipelineError::platform(stage, "simulated outage"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AdPlatform for CountingPlatform {
        async fn create_campaign(
            &self,
            name: &str,
            _objective: &str,
        ) -> PipelineResult<CampaignRef> {
            let n = self.campaigns.fetch_add(1, Ordering::SeqCst) + 1;
            self.check(ProvisionStage::Campaign)?;
            Ok(CampaignRef {
                id: format!("c{n}"),
                name: name.to_string(),
            })
        }

        async fn create_ad_set(
            &self,
            campaign: &CampaignRef,
            _name: &str,
            daily_budget_minor: u64,
            _targeting: &Targeting,
        ) -> PipelineResult<AdSetRef> {
            let n = self.ad_sets.fetch_add(1, Ordering::SeqCst) + 1;
            self.check(ProvisionStage::AdSet)?;
            self.last_budget_minor
                .store(daily_budget_minor, Ordering::SeqCst);
            Ok(AdSetRef {
                id: format!("as{n}"),
                campaign_id: campaign.id.clone(),
            })
        }

        async fn create_ad(
            &self,
            ad_set: &AdSetRef,
            _name: &str,
            _creative: &AdCreative,
        ) -> PipelineResult<AdRef> {
            let n = self.ads.fetch_add(1, Ordering::SeqCst) + 1;
            self.check(ProvisionStage::Ad)?;
            Ok(AdRef {
                id: format!("a{n}"),
                ad_set_id: ad_set.id.clone(),
            })
        }

        async fn create_audience(
            &self,
            name: &str,
            _description: &str,
        ) -> PipelineResult<AudienceRef> {
            let n = self.audiences.fetch_add(1, Ordering::SeqCst) + 1;
            self.check(ProvisionStage::Audience)?;
            Ok(AudienceRef {
                id: format!("aud{n}"),
                name: name.to_string(),
            })
        }
    }

    fn sample_request() -> ProvisionRequest {
        ProvisionRequest {
            campaign_name: "Spring Launch".to_string(),
            objective: "OUTCOME_TRAFFIC".to_string(),
            daily_budget: 300.0,
            creative: AdCreative {
                text: "Try our new blush today!".to_string(),
                image_url: None,
            },
        }
    }

    fn provisioner(platform: CountingPlatform) -> (CampaignProvisioner, Arc<CountingPlatform>) {
        let platform = Arc::new(platform);
        (
            CampaignProvisioner::new(platform.clone(), &ProvisioningConfig::default()),
            platform,
        )
    }

    // 1. Budget conversion ----------------------------------------------------

    #[tokio::test]
    async fn test_major_units_converted_to_minor() {
        let (provisioner, platform) = provisioner(CountingPlatform::default());
        provisioner.provision(&sample_request()).await.unwrap();
        assert_eq!(platform.last_budget_minor.load(Ordering::SeqCst), 30_000);
    }

    #[test]
    fn test_minor_units_rounds() {
        assert_eq!(minor_units(300.0), 30_000);
        assert_eq!(minor_units(12.345), 1_235);
    }

    #[tokio::test]
    async fn test_non_positive_budget_rejected_before_any_write() {
        let (provisioner, platform) = provisioner(CountingPlatform::default());

        for budget in [0.0, -300.0, f64::NAN, f64::INFINITY] {
            let request = ProvisionRequest {
                daily_budget: budget,
                ..sample_request()
            };
            let err = provisioner.provision(&request).await.unwrap_err();
            assert!(matches!(err, PipelineError::Config(_)));
        }

        assert_eq!(platform.campaigns.load(Ordering::SeqCst), 0);
    }

    // 2. Strict stage ordering ------------------------------------------------

    #[tokio::test]
    async fn test_graph_ids_propagate_downward() {
        let (provisioner, _) = provisioner(CountingPlatform::default());
        let graph = provisioner.provision(&sample_request()).await.unwrap();
        assert_eq!(graph.ad_set.campaign_id, graph.campaign.id);
        assert_eq!(graph.ad.ad_set_id, graph.ad_set.id);
    }

    #[tokio::test]
    async fn test_campaign_failure_skips_children() {
        let (provisioner, platform) =
            provisioner(CountingPlatform::failing_at(ProvisionStage::Campaign));
        let err = provisioner.provision(&sample_request()).await.unwrap_err();

        assert!(
            matches!(err, PipelineError::Platform { stage, .. } if stage == ProvisionStage::Campaign)
        );
        assert_eq!(platform.ad_sets.load(Ordering::SeqCst), 0);
        assert_eq!(platform.ads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ad_set_failure_identifies_stage_and_skips_ad() {
        let (provisioner, platform) =
            provisioner(CountingPlatform::failing_at(ProvisionStage::AdSet));
        let err = provisioner.provision(&sample_request()).await.unwrap_err();

        assert!(
            matches!(err, PipelineError::Platform { stage, .. } if stage == ProvisionStage::AdSet)
        );
        // The orphaned campaign write happened exactly once and is not retried.
        assert_eq!(platform.campaigns.load(Ordering::SeqCst), 1);
        assert_eq!(platform.ads.load(Ordering::SeqCst), 0);
    }

    // 3. Audience variant -----------------------------------------------------

    #[tokio::test]
    async fn test_audience_variant_is_a_single_write() {
        let (provisioner, platform) = provisioner(CountingPlatform::default());
        let audience = AudienceDescription("women 18-34 interested in cosmetics".to_string());

        let created = provisioner
            .provision_audience("Cosmetics Fans", &audience)
            .await
            .unwrap();

        assert_eq!(created.id, "aud1");
        assert_eq!(platform.audiences.load(Ordering::SeqCst), 1);
        assert_eq!(platform.campaigns.load(Ordering::SeqCst), 0);
    }
}
