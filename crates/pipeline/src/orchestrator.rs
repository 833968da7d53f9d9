//! Orchestrator: wires selection, audience analysis, creative generation
//! and provisioning into one non-resumable sequential run.

use crate::state::{RunState, RunStateMachine};
use adpilot_core::config::ProvisioningConfig;
use adpilot_core::types::OrchestrationResult;
use adpilot_core::PipelineError;
use adpilot_content::ContentSelector;
use adpilot_genai::{AudienceAnalyzer, CreativeGenerator};
use adpilot_platform::{CampaignProvisioner, ProvisionRequest};
use chrono::Utc;
use std::fmt;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Caller-supplied inputs for one run. Everything is optional; defaults
/// come from configuration.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub product_info: Option<String>,
    pub campaign_name: Option<String>,
    /// Major currency units; conversion happens inside the provisioner.
    pub daily_budget: Option<f64>,
}

/// The first failure a run encountered, tagged with the state it happened
/// in. Later stages were never attempted.
#[derive(Debug)]
pub struct StageFailure {
    pub stage: RunState,
    pub error: PipelineError,
}

impl StageFailure {
    /// Label for the failing stage. Platform errors refine the coarse run
    /// state down to the exact write that failed (campaign / ad_set / ad).
    pub fn stage_label(&self) -> &'static str {
        match &self.error {
            PipelineError::Platform { stage, .. } => stage.as_str(),
            _ => self.stage.as_str(),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run failed at {}: {}", self.stage_label(), self.error)
    }
}

impl std::error::Error for StageFailure {}

pub struct Orchestrator {
    selector: ContentSelector,
    analyzer: AudienceAnalyzer,
    creative: CreativeGenerator,
    provisioner: CampaignProvisioner,
    defaults: ProvisioningConfig,
}

impl Orchestrator {
    pub fn new(
        selector: ContentSelector,
        analyzer: AudienceAnalyzer,
        creative: CreativeGenerator,
        provisioner: CampaignProvisioner,
        defaults: ProvisioningConfig,
    ) -> Self {
        Self {
            selector,
            analyzer,
            creative,
            provisioner,
            defaults,
        }
    }

    /// Execute one end-to-end run. Exactly one external write sequence is
    /// attempted; the run is not idempotent — calling this twice creates
    /// two independent campaigns. Partial platform state (e.g. a campaign
    /// whose ad set failed) is left in place and reported via the error.
    pub async fn run(&self, request: RunRequest) -> Result<OrchestrationResult, StageFailure> {
        let run_id = Uuid::new_v4();
        let mut machine = RunStateMachine::new();
        info!(%run_id, "Orchestration run starting");

        advance(run_id, &mut machine, RunState::SelectingContent);
        let content = match self.selector.select().await {
            Ok(content) => content,
            Err(e) => return Err(fail(run_id, &mut machine, e)),
        };

        advance(run_id, &mut machine, RunState::AnalyzingAudience);
        let audience = match self.analyzer.analyze(request.product_info.as_deref()).await {
            Ok(audience) => audience,
            Err(e) => return Err(fail(run_id, &mut machine, e)),
        };

        advance(run_id, &mut machine, RunState::GeneratingCreative);
        let creative = match self.creative.generate(&content, &audience).await {
            Ok(creative) => creative,
            Err(e) => return Err(fail(run_id, &mut machine, e)),
        };

        advance(run_id, &mut machine, RunState::Provisioning);
        let campaign_name = request.campaign_name.unwrap_or_else(|| {
            format!("AdPilot {}", Utc::now().format("%Y-%m-%d %H:%M"))
        });
        let provision_request = ProvisionRequest {
            campaign_name,
            objective: self.defaults.objective.clone(),
            daily_budget: request.daily_budget.unwrap_or(self.defaults.daily_budget),
            creative: creative.clone(),
        };
        let graph = match self.provisioner.provision(&provision_request).await {
            Ok(graph) => graph,
            Err(e) => return Err(fail(run_id, &mut machine, e)),
        };

        advance(run_id, &mut machine, RunState::Done);
        info!(%run_id, campaign_id = %graph.campaign.id, "Orchestration run complete");

        Ok(OrchestrationResult {
            run_id,
            content,
            audience,
            creative,
            campaign: graph.campaign,
            ad_set: graph.ad_set,
            ad: graph.ad,
            completed_at: Utc::now(),
        })
    }
}

fn advance(run_id: Uuid, machine: &mut RunStateMachine, to: RunState) {
    // The fixed sequence above only requests legal transitions; a rejection
    // here is a bug, logged rather than propagated.
    if let Err(e) = machine.transition(to) {
        warn!(%run_id, error = %e, "Rejected state transition");
    } else {
        info!(%run_id, state = to.as_str(), "Pipeline state");
    }
}

fn fail(run_id: Uuid, machine: &mut RunStateMachine, err: PipelineError) -> StageFailure {
    let stage = machine.state();
    error!(%run_id, stage = stage.as_str(), error = %err, "Orchestration run failed");
    advance(run_id, machine, RunState::Failed);
    StageFailure { stage, error: err }
}
