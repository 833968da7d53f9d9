//! REST handlers for pipeline runs and operational endpoints.

use adpilot_core::PipelineError;
use adpilot_genai::AudienceAnalyzer;
use adpilot_pipeline::{Orchestrator, RunRequest, StageFailure};
use adpilot_platform::{CampaignProvisioner, InsightsSource};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

/// Maximum string field length (campaign name, product info, etc.).
const MAX_FIELD_LEN: usize = 1024;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub analyzer: AudienceAnalyzer,
    pub provisioner: CampaignProvisioner,
    pub insights: Arc<dyn InsightsSource>,
    pub start_time: Instant,
}

#[derive(Debug, Deserialize, Default)]
pub struct RunBody {
    #[serde(default)]
    pub product_info: Option<String>,
    #[serde(default)]
    pub campaign_name: Option<String>,
    /// Major currency units.
    #[serde(default)]
    pub daily_budget: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AudienceBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_info: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn validate_run_body(body: &RunBody) -> Result<(), &'static str> {
    if let Some(name) = &body.campaign_name {
        if name.trim().is_empty() {
            return Err("'campaign_name' must not be blank");
        }
        if name.len() > MAX_FIELD_LEN {
            return Err("'campaign_name' exceeds maximum length");
        }
    }
    if let Some(info) = &body.product_info {
        if info.len() > MAX_FIELD_LEN {
            return Err("'product_info' exceeds maximum length");
        }
    }
    if let Some(budget) = body.daily_budget {
        if !budget.is_finite() || budget <= 0.0 {
            return Err("'daily_budget' must be a positive amount in major currency units");
        }
    }
    Ok(())
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "invalid_request".to_string(),
            stage: None,
            message: message.to_string(),
        }),
    )
}

fn pipeline_error_status(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::NoContentAvailable => StatusCode::NOT_FOUND,
        PipelineError::ContentFetch(_)
        | PipelineError::Generation(_)
        | PipelineError::Platform { .. }
        | PipelineError::Transport(_) => StatusCode::BAD_GATEWAY,
        PipelineError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn stage_failure_response(failure: StageFailure) -> ApiError {
    let status = pipeline_error_status(&failure.error);
    (
        status,
        Json(ErrorResponse {
            error: "pipeline_failed".to_string(),
            stage: Some(failure.stage_label().to_string()),
            message: failure.error.to_string(),
        }),
    )
}

/// GET / — liveness message.
pub async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "AdPilot API is running" }))
}

/// GET /health — health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// POST /v1/campaigns/auto — run the full orchestration pipeline. The body
/// is optional; defaults come from configuration.
pub async fn run_pipeline(
    State(state): State<AppState>,
    body: Option<Json<RunBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.unwrap_or_default();
    if let Err(msg) = validate_run_body(&body) {
        warn!(error = msg, "Run request validation failed");
        metrics::counter!("api.validation_errors").increment(1);
        return Err(bad_request(msg));
    }

    let request = RunRequest {
        product_info: body.product_info,
        campaign_name: body.campaign_name,
        daily_budget: body.daily_budget,
    };

    match state.orchestrator.run(request).await {
        Ok(result) => Ok((StatusCode::CREATED, Json(result))),
        Err(failure) => {
            error!(stage = failure.stage_label(), error = %failure.error, "Pipeline run failed");
            metrics::counter!("api.pipeline_failures").increment(1);
            Err(stage_failure_response(failure))
        }
    }
}

/// POST /v1/audiences — simpler variant: create one custom audience from a
/// supplied description, or from the analyzer when only product info is
/// given.
pub async fn create_audience(
    State(state): State<AppState>,
    Json(body): Json<AudienceBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() {
        return Err(bad_request("'name' must not be blank"));
    }
    if body.name.len() > MAX_FIELD_LEN {
        return Err(bad_request("'name' exceeds maximum length"));
    }

    let description = match body.description {
        Some(description) if !description.trim().is_empty() => {
            adpilot_core::types::AudienceDescription(description)
        }
        _ => state
            .analyzer
            .analyze(body.product_info.as_deref())
            .await
            .map_err(|e| {
                error!(error = %e, "Audience analysis failed");
                metrics::counter!("api.pipeline_failures").increment(1);
                (
                    pipeline_error_status(&e),
                    Json(ErrorResponse {
                        error: "audience_analysis_failed".to_string(),
                        stage: Some("analyzing_audience".to_string()),
                        message: e.to_string(),
                    }),
                )
            })?,
    };

    let audience = state
        .provisioner
        .provision_audience(&body.name, &description)
        .await
        .map_err(|e| {
            error!(error = %e, "Audience creation failed");
            metrics::counter!("api.platform_errors").increment(1);
            (
                pipeline_error_status(&e),
                Json(ErrorResponse {
                    error: "audience_creation_failed".to_string(),
                    stage: Some("audience".to_string()),
                    message: e.to_string(),
                }),
            )
        })?;

    Ok((StatusCode::CREATED, Json(audience)))
}

/// GET /v1/insights — read-only pass-through of ad-account insights.
pub async fn get_insights(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    insights_response(state.insights.fetch_insights().await)
}

/// The platform reports some failures inside a 200 body; those surface to
/// callers as a client error, transport issues as 502.
fn insights_response(
    result: Result<serde_json::Value, PipelineError>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match result {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            warn!(error = %e, "Insights fetch failed");
            metrics::counter!("api.platform_errors").increment(1);
            let status = match &e {
                PipelineError::Platform { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            Err((
                status,
                Json(ErrorResponse {
                    error: "insights_unavailable".to_string(),
                    stage: None,
                    message: e.to_string(),
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_body_validation() {
        assert!(validate_run_body(&RunBody::default()).is_ok());
        assert!(validate_run_body(&RunBody {
            campaign_name: Some("  ".to_string()),
            ..RunBody::default()
        })
        .is_err());
        assert!(validate_run_body(&RunBody {
            daily_budget: Some(-5.0),
            ..RunBody::default()
        })
        .is_err());
        assert!(validate_run_body(&RunBody {
            daily_budget: Some(f64::NAN),
            ..RunBody::default()
        })
        .is_err());
    }

    #[test]
    fn test_no_content_maps_to_not_found() {
        assert_eq!(
            pipeline_error_status(&PipelineError::NoContentAvailable),
            StatusCode::NOT_FOUND
        );
    }

    // Insights error mapping -------------------------------------------------

    /// Stands in for the marketing API client behind the insights seam.
    struct StubInsights {
        result: Result<serde_json::Value, PipelineError>,
    }

    #[async_trait::async_trait]
    impl InsightsSource for StubInsights {
        async fn fetch_insights(&self) -> Result<serde_json::Value, PipelineError> {
            match &self.result {
                Ok(body) => Ok(body.clone()),
                Err(PipelineError::Platform { stage, message }) => {
                    Err(PipelineError::platform(*stage, message.clone()))
                }
                Err(e) => Err(PipelineError::Transport(e.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_insights_platform_error_maps_to_bad_request() {
        let stub: Arc<dyn InsightsSource> = Arc::new(StubInsights {
            result: Err(PipelineError::platform(
                adpilot_core::ProvisionStage::Insights,
                "Invalid OAuth access token",
            )),
        });

        let (status, Json(body)) = insights_response(stub.fetch_insights().await).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "insights_unavailable");
        assert!(body.message.contains("Invalid OAuth access token"));
    }

    #[tokio::test]
    async fn test_insights_transport_error_maps_to_bad_gateway() {
        let stub: Arc<dyn InsightsSource> = Arc::new(StubInsights {
            result: Err(PipelineError::Transport("connection refused".to_string())),
        });

        let (status, _) = insights_response(stub.fetch_insights().await).unwrap_err();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_insights_success_passes_body_through() {
        let stub: Arc<dyn InsightsSource> = Arc::new(StubInsights {
            result: Ok(serde_json::json!({ "data": [{ "impressions": "120" }] })),
        });

        let Json(body) = insights_response(stub.fetch_insights().await).unwrap();
        assert_eq!(body["data"][0]["impressions"], "120");
    }
}
