use crate::error::{PipelineError, PipelineResult};
use serde::Deserialize;

/// Root application configuration. Loaded once at startup from environment
/// variables with the prefix `ADPILOT__`; never read from ambient state
/// inside component logic.
///
/// `platform` and `genai` carry required secrets with no defaults, so a
/// missing access token or account id fails [`AppConfig::load`] before any
/// pipeline run can start.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    pub platform: PlatformConfig,
    pub genai: GenAiConfig,
    #[serde(default)]
    pub provisioning: ProvisioningConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

/// Advertising platform (Graph-style marketing API) credentials and scope.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Bearer credential for every platform call. Required.
    pub access_token: String,
    /// Advertising account the object graph is created under (without the
    /// `act_` prefix). Required.
    pub ad_account_id: String,
    /// Page whose posts and videos feed the content selector. Required.
    pub page_id: String,
    #[serde(default = "default_graph_base_url")]
    pub base_url: String,
    #[serde(default = "default_graph_api_version")]
    pub api_version: String,
}

/// Text-generation collaborator (chat-completions style API).
#[derive(Debug, Clone, Deserialize)]
pub struct GenAiConfig {
    /// API key for the generation service. Required.
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_genai_base_url")]
    pub base_url: String,
}

/// Fixed targeting and budget defaults for provisioned objects. These are
/// configuration, not negotiated per call.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisioningConfig {
    #[serde(default = "default_countries")]
    pub countries: Vec<String>,
    #[serde(default = "default_age_min")]
    pub age_min: u8,
    #[serde(default = "default_age_max")]
    pub age_max: u8,
    #[serde(default = "default_objective")]
    pub objective: String,
    /// Default daily budget in major currency units.
    #[serde(default = "default_daily_budget")]
    pub daily_budget: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-HTTP-call timeout. Timeouts are per call, not per run.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_graph_api_version() -> String {
    "v18.0".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_genai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_countries() -> Vec<String> {
    vec!["TH".to_string()]
}

fn default_age_min() -> u8 {
    18
}

fn default_age_max() -> u8 {
    65
}

fn default_objective() -> String {
    "OUTCOME_TRAFFIC".to_string()
}

fn default_daily_budget() -> f64 {
    300.0
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            countries: default_countries(),
            age_min: default_age_min(),
            age_max: default_age_max(),
            objective: default_objective(),
            daily_budget: default_daily_budget(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    /// (e.g. `ADPILOT__PLATFORM__ACCESS_TOKEN`). A missing required value is
    /// a [`PipelineError::Config`], surfaced before the server binds.
    pub fn load() -> PipelineResult<Self> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("ADPILOT")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        config
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioning_defaults() {
        let cfg = ProvisioningConfig::default();
        assert_eq!(cfg.countries, vec!["TH".to_string()]);
        assert_eq!(cfg.age_min, 18);
        assert_eq!(cfg.age_max, 65);
        assert_eq!(cfg.objective, "OUTCOME_TRAFFIC");
        assert!((cfg.daily_budget - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_required_values_fail_load() {
        // No ADPILOT__PLATFORM__* variables are set in the test environment,
        // so the required secrets are absent and load must fail fast.
        let err = AppConfig::load().unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
