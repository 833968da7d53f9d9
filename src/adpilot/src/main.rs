//! AdPilot — AI-assisted ad campaign manager.
//!
//! Main entry point: loads configuration, wires the pipeline components and
//! starts the HTTP server.

use adpilot_api::{ApiServer, AppState};
use adpilot_content::{ContentSelector, GraphContentSource};
use adpilot_core::AppConfig;
use adpilot_genai::{AudienceAnalyzer, ChatCompletionsClient, CreativeGenerator};
use adpilot_pipeline::Orchestrator;
use adpilot_platform::{CampaignProvisioner, MarketingApiClient};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "adpilot")]
#[command(about = "AI-assisted ad campaign manager")]
#[command(version)]
struct Cli {
    /// Bind host (overrides config)
    #[arg(long, env = "ADPILOT__API__HOST")]
    host: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "ADPILOT__API__HTTP_PORT")]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adpilot=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("AdPilot starting up");

    // Required credentials (platform token, ad account, page, generation
    // API key) have no defaults: a missing value stops startup here,
    // before any run can execute.
    let mut config = AppConfig::load().context("configuration is incomplete")?;

    // Apply CLI overrides
    if let Some(host) = cli.host {
        config.api.host = host;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }

    info!(
        host = %config.api.host,
        http_port = config.api.http_port,
        ad_account = %config.platform.ad_account_id,
        page = %config.platform.page_id,
        model = %config.genai.model,
        "Configuration loaded"
    );

    // One connection pool, shared by every collaborator client; the
    // timeout applies per call, not per run.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let content_source = Arc::new(GraphContentSource::with_client(
        http.clone(),
        &config.platform,
    ));
    let generator = Arc::new(ChatCompletionsClient::with_client(
        http.clone(),
        &config.genai,
    ));
    let marketing = Arc::new(MarketingApiClient::with_client(http, &config.platform));

    let analyzer = AudienceAnalyzer::new(generator.clone());
    let provisioner = CampaignProvisioner::new(marketing.clone(), &config.provisioning);
    let orchestrator = Orchestrator::new(
        ContentSelector::new(content_source),
        analyzer.clone(),
        CreativeGenerator::new(generator),
        provisioner.clone(),
        config.provisioning.clone(),
    );

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        analyzer,
        provisioner,
        insights: marketing,
        start_time: Instant::now(),
    };

    ApiServer::new(config.api.clone(), state).start_http().await
}
