//! Audience Analyzer: turns product information (or the preset product
//! domain) into a natural-language audience description.

use crate::client::TextGenerator;
use adpilot_core::types::AudienceDescription;
use adpilot_core::{PipelineError, PipelineResult};
use std::sync::Arc;
use tracing::info;

/// Prompt used when the caller supplies no product information. The preset
/// product domain is cosmetics.
const DEFAULT_AUDIENCE_PROMPT: &str = "You are a media buyer planning a social ad campaign \
for a cosmetics brand. Describe the ideal target audience for its products in one short \
paragraph: demographics, age range, and interests. Reply with the description only.";

fn audience_prompt(product_info: &str) -> String {
    format!(
        "You are a media buyer planning a social ad campaign. Based on this product \
information, describe the ideal target audience in one short paragraph: demographics, \
age range, and interests. Reply with the description only.\n\nProduct information: \
{product_info}"
    )
}

#[derive(Clone)]
pub struct AudienceAnalyzer {
    generator: Arc<dyn TextGenerator>,
}

impl AudienceAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Single generation request; any collaborator failure surfaces as a
    /// typed `Generation` error for the orchestrator to short-circuit on.
    pub async fn analyze(
        &self,
        product_info: Option<&str>,
    ) -> PipelineResult<AudienceDescription> {
        let prompt = match product_info {
            Some(info) if !info.trim().is_empty() => audience_prompt(info),
            _ => DEFAULT_AUDIENCE_PROMPT.to_string(),
        };

        let text = self.generator.generate(&prompt).await?;
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(PipelineError::Generation(
                "audience analysis produced no text".to_string(),
            ));
        }

        info!(chars = text.len(), "Audience description generated");
        Ok(AudienceDescription(text))
    }
}
