//! Creative Generator: ad copy conditioned on the selected content and the
//! audience description. Pure function of its inputs plus one generation
//! call.

use crate::client::TextGenerator;
use adpilot_core::types::{AdCreative, AudienceDescription, ContentItem};
use adpilot_core::{PipelineError, PipelineResult};
use std::sync::Arc;
use tracing::info;

fn creative_prompt(content: &ContentItem, audience: &AudienceDescription) -> String {
    format!(
        "Write short, engaging ad copy for a social media ad. Base it on this source \
content and speak directly to the target audience. Reply with the ad text only, no \
quotes, no hashtags explanation.\n\nSource content: {}\n\nTarget audience: {}",
        content.text, audience
    )
}

#[derive(Clone)]
pub struct CreativeGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl CreativeGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// The source content's image travels with the copy so the ad stage can
    /// attach it.
    pub async fn generate(
        &self,
        content: &ContentItem,
        audience: &AudienceDescription,
    ) -> PipelineResult<AdCreative> {
        let prompt = creative_prompt(content, audience);
        let text = self.generator.generate(&prompt).await?;
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(PipelineError::Generation(
                "creative generation produced no text".to_string(),
            ));
        }

        info!(chars = text.len(), "Ad creative generated");
        Ok(AdCreative {
            text,
            image_url: content.image_url.clone(),
        })
    }
}
