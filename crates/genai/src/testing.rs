//! Test double for the text-generation seam.

use crate::client::TextGenerator;
use adpilot_core::{PipelineError, PipelineResult};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Records every prompt it receives and replies with a canned string (or a
/// canned failure).
pub struct RecordingGenerator {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> PipelineResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(PipelineError::Generation(message.clone())),
        }
    }
}
