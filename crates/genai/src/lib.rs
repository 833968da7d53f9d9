//! Generative-text integration: the chat-completions client plus the two
//! components that use it, the Audience Analyzer and the Creative Generator.

pub mod audience;
pub mod client;
pub mod creative;

#[cfg(test)]
pub(crate) mod testing;

pub use audience::AudienceAnalyzer;
pub use client::{ChatCompletionsClient, TextGenerator};
pub use creative::CreativeGenerator;
