//! Ad campaign orchestration pipeline: content selection, audience
//! analysis, creative generation and platform provisioning in one
//! strictly sequential run.

pub mod orchestrator;
pub mod state;

pub use orchestrator::{Orchestrator, RunRequest, StageFailure};
pub use state::{RunState, RunStateMachine};
