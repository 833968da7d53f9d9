use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::debug;

/// States of one orchestration run. Strictly sequential and non-resumable;
/// `Failed` is reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    SelectingContent,
    AnalyzingAudience,
    GeneratingCreative,
    Provisioning,
    Done,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::SelectingContent => "selecting_content",
            RunState::AnalyzingAudience => "analyzing_audience",
            RunState::GeneratingCreative => "generating_creative",
            RunState::Provisioning => "provisioning",
            RunState::Done => "done",
            RunState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

/// Describes a single valid transition between run states.
#[derive(Debug, Clone)]
pub struct StateTransition {
    pub from: RunState,
    pub to: RunState,
    pub trigger: &'static str,
}

/// Guards the run lifecycle by enforcing the fixed forward sequence plus a
/// jump to `Failed` from any non-terminal state.
#[derive(Debug, Clone)]
pub struct RunStateMachine {
    state: RunState,
    transitions: Vec<StateTransition>,
}

impl RunStateMachine {
    pub fn new() -> Self {
        let forward = [
            (RunState::Idle, RunState::SelectingContent, "start"),
            (
                RunState::SelectingContent,
                RunState::AnalyzingAudience,
                "content_selected",
            ),
            (
                RunState::AnalyzingAudience,
                RunState::GeneratingCreative,
                "audience_ready",
            ),
            (
                RunState::GeneratingCreative,
                RunState::Provisioning,
                "creative_ready",
            ),
            (RunState::Provisioning, RunState::Done, "graph_provisioned"),
        ];

        let mut transitions: Vec<StateTransition> = forward
            .into_iter()
            .map(|(from, to, trigger)| StateTransition { from, to, trigger })
            .collect();

        for from in [
            RunState::Idle,
            RunState::SelectingContent,
            RunState::AnalyzingAudience,
            RunState::GeneratingCreative,
            RunState::Provisioning,
        ] {
            transitions.push(StateTransition {
                from,
                to: RunState::Failed,
                trigger: "stage_error",
            });
        }

        Self {
            state: RunState::Idle,
            transitions,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn can_transition(&self, from: RunState, to: RunState) -> bool {
        self.trigger(from, to).is_some()
    }

    /// The trigger naming the `from -> to` transition, if it is permitted.
    pub fn trigger(&self, from: RunState, to: RunState) -> Option<&'static str> {
        self.transitions
            .iter()
            .find(|t| t.from == from && t.to == to)
            .map(|t| t.trigger)
    }

    /// Attempts to move the run to `to`. Returns an error if the transition
    /// is not permitted.
    pub fn transition(&mut self, to: RunState) -> Result<()> {
        match self.trigger(self.state, to) {
            Some(trigger) => {
                debug!(
                    trigger,
                    from = self.state.as_str(),
                    to = to.as_str(),
                    "Run state transition"
                );
                self.state = to;
                Ok(())
            }
            None => Err(anyhow!(
                "Invalid state transition from {:?} to {:?}",
                self.state,
                to
            )),
        }
    }
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_sequence_is_legal() {
        let mut machine = RunStateMachine::new();
        for state in [
            RunState::SelectingContent,
            RunState::AnalyzingAudience,
            RunState::GeneratingCreative,
            RunState::Provisioning,
            RunState::Done,
        ] {
            machine.transition(state).unwrap();
        }
        assert!(machine.state().is_terminal());
    }

    #[test]
    fn test_stages_cannot_be_skipped() {
        let mut machine = RunStateMachine::new();
        assert!(machine.transition(RunState::Provisioning).is_err());
        assert_eq!(machine.state(), RunState::Idle);
    }

    #[test]
    fn test_failed_reachable_from_any_non_terminal_state() {
        let machine = RunStateMachine::new();
        for from in [
            RunState::Idle,
            RunState::SelectingContent,
            RunState::AnalyzingAudience,
            RunState::GeneratingCreative,
            RunState::Provisioning,
        ] {
            assert!(machine.can_transition(from, RunState::Failed));
        }
    }

    #[test]
    fn test_transitions_carry_triggers() {
        let machine = RunStateMachine::new();
        assert_eq!(
            machine.trigger(RunState::Idle, RunState::SelectingContent),
            Some("start")
        );
        assert_eq!(
            machine.trigger(RunState::Provisioning, RunState::Done),
            Some("graph_provisioned")
        );
        assert_eq!(
            machine.trigger(RunState::Provisioning, RunState::Failed),
            Some("stage_error")
        );
        assert_eq!(machine.trigger(RunState::Done, RunState::Failed), None);
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        let machine = RunStateMachine::new();
        assert!(!machine.can_transition(RunState::Done, RunState::Failed));
        assert!(!machine.can_transition(RunState::Failed, RunState::SelectingContent));
    }
}
