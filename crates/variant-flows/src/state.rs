//! Verification flow state machine

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowState {
    Start,
    VariantEntered,
    SearchSubmitted,
    ModalShown,
    ModalFilled,
    ModalSubmitted,
    ModalSkipped,
    ResultsLoading,
    ResultsLoaded,
    SectionExpanded,
    VerdictObserved,
    Success,
    Failure,
}

impl FlowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FlowState::Success | FlowState::Failure)
    }

    /// Whether `next` is an edge of the verification flow. Any non-terminal state may
    /// fail.
    pub fn can_transition_to(self, next: FlowState) -> bool {
        use FlowState::*;
        if next == Failure {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Start, VariantEntered)
                | (VariantEntered, SearchSubmitted)
                | (SearchSubmitted, ModalShown)
                | (SearchSubmitted, ModalSkipped)
                | (ModalShown, ModalFilled)
                | (ModalFilled, ModalSubmitted)
                | (ModalSubmitted, ResultsLoading)
                | (ModalSkipped, ResultsLoading)
                | (ResultsLoading, ResultsLoaded)
                | (ResultsLoaded, SectionExpanded)
                | (SectionExpanded, VerdictObserved)
                | (VerdictObserved, Success)
        )
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal flow transition {from} -> {to}")]
pub struct TransitionError {
    pub from: FlowState,
    pub to: FlowState,
}

/// Ordered record of the states a run passed through, starting at [`FlowState::Start`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTrace {
    states: Vec<FlowState>,
}

impl Default for FlowTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowTrace {
    pub fn new() -> Self {
        Self {
            states: vec![FlowState::Start],
        }
    }

    pub fn current(&self) -> FlowState {
        self.states.last().copied().unwrap_or(FlowState::Start)
    }

    pub fn advance(&mut self, next: FlowState) -> Result<(), TransitionError> {
        let from = self.current();
        if !from.can_transition_to(next) {
            return Err(TransitionError { from, to: next });
        }
        tracing::debug!(%from, to = %next, "flow transition");
        self.states.push(next);
        Ok(())
    }

    /// Moves to [`FlowState::Failure`] unless the run already ended.
    pub fn fail(&mut self) {
        if !self.current().is_terminal() {
            self.states.push(FlowState::Failure);
        }
    }

    pub fn states(&self) -> &[FlowState] {
        &self.states
    }

    pub fn visited(&self, state: FlowState) -> bool {
        self.states.contains(&state)
    }
}

impl fmt::Display for FlowTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, state) in self.states.iter().enumerate() {
            if index > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{state}")?;
        }
        Ok(())
    }
}
