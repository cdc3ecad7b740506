//! Scenario error types

use crate::state::{FlowTrace, TransitionError};
use action_primitives::ActionError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Postconditions that abort the scenario when they do not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    HomepageLoaded,
    VariantEntered,
    GenomeVerified,
    SearchSubmitted,
    ModalSubmitted,
    ModalClosed,
    ResultsLoaded,
    OnResultsPage,
    GermlineSectionVisible,
    SectionExpanded,
    VerdictTextFound,
    VerdictPathogenic,
    VerdictColorFound,
    VerdictRed,
    ClassificationSuccess,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::HomepageLoaded => "homepage_loaded",
            Step::VariantEntered => "variant_entered",
            Step::GenomeVerified => "genome_verified",
            Step::SearchSubmitted => "search_submitted",
            Step::ModalSubmitted => "modal_submitted",
            Step::ModalClosed => "modal_closed",
            Step::ResultsLoaded => "results_loaded",
            Step::OnResultsPage => "on_results_page",
            Step::GermlineSectionVisible => "germline_section_visible",
            Step::SectionExpanded => "section_expanded",
            Step::VerdictTextFound => "verdict_text_found",
            Step::VerdictPathogenic => "verdict_pathogenic",
            Step::VerdictColorFound => "verdict_color_found",
            Step::VerdictRed => "verdict_red",
            Step::ClassificationSuccess => "classification_success",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A required postcondition did not hold
    #[error("assertion failed at {step}: {message}")]
    Assertion {
        step: Step,
        message: String,
        trace: FlowTrace,
    },

    /// The browser failed underneath a step
    #[error("browser failure during {step}: {source}")]
    Action {
        step: Step,
        #[source]
        source: ActionError,
        trace: FlowTrace,
    },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl ScenarioError {
    pub fn step(&self) -> Option<Step> {
        match self {
            ScenarioError::Assertion { step, .. } | ScenarioError::Action { step, .. } => {
                Some(*step)
            }
            ScenarioError::Transition(_) => None,
        }
    }

    pub fn trace(&self) -> Option<&FlowTrace> {
        match self {
            ScenarioError::Assertion { trace, .. } | ScenarioError::Action { trace, .. } => {
                Some(trace)
            }
            ScenarioError::Transition(_) => None,
        }
    }
}
