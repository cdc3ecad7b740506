//! End-to-end germline classification scenario

use crate::data::ScenarioData;
use crate::errors::{ScenarioError, Step};
use crate::home::{GenomeCheck, HomeSearchFlow, SearchPath};
use crate::modal::{ModalFillReport, SampleInfoModalFlow};
use crate::results::{ResultsFlow, SectionReport};
use crate::state::{FlowState, FlowTrace, TransitionError};
use crate::verdict::VerdictObservation;
use action_primitives::{ActionError, SelectOutcome, Session};
use serde::Serialize;
use tracing::{info, warn};

/// Everything observed by a passing run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub trace: FlowTrace,
    pub search_path: SearchPath,
    pub genome_selection: SelectOutcome,
    pub genome: GenomeCheck,
    /// Present when the sample-information modal was shown
    pub modal: Option<ModalFillReport>,
    pub sections: SectionReport,
    pub observation: VerdictObservation,
    /// PNG of the verdict card, when it could be captured
    #[serde(skip)]
    pub evidence: Option<Vec<u8>>,
}

/// Failure before the trace is attached.
enum Abort {
    Assertion { step: Step, message: String },
    Action { step: Step, source: ActionError },
    Transition(TransitionError),
}

impl Abort {
    fn action(step: Step) -> impl FnOnce(ActionError) -> Abort {
        move |source| Abort::Action { step, source }
    }

    fn into_error(self, trace: FlowTrace) -> ScenarioError {
        match self {
            Abort::Assertion { step, message } => ScenarioError::Assertion {
                step,
                message,
                trace,
            },
            Abort::Action { step, source } => ScenarioError::Action {
                step,
                source,
                trace,
            },
            Abort::Transition(err) => ScenarioError::Transition(err),
        }
    }
}

impl From<TransitionError> for Abort {
    fn from(err: TransitionError) -> Self {
        Abort::Transition(err)
    }
}

fn ensure(holds: bool, step: Step, message: impl Into<String>) -> Result<(), Abort> {
    if holds {
        info!(%step, "assertion held");
        Ok(())
    } else {
        Err(Abort::Assertion {
            step,
            message: message.into(),
        })
    }
}

/// Searches the variant, fills the optional modal and checks the germline verdict.
///
/// Steps run strictly in sequence on the one session; there is no retry across the
/// flow once a required assertion fails.
#[derive(Debug, Clone, Default)]
pub struct GermlineScenario {
    data: ScenarioData,
}

impl GermlineScenario {
    pub fn new(data: ScenarioData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &ScenarioData {
        &self.data
    }

    pub async fn run(&self, session: &Session) -> Result<ScenarioReport, ScenarioError> {
        let mut trace = FlowTrace::new();
        info!(session = %session.id(), variant = %self.data.variant, "scenario started");
        match self.drive(session, &mut trace).await {
            Ok(report) => {
                info!(session = %session.id(), %trace, "scenario passed");
                Ok(report)
            }
            Err(abort) => {
                trace.fail();
                let err = abort.into_error(trace);
                warn!(session = %session.id(), %err, "scenario failed");
                Err(err)
            }
        }
    }

    async fn drive(
        &self,
        session: &Session,
        trace: &mut FlowTrace,
    ) -> Result<ScenarioReport, Abort> {
        let data = &self.data;
        let home = HomeSearchFlow::new(session);
        let modal = SampleInfoModalFlow::new(session);
        let results = ResultsFlow::new(session);

        // Search
        let loaded = home
            .navigate_to_homepage(&data.base_url)
            .await
            .map_err(Abort::action(Step::HomepageLoaded))?;
        ensure(loaded, Step::HomepageLoaded, "failed to load the homepage")?;

        let entered = home
            .enter_variant(&data.variant)
            .await
            .map_err(Abort::action(Step::VariantEntered))?;
        ensure(entered, Step::VariantEntered, "failed to enter the variant")?;
        trace.advance(FlowState::VariantEntered)?;

        let genome_selection = home
            .select_genome(&data.genome)
            .await
            .map_err(Abort::action(Step::GenomeVerified))?;
        let genome = home
            .verify_genome(&data.genome)
            .await
            .map_err(Abort::action(Step::GenomeVerified))?;
        ensure(
            genome.is_verified(),
            Step::GenomeVerified,
            format!("expected genome {} but found {genome:?}", data.genome),
        )?;

        let search_path = home
            .click_search()
            .await
            .map_err(Abort::action(Step::SearchSubmitted))?;
        let search_path = search_path.ok_or_else(|| Abort::Assertion {
            step: Step::SearchSubmitted,
            message: "failed to submit the search".to_string(),
        })?;
        info!(session = %session.id(), path = %search_path, "search submitted");
        trace.advance(FlowState::SearchSubmitted)?;

        // Optional sample information
        let shown = modal
            .appears()
            .await
            .map_err(Abort::action(Step::ModalSubmitted))?;
        let modal_report = if shown {
            trace.advance(FlowState::ModalShown)?;
            let filled = modal
                .fill(&data.sample)
                .await
                .map_err(Abort::action(Step::ModalSubmitted))?;
            trace.advance(FlowState::ModalFilled)?;

            let submitted = modal
                .submit()
                .await
                .map_err(Abort::action(Step::ModalSubmitted))?;
            ensure(submitted, Step::ModalSubmitted, "failed to submit the modal")?;
            let closed = modal
                .wait_closed()
                .await
                .map_err(Abort::action(Step::ModalClosed))?;
            ensure(closed, Step::ModalClosed, "modal did not close")?;
            trace.advance(FlowState::ModalSubmitted)?;
            Some(filled)
        } else {
            info!(session = %session.id(), "no sample-information modal");
            trace.advance(FlowState::ModalSkipped)?;
            None
        };

        if let Err(err) = modal.handle_security_validation().await {
            warn!(session = %session.id(), %err, "security validation check failed; continuing");
        }
        trace.advance(FlowState::ResultsLoading)?;

        // Results
        let ready = results
            .wait_for_results_page()
            .await
            .map_err(Abort::action(Step::ResultsLoaded))?;
        ensure(ready, Step::ResultsLoaded, "results page did not load")?;
        let on_page = results
            .is_on_results_page(&data.gene_symbol())
            .await
            .map_err(Abort::action(Step::OnResultsPage))?;
        ensure(on_page, Step::OnResultsPage, "not on the results page")?;
        trace.advance(FlowState::ResultsLoaded)?;

        let germline = results
            .is_germline_classification_visible()
            .await
            .map_err(Abort::action(Step::GermlineSectionVisible))?;
        ensure(
            germline,
            Step::GermlineSectionVisible,
            "germline classification section missing",
        )?;
        let sections = results
            .verify_page_sections()
            .await
            .map_err(Abort::action(Step::GermlineSectionVisible))?;

        let expanded = results
            .expand_germline_classification()
            .await
            .map_err(Abort::action(Step::SectionExpanded))?;
        ensure(
            expanded,
            Step::SectionExpanded,
            "could not expand germline classification",
        )?;
        trace.advance(FlowState::SectionExpanded)?;

        // Verdict
        let observation = results
            .verify_classification()
            .await
            .map_err(Abort::action(Step::VerdictTextFound))?;
        trace.advance(FlowState::VerdictObserved)?;

        ensure(
            observation.text.is_some(),
            Step::VerdictTextFound,
            "could not find the verdict text",
        )?;
        ensure(
            observation.is_pathogenic,
            Step::VerdictPathogenic,
            format!(
                "expected '{}' but got '{}'",
                data.expected_verdict,
                observation.text.as_deref().unwrap_or_default()
            ),
        )?;
        ensure(
            observation.raw_background.is_some(),
            Step::VerdictColorFound,
            "could not determine the verdict colour",
        )?;
        ensure(
            observation.is_red,
            Step::VerdictRed,
            format!(
                "expected a red verdict but got '{}'",
                observation.raw_background.as_deref().unwrap_or_default()
            ),
        )?;

        let evidence = match results.capture_verdict_evidence().await {
            Ok(png) => Some(png),
            Err(err) => {
                warn!(session = %session.id(), %err, "verdict evidence not captured");
                None
            }
        };

        ensure(
            observation.success,
            Step::ClassificationSuccess,
            "classification verification failed",
        )?;
        trace.advance(FlowState::Success)?;

        Ok(ScenarioReport {
            trace: trace.clone(),
            search_path,
            genome_selection,
            genome,
            modal: modal_report,
            sections,
            observation,
            evidence,
        })
    }
}
