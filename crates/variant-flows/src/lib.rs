//! Page flows for verifying a germline variant classification
//!
//! Three flows cover the site: [`HomeSearchFlow`] (search entry), [`SampleInfoModalFlow`]
//! (the optional post-search form) and [`ResultsFlow`] (results, sections and verdict).
//! [`GermlineScenario`] drives them in order against one [`Session`](action_primitives::Session)
//! and records the path through the [`FlowState`] machine.

pub mod data;
pub mod errors;
pub mod home;
pub mod locators;
pub mod modal;
pub mod results;
pub mod scenario;
pub mod state;
pub mod verdict;

pub use data::{SampleInfo, ScenarioData};
pub use errors::{ScenarioError, Step};
pub use home::{GenomeCheck, HomeSearchFlow, SearchPath};
pub use modal::{ModalFillReport, SampleInfoModalFlow};
pub use results::{ResultsFlow, SectionReport, SectionStatus};
pub use scenario::{GermlineScenario, ScenarioReport};
pub use state::{FlowState, FlowTrace, TransitionError};
pub use verdict::{is_pathogenic_text, is_red, parse_css_rgb, Rgb, VerdictObservation};

#[cfg(test)]
pub(crate) mod testing {
    use action_primitives::{Session, Timeouts};
    use cdp_adapter::fake::FakeDriver;
    use std::sync::Arc;
    use std::time::Duration;

    pub(crate) fn session(url: &str) -> (Arc<FakeDriver>, Session) {
        let driver = Arc::new(FakeDriver::new(url));
        let session = Session::new(
            driver.clone(),
            Timeouts::uniform(Duration::from_millis(60), Duration::from_millis(5)),
        );
        (driver, session)
    }
}
