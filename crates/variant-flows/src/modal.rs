//! Optional sample-information modal shown after a search
//!
//! Every field here is best effort: the modal's inputs are autocomplete widgets whose
//! ids drift between releases, and the search proceeds without them.

use crate::data::SampleInfo;
use crate::locators::{
    AGE_INPUT, ETHNICITY_DROPDOWN, GERMLINE_TAB, GERMLINE_TAB_ACTIVE, MODAL_CONTAINER,
    MODAL_SEARCH_BUTTON, PHENOTYPE_INPUT, SECURITY_PROCEED_BUTTON, SEX_DROPDOWN,
};
use action_primitives::{
    ActionError, ElementAction, Key, Locator, Session, SettleReason, TimeoutProfile,
};
use serde::Serialize;
use tracing::{info, warn};

/// Per-field result of [`SampleInfoModalFlow::fill`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModalFillReport {
    pub germline_tab: bool,
    pub phenotype: bool,
    pub sex: bool,
    pub age: bool,
    pub ethnicity: bool,
}

impl ModalFillReport {
    pub fn all_filled(&self) -> bool {
        self.germline_tab && self.phenotype && self.sex && self.age && self.ethnicity
    }
}

pub struct SampleInfoModalFlow<'a> {
    session: &'a Session,
}

impl<'a> SampleInfoModalFlow<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub async fn appears(&self) -> Result<bool, ActionError> {
        self.session
            .is_visible(&MODAL_CONTAINER, TimeoutProfile::Short)
            .await
    }

    pub async fn select_germline_tab(&self) -> Result<bool, ActionError> {
        if self
            .session
            .is_visible(&GERMLINE_TAB_ACTIVE, TimeoutProfile::Short)
            .await?
        {
            info!(session = %self.session.id(), "germline tab already active");
            return Ok(true);
        }
        self.session
            .click_resilient(&GERMLINE_TAB, TimeoutProfile::Medium)
            .await
    }

    /// Types the phenotype and accepts the first autocomplete suggestion.
    pub async fn fill_phenotype(&self, phenotype: &str) -> Result<bool, ActionError> {
        let session = self.session;
        if !session
            .type_into(&PHENOTYPE_INPUT, phenotype, true, TimeoutProfile::Medium)
            .await?
        {
            return Ok(false);
        }
        session.settle(SettleReason::Suggestions).await;
        if !session
            .press_key(&PHENOTYPE_INPUT, Key::ArrowDown, TimeoutProfile::Short)
            .await?
        {
            return Ok(false);
        }
        session.settle(SettleReason::Suggestions).await;
        session
            .press_enter(&PHENOTYPE_INPUT, TimeoutProfile::Short)
            .await
    }

    pub async fn select_sex(&self, sex: &str) -> Result<bool, ActionError> {
        self.pick_from_autocomplete(&SEX_DROPDOWN, sex).await
    }

    pub async fn enter_age(&self, age: &str) -> Result<bool, ActionError> {
        self.session
            .act_with_fallback(
                &AGE_INPUT,
                ElementAction::Type {
                    text: age,
                    clear_first: true,
                },
            )
            .await
    }

    /// Autocomplete widget first; a native select under the fallback locator otherwise.
    pub async fn select_ethnicity(&self, ethnicity: &str) -> Result<bool, ActionError> {
        if self
            .pick_from_autocomplete(&ETHNICITY_DROPDOWN.primary, ethnicity)
            .await?
        {
            return Ok(true);
        }
        let outcome = self
            .session
            .select_option(&ETHNICITY_DROPDOWN.fallback, ethnicity, TimeoutProfile::Short)
            .await;
        info!(session = %self.session.id(), ?outcome, "ethnicity via fallback control");
        Ok(outcome.is_resolved())
    }

    /// Fills every field, logging the ones that could not be set.
    pub async fn fill(&self, sample: &SampleInfo) -> Result<ModalFillReport, ActionError> {
        let report = ModalFillReport {
            germline_tab: self.select_germline_tab().await?,
            phenotype: self.fill_phenotype(&sample.phenotype).await?,
            sex: self.select_sex(&sample.sex).await?,
            age: self.enter_age(&sample.age).await?,
            ethnicity: self.select_ethnicity(&sample.ethnicity).await?,
        };
        if report.all_filled() {
            info!(session = %self.session.id(), "sample information filled");
        } else {
            warn!(session = %self.session.id(), ?report, "sample information partially filled");
        }
        Ok(report)
    }

    pub async fn submit(&self) -> Result<bool, ActionError> {
        self.session
            .act_with_fallback(&MODAL_SEARCH_BUTTON, ElementAction::Click)
            .await
    }

    pub async fn wait_closed(&self) -> Result<bool, ActionError> {
        self.session
            .wait_until_gone(&MODAL_CONTAINER, TimeoutProfile::Medium)
            .await
    }

    /// Clicks through the interstitial security check when it is shown.
    pub async fn handle_security_validation(&self) -> Result<bool, ActionError> {
        let session = self.session;
        if !session
            .is_present(&SECURITY_PROCEED_BUTTON, TimeoutProfile::Short)
            .await?
        {
            return Ok(false);
        }
        if !session
            .click_resilient(&SECURITY_PROCEED_BUTTON, TimeoutProfile::Short)
            .await?
        {
            return Ok(false);
        }
        info!(session = %session.id(), "security validation passed");
        session
            .wait_for_document_ready(TimeoutProfile::Medium)
            .await?;
        Ok(true)
    }

    async fn pick_from_autocomplete(
        &self,
        locator: &Locator,
        value: &str,
    ) -> Result<bool, ActionError> {
        let session = self.session;
        if !session
            .click_resilient(locator, TimeoutProfile::Medium)
            .await?
        {
            return Ok(false);
        }
        if !session
            .type_into(locator, value, false, TimeoutProfile::Short)
            .await?
        {
            return Ok(false);
        }
        session.settle(SettleReason::Suggestions).await;
        session.press_enter(locator, TimeoutProfile::Short).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session;
    use cdp_adapter::fake::{Effect, FakeElement, Interaction};

    #[tokio::test]
    async fn phenotype_picks_first_suggestion() {
        let (driver, session) = session("https://varsome.com/");
        let input = driver.add(FakeElement::matching(&PHENOTYPE_INPUT));
        let flow = SampleInfoModalFlow::new(&session);

        assert!(flow.fill_phenotype("Cancer").await.unwrap());
        let keys: Vec<_> = driver
            .interactions()
            .into_iter()
            .filter_map(|i| match i {
                Interaction::PressKey(id, key) if id == input => Some(key),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec![Key::ArrowDown, Key::Enter]);
        assert_eq!(driver.value_of(input).as_deref(), Some("Cancer"));
    }

    #[tokio::test]
    async fn active_germline_tab_is_not_clicked() {
        let (driver, session) = session("https://varsome.com/");
        driver.add(
            FakeElement::matching(&GERMLINE_TAB)
                .also_matching(&GERMLINE_TAB_ACTIVE)
                .text("Germline"),
        );
        let flow = SampleInfoModalFlow::new(&session);

        assert!(flow.select_germline_tab().await.unwrap());
        assert!(driver.interactions().is_empty());
    }

    #[tokio::test]
    async fn partial_fill_is_reported_not_raised() {
        let (driver, session) = session("https://varsome.com/");
        driver.add(FakeElement::matching(&GERMLINE_TAB));
        driver.add(FakeElement::matching(&SEX_DROPDOWN));
        driver.add(FakeElement::matching(&AGE_INPUT.fallback));
        let flow = SampleInfoModalFlow::new(&session);

        let report = flow.fill(&SampleInfo::default()).await.unwrap();
        assert_eq!(
            report,
            ModalFillReport {
                germline_tab: true,
                phenotype: false,
                sex: true,
                age: true,
                ethnicity: false,
            }
        );
        assert!(!report.all_filled());
    }

    #[tokio::test]
    async fn ethnicity_uses_native_select_fallback() {
        let (driver, session) = session("https://varsome.com/");
        let select = driver.add(
            FakeElement::matching(&ETHNICITY_DROPDOWN.fallback).select(&["European", "East Asian"]),
        );
        let flow = SampleInfoModalFlow::new(&session);

        assert!(flow.select_ethnicity("East Asian").await.unwrap());
        assert_eq!(driver.value_of(select).as_deref(), Some("East Asian"));
    }

    #[tokio::test]
    async fn submit_then_modal_closes() {
        let (driver, session) = session("https://varsome.com/");
        let modal = driver.add(FakeElement::matching(&MODAL_CONTAINER));
        let button = driver.add(FakeElement::matching(&MODAL_SEARCH_BUTTON.primary));
        driver.on_click(button, Effect::Remove(modal));
        let flow = SampleInfoModalFlow::new(&session);

        assert!(flow.appears().await.unwrap());
        assert!(flow.submit().await.unwrap());
        assert!(flow.wait_closed().await.unwrap());
    }

    #[tokio::test]
    async fn security_check_skipped_when_absent() {
        let (driver, session) = session("https://varsome.com/");
        let flow = SampleInfoModalFlow::new(&session);
        assert!(!flow.handle_security_validation().await.unwrap());
        assert!(driver.interactions().is_empty());
    }
}
