//! Homepage search flow

use crate::locators::{
    COOKIE_ACCEPT_BUTTON, GENOME_DROPDOWN, GENOME_HG38_OPTION, SEARCH_BUTTON, SEARCH_INPUT,
    VERSION_POPUP_CLOSE,
};
use action_primitives::{
    ActionError, ElementAction, SelectOutcome, Session, SettleReason, TimeoutProfile,
};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// How the genome reference was confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GenomeCheck {
    /// The dropdown's value names the genome
    DropdownValue(String),
    /// The genome's option is displayed
    OptionVisible,
    /// No control exposes the genome; the site default is taken
    AssumedDefault,
    /// A dropdown reports a different genome and no matching option is shown
    Mismatch(String),
}

impl GenomeCheck {
    pub fn is_verified(&self) -> bool {
        !matches!(self, GenomeCheck::Mismatch(_))
    }
}

/// Which escalation step submitted the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchPath {
    PrimaryButton,
    FallbackButton,
    ScriptClick,
    EnterKey,
}

impl fmt::Display for SearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SearchPath::PrimaryButton => "primary_button",
            SearchPath::FallbackButton => "fallback_button",
            SearchPath::ScriptClick => "script_click",
            SearchPath::EnterKey => "enter_key",
        };
        f.write_str(label)
    }
}

pub struct HomeSearchFlow<'a> {
    session: &'a Session,
}

impl<'a> HomeSearchFlow<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Loads the homepage, clears the usual popups and reports whether search is usable.
    pub async fn navigate_to_homepage(&self, base_url: &str) -> Result<bool, ActionError> {
        info!(session = %self.session.id(), %base_url, "opening homepage");
        self.session.navigate(base_url, TimeoutProfile::Long).await?;
        if !self
            .session
            .wait_for_document_ready(TimeoutProfile::Long)
            .await?
        {
            warn!(session = %self.session.id(), "homepage still loading; continuing");
        }
        self.handle_cookie_consent().await?;
        self.close_version_popup().await?;
        self.is_homepage_loaded().await
    }

    pub async fn handle_cookie_consent(&self) -> Result<bool, ActionError> {
        self.session.settle(SettleReason::PopupAppearance).await;
        let accepted = self
            .session
            .dismiss_if_present(&COOKIE_ACCEPT_BUTTON, TimeoutProfile::Short)
            .await?;
        if accepted {
            info!(session = %self.session.id(), "cookie consent accepted");
        }
        Ok(accepted)
    }

    pub async fn close_version_popup(&self) -> Result<bool, ActionError> {
        self.session.dismiss_in_frames(&VERSION_POPUP_CLOSE).await
    }

    pub async fn is_homepage_loaded(&self) -> Result<bool, ActionError> {
        if self
            .session
            .is_visible(&SEARCH_INPUT.primary, TimeoutProfile::Medium)
            .await?
        {
            return Ok(true);
        }
        self.session
            .is_visible(&SEARCH_INPUT.fallback, TimeoutProfile::Medium)
            .await
    }

    pub async fn enter_variant(&self, variant: &str) -> Result<bool, ActionError> {
        info!(session = %self.session.id(), %variant, "entering variant");
        self.session
            .act_with_fallback(
                &SEARCH_INPUT,
                ElementAction::Type {
                    text: variant,
                    clear_first: true,
                },
            )
            .await
    }

    /// Selects `genome` in whichever dropdown exists.
    pub async fn select_genome(&self, genome: &str) -> Result<SelectOutcome, ActionError> {
        for dropdown in [&GENOME_DROPDOWN.primary, &GENOME_DROPDOWN.fallback] {
            if self
                .session
                .is_present(dropdown, TimeoutProfile::Short)
                .await?
            {
                let outcome = self
                    .session
                    .select_option(dropdown, genome, TimeoutProfile::Short)
                    .await;
                info!(session = %self.session.id(), %genome, ?outcome, "genome selection");
                return Ok(outcome);
            }
        }
        info!(session = %self.session.id(), %genome, "no genome dropdown; assuming site default");
        Ok(SelectOutcome::Failed {
            reason: "genome dropdown not found".to_string(),
        })
    }

    pub async fn verify_genome(&self, genome: &str) -> Result<GenomeCheck, ActionError> {
        let wanted = genome.to_lowercase();
        let mut reported = None;
        if self
            .session
            .is_present(&GENOME_DROPDOWN.primary, TimeoutProfile::Short)
            .await?
        {
            if let Some(value) = self
                .session
                .read_attribute(&GENOME_DROPDOWN.primary, "value", TimeoutProfile::Short)
                .await?
            {
                if value.to_lowercase().contains(&wanted) {
                    return Ok(GenomeCheck::DropdownValue(value));
                }
                if !value.trim().is_empty() {
                    reported = Some(value);
                }
            }
        }

        if self
            .session
            .is_visible(&GENOME_HG38_OPTION, TimeoutProfile::Short)
            .await?
        {
            return Ok(GenomeCheck::OptionVisible);
        }

        match reported {
            Some(value) => {
                warn!(session = %self.session.id(), %genome, selected = %value, "genome mismatch");
                Ok(GenomeCheck::Mismatch(value))
            }
            None => {
                info!(session = %self.session.id(), %genome, "genome not exposed; assuming site default");
                Ok(GenomeCheck::AssumedDefault)
            }
        }
    }

    /// Escalates primary button, cookie re-dismissal plus fallback button, script click,
    /// then Enter in the search input. `None` when every path failed.
    pub async fn click_search(&self) -> Result<Option<SearchPath>, ActionError> {
        let session = self.session;
        if session
            .click_resilient(&SEARCH_BUTTON.primary, TimeoutProfile::Medium)
            .await?
        {
            return Ok(Some(SearchPath::PrimaryButton));
        }

        // A late cookie banner is the usual blocker.
        self.handle_cookie_consent().await?;
        if session
            .click_resilient(&SEARCH_BUTTON.fallback, TimeoutProfile::Medium)
            .await?
        {
            return Ok(Some(SearchPath::FallbackButton));
        }

        if session
            .script_click(&SEARCH_BUTTON.primary, TimeoutProfile::Short)
            .await?
        {
            return Ok(Some(SearchPath::ScriptClick));
        }

        for input in [&SEARCH_INPUT.primary, &SEARCH_INPUT.fallback] {
            if session.press_enter(input, TimeoutProfile::Short).await? {
                info!(session = %session.id(), "search submitted with Enter");
                return Ok(Some(SearchPath::EnterKey));
            }
        }
        warn!(session = %session.id(), "no way to submit the search");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session;
    use cdp_adapter::fake::{Effect, FakeElement, Interaction};
    use cdp_adapter::Key;

    #[tokio::test]
    async fn variant_typed_into_fallback_input() {
        let (driver, session) = session("https://varsome.com/");
        let input = driver.add(FakeElement::matching(&SEARCH_INPUT.fallback));
        let flow = HomeSearchFlow::new(&session);

        assert!(flow.enter_variant("BRAF:V600E").await.unwrap());
        assert_eq!(driver.value_of(input).as_deref(), Some("BRAF:V600E"));
    }

    #[tokio::test]
    async fn homepage_loads_with_cookie_banner() {
        let (driver, session) = session("about:blank");
        let banner = driver.add(FakeElement::matching(&COOKIE_ACCEPT_BUTTON));
        driver.on_click(banner, Effect::Hide(banner));
        driver.add(FakeElement::matching(&SEARCH_INPUT.primary));
        let flow = HomeSearchFlow::new(&session);

        assert!(flow.navigate_to_homepage("https://varsome.com").await.unwrap());
        assert!(!driver.is_displayed(banner));
        assert_eq!(driver.url(), "https://varsome.com");
    }

    #[tokio::test]
    async fn search_escalates_to_script_click_on_disabled_button() {
        let (driver, session) = session("https://varsome.com/");
        let button = driver.add(FakeElement::matching(&SEARCH_BUTTON.primary).disabled());
        let flow = HomeSearchFlow::new(&session);

        assert_eq!(
            flow.click_search().await.unwrap(),
            Some(SearchPath::ScriptClick)
        );
        assert_eq!(
            driver.count(|i| matches!(i, Interaction::ScriptClick(id) if *id == button)),
            1
        );
    }

    #[tokio::test]
    async fn search_falls_back_to_enter_without_buttons() {
        let (driver, session) = session("https://varsome.com/");
        let input = driver.add(FakeElement::matching(&SEARCH_INPUT.primary));
        let flow = HomeSearchFlow::new(&session);

        assert_eq!(flow.click_search().await.unwrap(), Some(SearchPath::EnterKey));
        assert_eq!(
            driver.interactions().last(),
            Some(&Interaction::PressKey(input, Key::Enter))
        );
    }

    #[tokio::test]
    async fn genome_verified_from_dropdown_value() {
        let (driver, session) = session("https://varsome.com/");
        driver.add(
            FakeElement::matching(&GENOME_DROPDOWN.primary)
                .select(&["hg19", "hg38"])
                .value("hg19"),
        );
        let flow = HomeSearchFlow::new(&session);

        assert_eq!(
            flow.select_genome("hg38").await.unwrap(),
            SelectOutcome::SelectedNatively
        );
        assert_eq!(
            flow.verify_genome("hg38").await.unwrap(),
            GenomeCheck::DropdownValue("hg38".into())
        );
    }

    #[tokio::test]
    async fn genome_defaults_when_not_exposed() {
        let (_, session) = session("https://varsome.com/");
        let flow = HomeSearchFlow::new(&session);

        assert!(!flow.select_genome("hg38").await.unwrap().is_resolved());
        let check = flow.verify_genome("hg38").await.unwrap();
        assert_eq!(check, GenomeCheck::AssumedDefault);
        assert!(check.is_verified());
    }

    #[tokio::test]
    async fn other_genome_in_dropdown_is_a_mismatch() {
        let (driver, session) = session("https://varsome.com/");
        driver.add(FakeElement::matching(&GENOME_DROPDOWN.primary).value("hg19"));
        let flow = HomeSearchFlow::new(&session);

        assert!(!flow.verify_genome("hg38").await.unwrap().is_verified());
    }
}
