//! Select primitive - native dropdown selection with a typed fallback

use crate::{
    primitives::Session,
    types::{SelectOutcome, TimeoutProfile},
};
use cdp_adapter::Locator;
use tracing::{debug, info, warn};

impl Session {
    /// Selects the option labelled `visible_text`.
    ///
    /// Non-native controls receive the label as typed text instead, reported as
    /// [`SelectOutcome::FellBackToTyping`] since nothing confirms a real selection.
    /// Never returns an error; failures are folded into [`SelectOutcome::Failed`].
    pub async fn select_option(
        &self,
        locator: &Locator,
        visible_text: &str,
        profile: TimeoutProfile,
    ) -> SelectOutcome {
        let element = match self.present(locator, profile).await {
            Ok(Some(element)) => element,
            Ok(None) => {
                return SelectOutcome::Failed {
                    reason: format!("{locator} not found"),
                }
            }
            Err(err) => {
                warn!(session = %self.id(), %locator, %err, "select target lookup failed");
                return SelectOutcome::Failed {
                    reason: err.to_string(),
                };
            }
        };

        match self
            .driver()
            .select_by_visible_text(&element, visible_text)
            .await
        {
            Ok(()) => {
                info!(session = %self.id(), %locator, option = visible_text, "selected natively");
                return SelectOutcome::SelectedNatively;
            }
            Err(err) => {
                debug!(session = %self.id(), %locator, %err, "native selection unavailable; typing instead");
            }
        }

        match self.driver().send_keys(&element, visible_text).await {
            Ok(()) => {
                info!(session = %self.id(), %locator, option = visible_text, "typed option label");
                SelectOutcome::FellBackToTyping
            }
            Err(err) => {
                warn!(session = %self.id(), %locator, %err, "typed selection fallback failed");
                SelectOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives::testing::session;
    use crate::types::{SelectOutcome, TimeoutProfile};
    use cdp_adapter::fake::{FakeElement, Interaction};
    use cdp_adapter::Locator;

    fn genome() -> Locator {
        Locator::xpath("//select[@name='genome' or @id='genome']")
    }

    #[tokio::test]
    async fn native_select_reports_selected() {
        let (driver, session) = session("https://varsome.com/");
        let id = driver.add(FakeElement::matching(&genome()).select(&["hg19", "hg38"]));

        let outcome = session
            .select_option(&genome(), "hg38", TimeoutProfile::Short)
            .await;
        assert_eq!(outcome, SelectOutcome::SelectedNatively);
        assert_eq!(driver.value_of(id).as_deref(), Some("hg38"));
    }

    #[tokio::test]
    async fn custom_control_falls_back_to_typing() {
        let (driver, session) = session("https://varsome.com/");
        let sex = Locator::id("react-select-6-input");
        let id = driver.add(FakeElement::matching(&sex));

        let outcome = session
            .select_option(&sex, "Female", TimeoutProfile::Short)
            .await;
        assert_eq!(outcome, SelectOutcome::FellBackToTyping);
        assert!(outcome.is_resolved());
        assert_eq!(
            driver.interactions(),
            vec![Interaction::SendKeys(id, "Female".into())]
        );
    }

    #[tokio::test]
    async fn missing_option_still_resolves_via_typing() {
        let (driver, session) = session("https://varsome.com/");
        driver.add(FakeElement::matching(&genome()).select(&["hg19"]));

        let outcome = session
            .select_option(&genome(), "hg38", TimeoutProfile::Short)
            .await;
        assert_eq!(outcome, SelectOutcome::FellBackToTyping);
    }

    #[tokio::test]
    async fn absent_control_fails_without_error() {
        let (_, session) = session("https://varsome.com/");
        let outcome = session
            .select_option(&genome(), "hg38", TimeoutProfile::Short)
            .await;
        assert!(!outcome.is_resolved());
    }
}
