//! Type text primitive - typing and named key presses

use crate::{errors::ActionError, primitives::Session, types::TimeoutProfile};
use cdp_adapter::{ElementRef, Key, Locator};
use tracing::{debug, info};

impl Session {
    /// Resolves `locator` as visible, optionally clears it, then appends `text`.
    pub async fn type_into(
        &self,
        locator: &Locator,
        text: &str,
        clear_first: bool,
        profile: TimeoutProfile,
    ) -> Result<bool, ActionError> {
        let Some(element) = self.visible(locator, profile).await? else {
            return Ok(false);
        };
        self.type_element(&element, text, clear_first).await?;
        info!(session = %self.id(), %locator, chars = text.chars().count(), "typed text");
        Ok(true)
    }

    /// Presses `key` on the element once it is present.
    pub async fn press_key(
        &self,
        locator: &Locator,
        key: Key,
        profile: TimeoutProfile,
    ) -> Result<bool, ActionError> {
        let Some(element) = self.present(locator, profile).await? else {
            return Ok(false);
        };
        self.driver().press_key(&element, key).await?;
        debug!(session = %self.id(), %locator, ?key, "key pressed");
        Ok(true)
    }

    pub async fn press_enter(
        &self,
        locator: &Locator,
        profile: TimeoutProfile,
    ) -> Result<bool, ActionError> {
        self.press_key(locator, Key::Enter, profile).await
    }

    pub(crate) async fn type_element(
        &self,
        element: &ElementRef,
        text: &str,
        clear_first: bool,
    ) -> Result<(), ActionError> {
        if clear_first {
            self.driver().clear(element).await?;
        }
        self.driver().send_keys(element, text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives::testing::session;
    use crate::types::TimeoutProfile;
    use cdp_adapter::fake::{FakeElement, Interaction};
    use cdp_adapter::{Key, Locator};

    #[tokio::test]
    async fn clears_before_typing_by_default() {
        let (driver, session) = session("https://varsome.com/");
        let input = Locator::xpath(
            "//input[contains(@placeholder, 'Enter gene') or contains(@placeholder, 'variant')]",
        );
        let id = driver.add(FakeElement::matching(&input).value("KRAS"));

        assert!(session
            .type_into(&input, "BRAF:V600E", true, TimeoutProfile::Short)
            .await
            .unwrap());
        assert_eq!(driver.value_of(id).as_deref(), Some("BRAF:V600E"));
        assert_eq!(
            driver.interactions(),
            vec![
                Interaction::Clear(id),
                Interaction::SendKeys(id, "BRAF:V600E".into())
            ]
        );
    }

    #[tokio::test]
    async fn appends_without_clearing() {
        let (driver, session) = session("https://varsome.com/");
        let age = Locator::css("input[name*='age'], input[placeholder*='age']");
        let id = driver.add(FakeElement::matching(&age).value("6"));

        assert!(session
            .type_into(&age, "0", false, TimeoutProfile::Short)
            .await
            .unwrap());
        assert_eq!(driver.value_of(id).as_deref(), Some("60"));
    }

    #[tokio::test]
    async fn hidden_input_is_not_typed_into() {
        let (driver, session) = session("https://varsome.com/");
        let input = Locator::id("react-select-2-input");
        driver.add(FakeElement::matching(&input).hidden());

        assert!(!session
            .type_into(&input, "Cancer", true, TimeoutProfile::Short)
            .await
            .unwrap());
        assert!(driver.interactions().is_empty());
    }

    #[tokio::test]
    async fn enter_is_pressed_on_present_element() {
        let (driver, session) = session("https://varsome.com/");
        let input = Locator::id("react-select-7-input");
        let id = driver.add(FakeElement::matching(&input));

        assert!(session
            .press_enter(&input, TimeoutProfile::Short)
            .await
            .unwrap());
        assert_eq!(
            driver.interactions(),
            vec![Interaction::PressKey(id, Key::Enter)]
        );
    }
}
