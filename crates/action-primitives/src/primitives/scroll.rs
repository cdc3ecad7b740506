//! Scroll primitive - bring an element into the viewport

use crate::{errors::ActionError, primitives::Session, types::TimeoutProfile};
use cdp_adapter::{ElementRef, Locator};
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, warn};

impl Session {
    /// Scrolls the element into view and waits until it reports being inside the
    /// viewport, rather than pausing for the scroll animation.
    pub async fn scroll_into_view(
        &self,
        locator: &Locator,
        profile: TimeoutProfile,
    ) -> Result<bool, ActionError> {
        let Some(element) = self.present(locator, profile).await? else {
            return Ok(false);
        };
        self.driver().scroll_into_view(&element).await?;
        if !self.await_in_viewport(&element).await? {
            warn!(session = %self.id(), %locator, "element still outside viewport after scroll");
        }
        Ok(true)
    }

    async fn await_in_viewport(&self, element: &ElementRef) -> Result<bool, ActionError> {
        let deadline = self.deadline_after(self.timeouts().duration(TimeoutProfile::Short));
        loop {
            if self.driver().in_viewport(element).await? {
                debug!(session = %self.id(), %element, "scrolled into view");
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            sleep(self.timeouts().poll_interval.min(deadline - now)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives::testing::session;
    use crate::types::TimeoutProfile;
    use cdp_adapter::fake::{FakeElement, Interaction};
    use cdp_adapter::Locator;

    #[tokio::test]
    async fn scrolls_card_below_the_fold() {
        let (driver, session) = session("https://varsome.com/variant/hg38/BRAF");
        let card = Locator::id("acmg");
        let id = driver.add(FakeElement::matching(&card).below_fold());

        assert!(session
            .scroll_into_view(&card, TimeoutProfile::Short)
            .await
            .unwrap());
        assert_eq!(driver.interactions(), vec![Interaction::ScrollIntoView(id)]);
    }

    #[tokio::test]
    async fn missing_card_is_not_scrolled() {
        let (_, session) = session("https://varsome.com/");
        assert!(!session
            .scroll_into_view(&Locator::id("acmg"), TimeoutProfile::Short)
            .await
            .unwrap());
    }
}
