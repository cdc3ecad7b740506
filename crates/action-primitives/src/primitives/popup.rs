//! Popup dismissal - cookie banners, disclaimers and frame-hosted overlays

use super::wait::Report;
use crate::{
    errors::ActionError,
    primitives::Session,
    types::{SettleReason, TimeoutProfile, WaitCondition},
};
use cdp_adapter::Locator;
use tracing::{debug, info, warn};

impl Session {
    /// Clicks `locator` if it shows up within `profile`, then waits for it to go away.
    ///
    /// Returns whether a dismissal click happened.
    pub async fn dismiss_if_present(
        &self,
        locator: &Locator,
        profile: TimeoutProfile,
    ) -> Result<bool, ActionError> {
        if !self.is_present(locator, profile).await? {
            debug!(session = %self.id(), %locator, "no popup to dismiss");
            return Ok(false);
        }
        if !self.click_resilient(locator, TimeoutProfile::Short).await? {
            return Ok(false);
        }
        if !self.wait_until_gone(locator, TimeoutProfile::Short).await? {
            debug!(session = %self.id(), %locator, "dismiss control still visible after click");
        }
        info!(session = %self.id(), %locator, "popup dismissed");
        Ok(true)
    }

    /// Looks for `locator` inside each embedded document and clicks the first match.
    ///
    /// The top-level document is selected again after every frame visit, on success,
    /// miss and error alike. Per-frame failures (unreachable or cross-origin frames)
    /// are logged and skipped.
    pub async fn dismiss_in_frames(&self, locator: &Locator) -> Result<bool, ActionError> {
        self.settle(SettleReason::PopupAppearance).await;

        self.driver().switch_to_default().await?;
        let frames = self.driver().frame_count().await?;
        debug!(session = %self.id(), frames, %locator, "probing embedded documents");

        for index in 0..frames {
            let attempt = self.try_dismiss_in_frame(index, locator).await;
            self.driver().switch_to_default().await?;
            match attempt {
                Ok(true) => {
                    info!(session = %self.id(), frame = index, %locator, "frame popup dismissed");
                    return Ok(true);
                }
                Ok(false) => {}
                Err(err) => {
                    warn!(session = %self.id(), frame = index, %err, "frame check failed; skipping");
                }
            }
        }
        Ok(false)
    }

    async fn try_dismiss_in_frame(
        &self,
        index: usize,
        locator: &Locator,
    ) -> Result<bool, ActionError> {
        self.driver().switch_to_frame(index).await?;
        let Some(element) = self
            .poll(
                &WaitCondition::Clickable(locator.clone()),
                TimeoutProfile::Short,
                Report::Quiet,
            )
            .await?
            .into_element()
        else {
            return Ok(false);
        };
        self.click_element(&element).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives::testing::session;
    use crate::types::TimeoutProfile;
    use cdp_adapter::fake::{Effect, FakeElement, Interaction};
    use cdp_adapter::{BrowserDriver, FrameScope, Locator};

    fn close_button() -> Locator {
        Locator::id("interactive-close-button")
    }

    #[tokio::test]
    async fn cookie_banner_is_accepted_and_awaited() {
        let (driver, session) = session("https://varsome.com/");
        let accept = Locator::id("onetrust-accept-btn-handler");
        let id = driver.add(FakeElement::matching(&accept));
        driver.on_click(id, Effect::Hide(id));

        assert!(session
            .dismiss_if_present(&accept, TimeoutProfile::Short)
            .await
            .unwrap());
        assert!(!driver.is_displayed(id));
    }

    #[tokio::test]
    async fn missing_banner_is_a_no_op() {
        let (driver, session) = session("https://varsome.com/");
        assert!(!session
            .dismiss_if_present(&Locator::id("onetrust-accept-btn-handler"), TimeoutProfile::Short)
            .await
            .unwrap());
        assert!(driver.interactions().is_empty());
    }

    #[tokio::test]
    async fn frame_popup_closed_and_top_level_restored() {
        let (driver, session) = session("https://varsome.com/");
        let first = driver.add_frame();
        let second = driver.add_frame();
        driver.add_in_frame(first, FakeElement::matching(&Locator::css("body")));
        let id = driver.add_in_frame(second, FakeElement::matching(&close_button()));

        assert!(session.dismiss_in_frames(&close_button()).await.unwrap());
        assert_eq!(driver.current_scope(), FrameScope::TopLevel);
        assert_eq!(
            driver.count(|i| matches!(i, Interaction::Click(c) if *c == id)),
            1
        );
        assert_eq!(
            driver.interactions().last(),
            Some(&Interaction::SwitchToDefault)
        );
    }

    #[tokio::test]
    async fn top_level_restored_when_no_frame_has_the_control() {
        let (driver, session) = session("https://varsome.com/");
        driver.add_frame();
        driver.add_frame();

        assert!(!session.dismiss_in_frames(&close_button()).await.unwrap());
        assert_eq!(driver.current_scope(), FrameScope::TopLevel);
        let switches_in = driver.count(|i| matches!(i, Interaction::SwitchToFrame(_)));
        let switches_out = driver.count(|i| matches!(i, Interaction::SwitchToDefault));
        assert_eq!(switches_in, 2);
        assert!(switches_out > switches_in);
    }

    #[tokio::test]
    async fn top_level_restored_when_a_frame_errors() {
        let (driver, session) = session("https://varsome.com/");
        let broken = driver.add_frame();
        let healthy = driver.add_frame();
        driver.fail_frame(broken);
        driver.add_in_frame(healthy, FakeElement::matching(&close_button()));

        assert!(session.dismiss_in_frames(&close_button()).await.unwrap());
        assert_eq!(driver.current_scope(), FrameScope::TopLevel);
    }

    #[tokio::test]
    async fn top_level_restored_when_every_frame_errors() {
        let (driver, session) = session("https://varsome.com/");
        let only = driver.add_frame();
        driver.fail_frame(only);

        assert!(!session.dismiss_in_frames(&close_button()).await.unwrap());
        assert_eq!(driver.current_scope(), FrameScope::TopLevel);
    }

    #[tokio::test]
    async fn no_frames_means_nothing_to_dismiss() {
        let (driver, session) = session("https://varsome.com/");
        driver.add(FakeElement::matching(&close_button()));

        assert!(!session.dismiss_in_frames(&close_button()).await.unwrap());
        assert_eq!(driver.current_scope(), FrameScope::TopLevel);
    }
}
