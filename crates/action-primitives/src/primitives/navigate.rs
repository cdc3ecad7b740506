//! Navigate primitive - load a URL and wait for the document to finish loading

use crate::{errors::ActionError, primitives::Session, types::TimeoutProfile};
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, info, warn};

impl Session {
    pub async fn navigate(&self, url: &str, profile: TimeoutProfile) -> Result<(), ActionError> {
        info!(session = %self.id(), %url, ?profile, "navigating");
        self.driver()
            .navigate(url, self.timeouts().duration(profile))
            .await?;
        Ok(())
    }

    /// Waits for `document.readyState == "complete"`.
    pub async fn wait_for_document_ready(
        &self,
        profile: TimeoutProfile,
    ) -> Result<bool, ActionError> {
        let deadline = self.deadline_after(self.timeouts().duration(profile));
        loop {
            let state = self.driver().ready_state().await?;
            if state == "complete" {
                debug!(session = %self.id(), "document ready");
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                warn!(session = %self.id(), ready_state = %state, "document did not finish loading");
                return Ok(false);
            }
            sleep(self.timeouts().poll_interval.min(deadline - now)).await;
        }
    }

    pub async fn current_url(&self) -> Result<String, ActionError> {
        Ok(self.driver().current_url().await?)
    }

    /// PNG bytes of the current viewport.
    pub async fn screenshot(&self) -> Result<Vec<u8>, ActionError> {
        Ok(self.driver().screenshot().await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives::testing::session;
    use crate::types::TimeoutProfile;
    use cdp_adapter::fake::Interaction;

    #[tokio::test]
    async fn navigation_then_ready() {
        let (driver, session) = session("about:blank");
        session
            .navigate("https://varsome.com", TimeoutProfile::Long)
            .await
            .unwrap();
        assert!(session
            .wait_for_document_ready(TimeoutProfile::Medium)
            .await
            .unwrap());
        assert_eq!(
            driver.interactions(),
            vec![Interaction::Navigate("https://varsome.com".into())]
        );
    }

    #[tokio::test]
    async fn loading_document_times_out() {
        let (driver, session) = session("https://varsome.com");
        driver.set_ready_state("loading");
        assert!(!session
            .wait_for_document_ready(TimeoutProfile::Short)
            .await
            .unwrap());
    }
}
