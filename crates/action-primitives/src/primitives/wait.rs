//! Wait primitive - poll live state until a condition holds or the budget runs out

use crate::{
    errors::ActionError,
    primitives::Session,
    types::{Resolution, TimeoutProfile, WaitCondition},
};
use cdp_adapter::{AdapterErrorKind, ElementRef, Locator};
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How loudly a timed-out wait reports itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Report {
    /// Caller expected the condition; a miss is worth a warning
    Diagnostic,
    /// Caller is probing for something optional
    Quiet,
}

impl Session {
    /// Polls `condition` until it holds or the profile's budget elapses.
    ///
    /// A timeout yields [`Resolution::Absent`] and a warning; it is never an error.
    pub async fn wait_for(
        &self,
        condition: &WaitCondition,
        profile: TimeoutProfile,
    ) -> Result<Resolution, ActionError> {
        self.poll(condition, profile, Report::Diagnostic).await
    }

    /// Polls several conditions together and returns the index of the first that holds.
    pub async fn wait_for_any(
        &self,
        conditions: &[WaitCondition],
        profile: TimeoutProfile,
    ) -> Result<Option<usize>, ActionError> {
        let budget = self.timeouts().duration(profile);
        let deadline = self.deadline_after(budget);
        loop {
            for (index, condition) in conditions.iter().enumerate() {
                if !self.check(condition).await?.is_absent() {
                    debug!(session = %self.id(), %condition, "condition satisfied");
                    return Ok(Some(index));
                }
            }
            let now = Instant::now();
            if now >= deadline {
                warn!(
                    session = %self.id(),
                    conditions = conditions.len(),
                    budget_ms = budget.as_millis() as u64,
                    "none of the awaited conditions held before timeout"
                );
                return Ok(None);
            }
            sleep(self.timeouts().poll_interval.min(deadline - now)).await;
        }
    }

    pub async fn present(
        &self,
        locator: &Locator,
        profile: TimeoutProfile,
    ) -> Result<Option<ElementRef>, ActionError> {
        Ok(self
            .wait_for(&WaitCondition::Present(locator.clone()), profile)
            .await?
            .into_element())
    }

    pub async fn visible(
        &self,
        locator: &Locator,
        profile: TimeoutProfile,
    ) -> Result<Option<ElementRef>, ActionError> {
        Ok(self
            .wait_for(&WaitCondition::Visible(locator.clone()), profile)
            .await?
            .into_element())
    }

    pub async fn clickable(
        &self,
        locator: &Locator,
        profile: TimeoutProfile,
    ) -> Result<Option<ElementRef>, ActionError> {
        Ok(self
            .wait_for(&WaitCondition::Clickable(locator.clone()), profile)
            .await?
            .into_element())
    }

    /// Presence check for optional elements; a miss is logged at debug level only.
    pub async fn is_present(
        &self,
        locator: &Locator,
        profile: TimeoutProfile,
    ) -> Result<bool, ActionError> {
        let resolution = self
            .poll(&WaitCondition::Present(locator.clone()), profile, Report::Quiet)
            .await?;
        Ok(!resolution.is_absent())
    }

    pub async fn is_visible(
        &self,
        locator: &Locator,
        profile: TimeoutProfile,
    ) -> Result<bool, ActionError> {
        let resolution = self
            .poll(&WaitCondition::Visible(locator.clone()), profile, Report::Quiet)
            .await?;
        Ok(!resolution.is_absent())
    }

    /// True once every match is hidden or none remain. Idempotent: an already absent
    /// element returns true on the first evaluation without touching the page.
    pub async fn wait_until_gone(
        &self,
        locator: &Locator,
        profile: TimeoutProfile,
    ) -> Result<bool, ActionError> {
        let resolution = self
            .wait_for(&WaitCondition::Invisible(locator.clone()), profile)
            .await?;
        Ok(!resolution.is_absent())
    }

    pub async fn wait_url_contains(
        &self,
        substring: &str,
        profile: TimeoutProfile,
    ) -> Result<bool, ActionError> {
        let resolution = self
            .wait_for(&WaitCondition::UrlContains(substring.to_string()), profile)
            .await?;
        Ok(!resolution.is_absent())
    }

    pub(crate) async fn poll(
        &self,
        condition: &WaitCondition,
        profile: TimeoutProfile,
        report: Report,
    ) -> Result<Resolution, ActionError> {
        let budget = self.timeouts().duration(profile);
        let deadline = self.deadline_after(budget);
        loop {
            let resolution = self.check(condition).await?;
            if !resolution.is_absent() {
                return Ok(resolution);
            }

            let now = Instant::now();
            if now >= deadline {
                match report {
                    Report::Diagnostic => warn!(
                        session = %self.id(),
                        %condition,
                        budget_ms = budget.as_millis() as u64,
                        "condition not met before timeout"
                    ),
                    Report::Quiet => debug!(
                        session = %self.id(),
                        %condition,
                        budget_ms = budget.as_millis() as u64,
                        "optional condition not met"
                    ),
                }
                return Ok(Resolution::Absent);
            }
            sleep(self.timeouts().poll_interval.min(deadline - now)).await;
        }
    }

    /// Single evaluation of `condition` against the current document context.
    async fn check(&self, condition: &WaitCondition) -> Result<Resolution, ActionError> {
        let driver = self.driver();
        match condition {
            WaitCondition::UrlContains(substring) => {
                let url = driver.current_url().await?;
                Ok(if url.contains(substring.as_str()) {
                    Resolution::Satisfied
                } else {
                    Resolution::Absent
                })
            }
            WaitCondition::Present(locator) => Ok(driver
                .query(locator)
                .await?
                .into_iter()
                .next()
                .map(Resolution::Element)
                .unwrap_or(Resolution::Absent)),
            WaitCondition::Visible(locator) | WaitCondition::Clickable(locator) => {
                let need_enabled = matches!(condition, WaitCondition::Clickable(_));
                for element in driver.query(locator).await? {
                    let state = match driver.element_state(&element).await {
                        Ok(state) => state,
                        Err(err) if err.is(AdapterErrorKind::StaleElement) => continue,
                        Err(err) => return Err(err.into()),
                    };
                    let ready = if need_enabled {
                        state.clickable()
                    } else {
                        state.visible()
                    };
                    if ready {
                        return Ok(Resolution::Element(element));
                    }
                }
                Ok(Resolution::Absent)
            }
            WaitCondition::Invisible(locator) => {
                for element in driver.query(locator).await? {
                    match driver.element_state(&element).await {
                        Ok(state) if state.visible() => return Ok(Resolution::Absent),
                        Ok(_) => {}
                        Err(err) if err.is(AdapterErrorKind::StaleElement) => {}
                        Err(err) => return Err(err.into()),
                    }
                }
                Ok(Resolution::Satisfied)
            }
        }
    }
}
