//! Click primitive - resilient clicks and primary/fallback resolution

use crate::{
    errors::ActionError,
    primitives::Session,
    types::{ElementAction, PairSide, ResilientPair, TimeoutProfile, WaitCondition},
};
use cdp_adapter::{AdapterErrorKind, ElementRef, Locator};
use tracing::{debug, info, warn};

impl Session {
    /// Resolves `locator` as clickable and clicks it.
    ///
    /// A pointer click that would be intercepted is retried as a script click on the
    /// same handle. Returns `false` only when the element never resolved.
    pub async fn click_resilient(
        &self,
        locator: &Locator,
        profile: TimeoutProfile,
    ) -> Result<bool, ActionError> {
        let Some(element) = self.clickable(locator, profile).await? else {
            return Ok(false);
        };
        self.click_element(&element).await?;
        info!(session = %self.id(), %locator, "clicked");
        Ok(true)
    }

    /// Script-driven click, bypassing hit testing.
    pub async fn script_click(
        &self,
        locator: &Locator,
        profile: TimeoutProfile,
    ) -> Result<bool, ActionError> {
        let Some(element) = self.present(locator, profile).await? else {
            return Ok(false);
        };
        self.driver().script_click(&element).await?;
        info!(session = %self.id(), %locator, "clicked via script");
        Ok(true)
    }

    /// Primary first, fallback second; no further escalation.
    ///
    /// Returns `false` iff neither locator resolved within the medium budget.
    pub async fn act_with_fallback(
        &self,
        pair: &ResilientPair,
        action: ElementAction<'_>,
    ) -> Result<bool, ActionError> {
        let condition: fn(Locator) -> WaitCondition = match action {
            ElementAction::Click => WaitCondition::Clickable,
            ElementAction::Type { .. } => WaitCondition::Visible,
        };
        let Some((element, side)) = self.resolve_pair(pair, condition).await? else {
            warn!(session = %self.id(), %pair, ?action, "neither locator resolved");
            return Ok(false);
        };
        debug!(session = %self.id(), ?side, ?action, "acting on resolved element");

        match action {
            ElementAction::Click => self.click_element(&element).await?,
            ElementAction::Type { text, clear_first } => {
                self.type_element(&element, text, clear_first).await?
            }
        }
        Ok(true)
    }

    /// Text of the first half of `pair` that is visible and carries text.
    ///
    /// A primary that resolves with empty text falls through to the fallback.
    pub async fn read_text_with_fallback(
        &self,
        pair: &ResilientPair,
    ) -> Result<Option<String>, ActionError> {
        for (locator, side) in [
            (&pair.primary, PairSide::Primary),
            (&pair.fallback, PairSide::Fallback),
        ] {
            let Some(element) = self.visible(locator, TimeoutProfile::Medium).await? else {
                continue;
            };
            let text = self.driver().text(&element).await?;
            if !text.trim().is_empty() {
                debug!(session = %self.id(), ?side, %locator, "text read");
                return Ok(Some(text));
            }
            debug!(session = %self.id(), ?side, %locator, "resolved element has no text");
        }
        Ok(None)
    }

    pub(crate) async fn resolve_pair(
        &self,
        pair: &ResilientPair,
        condition: fn(Locator) -> WaitCondition,
    ) -> Result<Option<(ElementRef, PairSide)>, ActionError> {
        let primary = self
            .wait_for(&condition(pair.primary.clone()), TimeoutProfile::Medium)
            .await?;
        if let Some(element) = primary.into_element() {
            return Ok(Some((element, PairSide::Primary)));
        }

        debug!(session = %self.id(), fallback = %pair.fallback, "primary absent; trying fallback");
        let fallback = self
            .wait_for(&condition(pair.fallback.clone()), TimeoutProfile::Medium)
            .await?;
        Ok(fallback
            .into_element()
            .map(|element| (element, PairSide::Fallback)))
    }

    pub(crate) async fn click_element(&self, element: &ElementRef) -> Result<(), ActionError> {
        match self.driver().click(element).await {
            Ok(()) => Ok(()),
            Err(err) if err.is(AdapterErrorKind::NotInteractable) => {
                info!(
                    session = %self.id(),
                    %element,
                    reason = err.hint.as_deref().unwrap_or("not interactable"),
                    "pointer click intercepted; using script click"
                );
                self.driver().script_click(element).await?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
