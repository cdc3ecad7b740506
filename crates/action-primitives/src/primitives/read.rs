//! Read helpers - text, attributes and computed style

use crate::{errors::ActionError, primitives::Session, types::TimeoutProfile};
use cdp_adapter::Locator;
use tracing::debug;

impl Session {
    /// Rendered text of the first visible match.
    pub async fn read_text(
        &self,
        locator: &Locator,
        profile: TimeoutProfile,
    ) -> Result<Option<String>, ActionError> {
        match self.visible(locator, profile).await? {
            Some(element) => Ok(Some(self.driver().text(&element).await?)),
            None => Ok(None),
        }
    }

    pub async fn read_attribute(
        &self,
        locator: &Locator,
        name: &str,
        profile: TimeoutProfile,
    ) -> Result<Option<String>, ActionError> {
        match self.present(locator, profile).await? {
            Some(element) => Ok(self.driver().attribute(&element, name).await?),
            None => Ok(None),
        }
    }

    /// Computed `property` of the matched element's parent.
    pub async fn read_parent_css(
        &self,
        locator: &Locator,
        property: &str,
        profile: TimeoutProfile,
    ) -> Result<Option<String>, ActionError> {
        let Some(element) = self.present(locator, profile).await? else {
            return Ok(None);
        };
        let Some(parent) = self.driver().parent(&element).await? else {
            debug!(session = %self.id(), %locator, "matched element has no parent");
            return Ok(None);
        };
        Ok(self.driver().css_value(&parent, property).await?)
    }
}
