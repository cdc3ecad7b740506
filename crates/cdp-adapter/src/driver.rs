//! The capability interface every automation backend implements.

use crate::commands::{Key, Locator};
use crate::error::AdapterError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Document context an element was resolved in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameScope {
    #[default]
    TopLevel,
    Frame(usize),
}

impl fmt::Display for FrameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameScope::TopLevel => f.write_str("top"),
            FrameScope::Frame(index) => write!(f, "frame[{index}]"),
        }
    }
}

/// Opaque handle to one live element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub handle: String,
    pub scope: FrameScope,
}

impl ElementRef {
    pub fn new(handle: impl Into<String>, scope: FrameScope) -> Self {
        Self {
            handle: handle.into(),
            scope,
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.handle, self.scope)
    }
}

/// Rendering state sampled for wait conditions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    pub displayed: bool,
    pub enabled: bool,
}

impl ElementState {
    pub fn visible(&self) -> bool {
        self.displayed
    }

    pub fn clickable(&self) -> bool {
        self.displayed && self.enabled
    }
}

/// Browser automation surface shared by every backend.
///
/// All element operations act on the document context selected by the most recent
/// `switch_to_frame` / `switch_to_default` call.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn navigate(&self, url: &str, deadline: Duration) -> Result<(), AdapterError>;
    async fn current_url(&self) -> Result<String, AdapterError>;
    /// `document.readyState` of the top-level document.
    async fn ready_state(&self) -> Result<String, AdapterError>;

    /// Elements matching `locator` in the current context, in document order.
    async fn query(&self, locator: &Locator) -> Result<Vec<ElementRef>, AdapterError>;
    async fn element_state(&self, element: &ElementRef) -> Result<ElementState, AdapterError>;

    /// Pointer click at the element centre. Fails with `NotInteractable` when another
    /// element would receive the click or the element has no box.
    async fn click(&self, element: &ElementRef) -> Result<(), AdapterError>;
    /// `element.click()` dispatched from script; bypasses hit testing.
    async fn script_click(&self, element: &ElementRef) -> Result<(), AdapterError>;

    async fn clear(&self, element: &ElementRef) -> Result<(), AdapterError>;
    async fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), AdapterError>;
    async fn press_key(&self, element: &ElementRef, key: Key) -> Result<(), AdapterError>;
    async fn select_by_visible_text(
        &self,
        element: &ElementRef,
        text: &str,
    ) -> Result<(), AdapterError>;

    async fn text(&self, element: &ElementRef) -> Result<String, AdapterError>;
    async fn attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, AdapterError>;
    /// Computed style value.
    async fn css_value(
        &self,
        element: &ElementRef,
        property: &str,
    ) -> Result<Option<String>, AdapterError>;
    async fn parent(&self, element: &ElementRef) -> Result<Option<ElementRef>, AdapterError>;

    async fn scroll_into_view(&self, element: &ElementRef) -> Result<(), AdapterError>;
    async fn in_viewport(&self, element: &ElementRef) -> Result<bool, AdapterError>;

    async fn execute_script(&self, script: &str) -> Result<Value, AdapterError>;

    /// Number of embedded documents directly under the top-level document.
    async fn frame_count(&self) -> Result<usize, AdapterError>;
    async fn switch_to_frame(&self, index: usize) -> Result<(), AdapterError>;
    async fn switch_to_default(&self) -> Result<(), AdapterError>;
    fn current_scope(&self) -> FrameScope;

    /// PNG bytes of the current viewport.
    async fn screenshot(&self) -> Result<Vec<u8>, AdapterError>;
}
