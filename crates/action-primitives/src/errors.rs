//! Error types for action primitives

use cdp_adapter::{AdapterError, AdapterErrorKind};
use thiserror::Error;

/// Driver failures that are not the expected "element absent" outcome.
///
/// Absence never surfaces here; it is reported as `None`, `false` or
/// [`Resolution::Absent`](crate::types::Resolution::Absent).
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// Navigation timed out waiting for page load
    #[error("Navigation timeout: {0}")]
    NavTimeout(String),

    /// Element handle no longer attached to the document
    #[error("Stale element: {0}")]
    StaleElement(String),

    /// Element refused both pointer and script interaction
    #[error("Element not clickable: {0}")]
    NotClickable(String),

    /// Frame index disappeared between enumeration and switch
    #[error("Frame unavailable: {0}")]
    FrameUnavailable(String),

    /// Page script raised or returned an unexpected shape
    #[error("Script error: {0}")]
    Script(String),

    /// CDP communication or protocol error
    #[error("CDP I/O error: {0}")]
    CdpIo(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AdapterError> for ActionError {
    fn from(err: AdapterError) -> Self {
        let message = err.to_string();
        match err.kind {
            AdapterErrorKind::NavTimeout => ActionError::NavTimeout(message),
            AdapterErrorKind::StaleElement => ActionError::StaleElement(message),
            AdapterErrorKind::NotInteractable => ActionError::NotClickable(message),
            AdapterErrorKind::NoSuchFrame => ActionError::FrameUnavailable(message),
            AdapterErrorKind::Script
            | AdapterErrorKind::NotSelectable
            | AdapterErrorKind::OptionNotFound => ActionError::Script(message),
            AdapterErrorKind::CdpIo => ActionError::CdpIo(message),
            AdapterErrorKind::Internal => ActionError::Internal(message),
        }
    }
}
