//! Core types for the wait engine

use cdp_adapter::{ElementRef, Locator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Named wait budget chosen per operation by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutProfile {
    Short,
    #[default]
    Medium,
    Long,
    ExtraLong,
}

/// Durations behind each [`TimeoutProfile`], plus polling cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    pub short: Duration,
    pub medium: Duration,
    pub long: Duration,
    pub extra_long: Duration,
    /// Interval between condition evaluations
    pub poll_interval: Duration,
    /// Bounded pause used where no observable completion condition exists
    pub settle: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(5),
            medium: Duration::from_secs(10),
            long: Duration::from_secs(20),
            extra_long: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
            settle: Duration::from_secs(1),
        }
    }
}

impl Timeouts {
    /// Same budget for every profile; handy for tests against scripted documents.
    pub fn uniform(budget: Duration, poll_interval: Duration) -> Self {
        Self {
            short: budget,
            medium: budget,
            long: budget,
            extra_long: budget,
            poll_interval,
            settle: poll_interval,
        }
    }

    pub fn duration(&self, profile: TimeoutProfile) -> Duration {
        match profile {
            TimeoutProfile::Short => self.short,
            TimeoutProfile::Medium => self.medium,
            TimeoutProfile::Long => self.long,
            TimeoutProfile::ExtraLong => self.extra_long,
        }
    }
}

/// Predicate evaluated repeatedly against live browser state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitCondition {
    Present(Locator),
    Visible(Locator),
    Clickable(Locator),
    Invisible(Locator),
    UrlContains(String),
}

impl WaitCondition {
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            WaitCondition::Present(l)
            | WaitCondition::Visible(l)
            | WaitCondition::Clickable(l)
            | WaitCondition::Invisible(l) => Some(l),
            WaitCondition::UrlContains(_) => None,
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCondition::Present(l) => write!(f, "present({l})"),
            WaitCondition::Visible(l) => write!(f, "visible({l})"),
            WaitCondition::Clickable(l) => write!(f, "clickable({l})"),
            WaitCondition::Invisible(l) => write!(f, "invisible({l})"),
            WaitCondition::UrlContains(s) => write!(f, "url_contains({s})"),
        }
    }
}

/// Outcome of a wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An element satisfying the condition
    Element(ElementRef),
    /// A condition with no element to hand back held (invisibility, URL match)
    Satisfied,
    Absent,
}

impl Resolution {
    pub fn is_absent(&self) -> bool {
        matches!(self, Resolution::Absent)
    }

    pub fn into_element(self) -> Option<ElementRef> {
        match self {
            Resolution::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// (primary, fallback) locators tolerating markup drift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResilientPair {
    pub primary: Locator,
    pub fallback: Locator,
}

impl ResilientPair {
    pub const fn new(primary: Locator, fallback: Locator) -> Self {
        Self { primary, fallback }
    }
}

impl fmt::Display for ResilientPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.primary, self.fallback)
    }
}

/// Which half of a [`ResilientPair`] resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    Primary,
    Fallback,
}

/// Action performed by `act_with_fallback` on the resolved element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementAction<'a> {
    Click,
    Type { text: &'a str, clear_first: bool },
}

/// Result of a dropdown selection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectOutcome {
    /// A native option with the requested label is now selected
    SelectedNatively,
    /// The control was not a native select; the label was typed into it unverified
    FellBackToTyping,
    Failed { reason: String },
}

impl SelectOutcome {
    /// True when the target element resolved, whichever path was taken.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, SelectOutcome::Failed { .. })
    }
}

/// Why a bounded settle pause was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleReason {
    /// Late-mounted popups have no signal to wait on
    PopupAppearance,
    /// Autocomplete suggestions render without a stable locator
    Suggestions,
}

impl fmt::Display for SettleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettleReason::PopupAppearance => f.write_str("popup_appearance"),
            SettleReason::Suggestions => f.write_str("suggestions"),
        }
    }
}
