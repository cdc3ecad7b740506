//! Resilient element locator and wait engine
//!
//! This crate turns a [`BrowserDriver`](cdp_adapter::BrowserDriver) into the operations
//! page flows are written against:
//! - condition waits (present, visible, clickable, invisible, URL substring) over named
//!   timeout profiles
//! - primary/fallback locator resolution
//! - resilient clicks, typing, and dropdown selection with an explicit outcome
//! - popup dismissal that always returns to the top-level document
//!
//! Expected absence is reported through `None`/`false`/[`Resolution::Absent`]; only real
//! driver failures become [`ActionError`].

pub mod errors;
mod primitives;
pub mod types;

pub use errors::*;
pub use primitives::*;
pub use types::*;

pub use cdp_adapter::{By, ElementRef, Key, Locator};
