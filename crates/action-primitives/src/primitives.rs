//! Engine operations, grouped by concern:
//! 1. wait - condition polling (`wait_for`, `wait_until_gone`, `wait_url_contains`)
//! 2. click - resilient click and primary/fallback resolution
//! 3. type_text - typing and key presses
//! 4. select - dropdown selection with typed fallback
//! 5. scroll - scroll into view until the element reports in-viewport
//! 6. popup - dismissal of overlays, including ones inside embedded documents
//! 7. navigate - navigation and document readiness
//! 8. read - text, attribute and computed-style reads

mod click;
mod navigate;
mod popup;
mod read;
mod scroll;
mod select;
mod type_text;
mod wait;

use crate::types::{SettleReason, Timeouts};
use cdp_adapter::BrowserDriver;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// Ceiling applied to configured budgets that would overflow the monotonic clock.
const MAX_BUDGET: Duration = Duration::from_secs(24 * 60 * 60);

/// Identifier attached to every log line a session emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Explicit handle to one browser session; passed into every flow.
///
/// All engine operations are methods on this type. Calls are expected to be issued
/// sequentially: the frame context selected on the driver is shared state.
#[derive(Clone)]
pub struct Session {
    driver: Arc<dyn BrowserDriver>,
    timeouts: Timeouts,
    id: SessionId,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(driver: Arc<dyn BrowserDriver>, timeouts: Timeouts) -> Self {
        Self {
            driver,
            timeouts,
            id: SessionId::new(),
        }
    }

    pub fn driver(&self) -> &Arc<dyn BrowserDriver> {
        &self.driver
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Poll deadline `budget` from now, clamped when the sum is not representable.
    pub(crate) fn deadline_after(&self, budget: Duration) -> Instant {
        let now = Instant::now();
        now.checked_add(budget)
            .or_else(|| now.checked_add(MAX_BUDGET))
            .unwrap_or(now)
    }

    /// Bounded pause for cases with no observable completion condition.
    ///
    /// This is a timing heuristic; nothing is guaranteed to have finished afterwards.
    pub async fn settle(&self, reason: SettleReason) {
        debug!(
            session = %self.id,
            reason = %reason,
            settle_ms = self.timeouts.settle.as_millis() as u64,
            "settling"
        );
        tokio::time::sleep(self.timeouts.settle).await;
    }
}
