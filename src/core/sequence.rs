//! "Last request wins" sequencing and debouncing of filter changes
//!
//! Queries are not cancelled. Instead each one is tagged with a
//! monotonically increasing [`QueryTicket`]; when a result arrives, it is
//! applied only if its ticket is still the latest issued.
//!
//! ```text
//! issue() ─▶ #1 ──────────────────────▶ resolves late ─▶ stale, dropped
//! issue() ─▶ #2 ─────▶ resolves ─▶ latest, applied
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Tag of an issued query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryTicket(u64);

impl QueryTicket {
    /// Position in issue order, starting at 1
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// Issues tickets and tells whether a ticket is still current
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, superseding all earlier ones
    pub fn issue(&self) -> QueryTicket {
        QueryTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// False once a newer ticket has been issued
    pub fn is_latest(&self, ticket: QueryTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Most recently issued ticket, if any
    pub fn latest(&self) -> Option<QueryTicket> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            seq => Some(QueryTicket(seq)),
        }
    }
}

/// Coalesces bursts of filter changes into one query
///
/// Each call to [`Debouncer::settle`] waits out the delay and reports whether
/// it is still the most recent call. Callers only query when it is.
///
/// # Example
/// ```rust,ignore
/// let debouncer = Debouncer::new(Duration::from_millis(300));
/// // on every keystroke:
/// if debouncer.settle().await.is_some() {
///     let toys = catalog.query_toys(&query).await?;
/// }
/// ```
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    sequencer: RequestSequencer,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// `Some` when no newer call arrived during the delay
    pub async fn settle(&self) -> Option<QueryTicket> {
        let ticket = self.sequencer.issue();
        tokio::time::sleep(self.delay).await;
        self.sequencer.is_latest(ticket).then_some(ticket)
    }
}
