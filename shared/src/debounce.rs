use crate::capabilities::TimerId;

/// Timer work implied by one raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    /// Ticket to start a timer for.
    pub ticket: TimerId,
    /// Previously pending ticket that no longer commits anything.
    pub cancelled: Option<TimerId>,
}

/// Trailing-edge debouncer for the search box.
///
/// Only the most recent ticket can commit; every earlier one is dead the
/// moment a newer input arrives, whether or not the shell manages to cancel
/// its timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    quiet_ms: u64,
    raw: String,
    committed: String,
    pending: Option<TimerId>,
    issued: u64,
}

impl Debouncer {
    pub fn new(quiet_ms: u64) -> Self {
        Self {
            quiet_ms,
            raw: String::new(),
            committed: String::new(),
            pending: None,
            issued: 0,
        }
    }

    pub fn quiet_ms(&self) -> u64 {
        self.quiet_ms
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<TimerId> {
        self.pending
    }

    pub fn input(&mut self, text: impl Into<String>) -> Scheduled {
        self.raw = text.into();
        self.issued += 1;
        let ticket = TimerId(self.issued);
        let cancelled = self.pending.replace(ticket);
        Scheduled { ticket, cancelled }
    }

    /// Commits the raw value if `ticket` is the one still pending.
    pub fn elapsed(&mut self, ticket: TimerId) -> Option<&str> {
        if self.pending != Some(ticket) {
            return None;
        }
        self.pending = None;
        self.committed.clone_from(&self.raw);
        Some(&self.committed)
    }

    /// Continues from another debouncer's query state under a new quiet window.
    /// A pending commit is dropped; the caller reschedules it with [`Self::input`].
    pub fn carry_over(&mut self, previous: &Debouncer) {
        self.raw.clone_from(&previous.raw);
        self.committed.clone_from(&previous.committed);
        self.issued = previous.issued;
        self.pending = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(crate::DEFAULT_DEBOUNCE_MS)
    }
}
