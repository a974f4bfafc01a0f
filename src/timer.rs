//! Logical-clock timer scheduling.
//!
//! All game timing runs off a single `TimerWheel` that the event loop
//! advances explicitly, so nothing here ever reads the wall clock and the
//! whole engine can be driven deterministically in tests.

/// Handle for a scheduled timer. Ids are never reused within a wheel, so a
/// stale handle cancels nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What a firing timer means to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Countdown,
    SessionClock,
    Progress,
    CharExpiry,
    MissGrace,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: TimerId,
    kind: TimerKind,
    due: u64,
    period: Option<u64>,
}

/// A small set of pending timers against a monotonically advancing logical
/// clock (milliseconds).
#[derive(Debug, Default)]
pub struct TimerWheel {
    now: u64,
    next_id: u64,
    entries: Vec<Entry>,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule a one-shot timer `delay_ms` from now.
    pub fn once(&mut self, kind: TimerKind, delay_ms: u64) -> TimerId {
        self.insert(kind, delay_ms, None)
    }

    /// Schedule a repeating timer; the first fire is one period from now.
    pub fn every(&mut self, kind: TimerKind, period_ms: u64) -> TimerId {
        self.insert(kind, period_ms, Some(period_ms))
    }

    fn insert(&mut self, kind: TimerKind, delay_ms: u64, period: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            kind,
            due: self.now + delay_ms,
            period,
        });
        id
    }

    /// Remove a pending timer. Returns false if the handle no longer refers
    /// to anything (already fired or cancelled).
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absolute due time of the earliest pending entry.
    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Move the clock forward. Due timers are not dispatched here; drain
    /// them with [`pop_due`](Self::pop_due) so a handler that cancels a
    /// sibling keeps it from firing even when both were already due.
    pub fn advance(&mut self, dt_ms: u64) {
        self.now += dt_ms;
    }

    /// Move the clock forward to an absolute time; the clock never runs
    /// backwards.
    pub fn advance_to(&mut self, t_ms: u64) {
        self.now = self.now.max(t_ms);
    }

    /// Next fired timer with `due <= now`: earliest due first, ties in
    /// scheduling order. Repeating entries re-arm, one-shots are removed.
    pub fn pop_due(&mut self) -> Option<(TimerId, TimerKind)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= self.now)
            .min_by_key(|(_, e)| (e.due, e.id.0))
            .map(|(i, _)| i)?;

        let entry = self.entries[idx];
        match entry.period {
            Some(period) => self.entries[idx].due = entry.due + period,
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some((entry.id, entry.kind))
    }
}
