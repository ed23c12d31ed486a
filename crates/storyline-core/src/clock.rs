//! Fixed-resolution tick source driving auto-advance.

/// One clock event, stamped with the instant it was scheduled for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tick {
    pub at_ms: u64,
}

/// Periodic clock polled with the host's monotonic `now_ms`.
///
/// A stopped clock holds no schedule, so stopping discards every tick that
/// was due but not yet delivered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlaybackClock {
    interval_ms: u32,
    next_tick_ms: Option<u64>,
}

impl PlaybackClock {
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: if interval_ms == 0 { 1 } else { interval_ms },
            next_tick_ms: None,
        }
    }

    pub const fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub const fn is_running(&self) -> bool {
        self.next_tick_ms.is_some()
    }

    /// Schedule the first tick one interval after `now_ms`. No-op while running.
    pub fn start(&mut self, now_ms: u64) {
        if self.next_tick_ms.is_none() {
            self.next_tick_ms = Some(now_ms.saturating_add(self.interval_ms as u64));
        }
    }

    pub fn stop(&mut self) {
        self.next_tick_ms = None;
    }

    /// Deliver at most one due tick.
    pub fn poll(&mut self, now_ms: u64) -> Option<Tick> {
        let due_ms = self.next_tick_ms?;
        if now_ms < due_ms {
            return None;
        }

        self.next_tick_ms = Some(due_ms.saturating_add(self.interval_ms as u64));
        Some(Tick { at_ms: due_ms })
    }
}
