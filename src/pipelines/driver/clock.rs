// SPDX-License-Identifier: GPL-3.0-only
//! Refresh-driven scheduling for the pipeline driver
//!
//! The host calls [`FrameClock::take_due`] once per display refresh. The
//! clock holds at most one pending tick, so ticks can never overlap, and a
//! cancelled handle leaves nothing behind to fire later.

use tracing::trace;

/// Handle to a scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    handle: TickHandle,
    /// Refreshes to let pass before the tick is due
    wait: u32,
}

/// Single-slot scheduler counted in display refreshes
#[derive(Debug, Default)]
pub struct FrameClock {
    next_id: u64,
    pending: Option<Pending>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for the next refresh
    ///
    /// Replaces any tick that is already pending.
    pub fn schedule(&mut self) -> TickHandle {
        self.schedule_after(0)
    }

    /// Arm for the refresh after `refreshes` more have passed
    pub fn schedule_after(&mut self, refreshes: u32) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        if let Some(old) = self.pending.replace(Pending {
            handle,
            wait: refreshes,
        }) {
            trace!(replaced = old.handle.0, "Pending tick replaced");
        }
        handle
    }

    /// Cancel a pending tick
    ///
    /// Returns `false` if `handle` is not the pending tick, e.g. because it
    /// already fired.
    pub fn cancel(&mut self, handle: TickHandle) -> bool {
        match self.pending {
            Some(p) if p.handle == handle => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Advance one refresh and hand out the pending tick if it is due
    ///
    /// A handed-out tick is disarmed; whoever runs it re-arms the clock.
    pub fn take_due(&mut self) -> Option<TickHandle> {
        let pending = self.pending.as_mut()?;
        if pending.wait > 0 {
            pending.wait -= 1;
            return None;
        }
        self.pending.take().map(|p| p.handle)
    }

    /// Whether a tick is pending
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unarmed_clock_never_fires() {
        let mut clock = FrameClock::new();
        for _ in 0..5 {
            assert_eq!(clock.take_due(), None);
        }
        assert!(!clock.is_armed());
    }

    #[test]
    fn test_schedule_fires_once() {
        let mut clock = FrameClock::new();
        let handle = clock.schedule();
        assert!(clock.is_armed());
        assert_eq!(clock.take_due(), Some(handle));
        assert!(!clock.is_armed());
        assert_eq!(clock.take_due(), None);
    }

    #[test]
    fn test_schedule_after_waits() {
        let mut clock = FrameClock::new();
        let handle = clock.schedule_after(3);
        for _ in 0..3 {
            assert_eq!(clock.take_due(), None);
            assert!(clock.is_armed());
        }
        assert_eq!(clock.take_due(), Some(handle));
    }

    #[test]
    fn test_single_pending_slot() {
        let mut clock = FrameClock::new();
        let first = clock.schedule_after(10);
        let second = clock.schedule();
        assert_ne!(first, second);
        assert!(!clock.cancel(first));
        assert_eq!(clock.take_due(), Some(second));
    }

    #[test]
    fn test_cancel() {
        let mut clock = FrameClock::new();
        let handle = clock.schedule();
        assert!(clock.cancel(handle));
        assert!(!clock.is_armed());
        assert_eq!(clock.take_due(), None);
        assert!(!clock.cancel(handle));
    }
}
