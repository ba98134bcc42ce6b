//! Single-shot application timers keyed by uptime milliseconds

use heapless::Vec;

/// Maximum number of pending timers
pub const MAX_TIMERS: usize = 4;

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    QueueFull,
}

/// Handle of a registered timer, used to cancel it
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerId(u32);

struct Entry {
    id: u32,
    deadline: u64,
}

/// Pending single-shot timers
#[derive(Default)]
pub struct TimerQueue {
    entries: Vec<Entry, MAX_TIMERS>,
    next_id: u32,
}

impl TimerQueue {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Arm a timer firing `delay_ms` after `now_ms`.
    pub fn register(&mut self, now_ms: u64, delay_ms: u32) -> Result<TimerId, Error> {
        let id = self.next_id;
        self.entries
            .push(Entry {
                id,
                deadline: now_ms.saturating_add(delay_ms as u64),
            })
            .map_err(|_| Error::QueueFull)?;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(TimerId(id))
    }

    /// Disarm `timer`. Returns `false` when it already fired.
    pub fn cancel(&mut self, timer: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != timer.0);
        self.entries.len() != before
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    /// Remove every timer due at `now_ms` and return how many fired.
    pub fn expire(&mut self, now_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.deadline > now_ms);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
