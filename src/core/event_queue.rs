use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::event::Event;

/// Thread-safe, double-buffered event queue
///
/// Producers call [`EventQueue::push`] from any thread; the frame loop takes
/// everything queued so far with [`EventQueue::drain`] or
/// [`EventQueue::drain_into`]. Cloning yields another handle to the same queue.
///
/// The critical section of every operation is a single push or a buffer swap,
/// so producers never wait on the consumer for longer than that.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    live: Arc<Mutex<Vec<Event>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event to the live buffer
    pub fn push(&self, event: Event) {
        self.lock().push(event);
    }

    /// Take every event pushed since the previous drain, in push order
    ///
    /// Never blocks waiting for events; returns an empty vec when nothing is pending.
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.lock())
    }

    /// Swap the live buffer with `ready`
    ///
    /// `ready` is cleared first and becomes the next live buffer, so both
    /// allocations are reused frame after frame.
    pub fn drain_into(&self, ready: &mut Vec<Event>) {
        ready.clear();
        std::mem::swap(&mut *self.lock(), ready);
    }

    /// Number of events waiting for the next drain
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Events are plain values, a panicking producer cannot leave the buffer torn.
    fn lock(&self) -> MutexGuard<'_, Vec<Event>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
