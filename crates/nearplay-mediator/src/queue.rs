//! Thread-safe deferred event buffer.

use std::sync::Mutex;

use nearplay_native::NativeEvent;

/// Buffer decoupling the native callback thread(s) from the consumer thread.
///
/// Any number of native threads may push concurrently; a single consumer
/// drains once per tick. One mutex protects the buffer, held only for the
/// append (push) or the swap (drain) — dispatch happens outside the lock.
/// Dispatch order equals push order: first in, first out.
#[derive(Default)]
pub struct EventQueue {
    buffered: Mutex<Vec<NativeEvent>>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. Callable from any thread; never blocks beyond the
    /// append itself.
    pub fn push(&self, event: NativeEvent) {
        self.buffered.lock().unwrap().push(event);
    }

    /// Take all events buffered so far, in push order.
    ///
    /// Swap-and-clear under the lock; events pushed while the returned batch
    /// is being dispatched land in the next drain.
    #[must_use]
    pub fn drain(&self) -> Vec<NativeEvent> {
        std::mem::take(&mut *self.buffered.lock().unwrap())
    }

    /// Number of currently buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffered.lock().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
