//! Bounded queue of debounce events.
//!
//! Lets the debouncer hand state changes to the main loop instead of acting
//! on them inside `tick`. Access is guarded by critical sections, so a tick
//! running from a timer interrupt may push while the main loop drains.

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use heapless::Deque;

use super::{ChangeHandler, ChannelId};

/// A latched state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceEvent {
    pub channel: ChannelId,
    /// Effective (invert-adjusted) state after the change
    pub state: bool,
}

/// Fixed-capacity FIFO of [`DebounceEvent`]s
///
/// Events pushed while the queue is full are dropped and counted.
pub struct EventQueue<const SIZE: usize> {
    events: Mutex<RefCell<Deque<DebounceEvent, SIZE>>>,
    dropped: Mutex<Cell<u32>>,
}

impl<const SIZE: usize> EventQueue<SIZE> {
    pub const fn new() -> Self {
        Self {
            events: Mutex::new(RefCell::new(Deque::new())),
            dropped: Mutex::new(Cell::new(0)),
        }
    }

    /// Append an event
    ///
    /// Returns `Err(event)` if the queue is full.
    pub fn push(&self, event: DebounceEvent) -> Result<(), DebounceEvent> {
        critical_section::with(|cs| self.events.borrow(cs).borrow_mut().push_back(event))
    }

    /// Take the oldest event
    pub fn pop(&self) -> Option<DebounceEvent> {
        critical_section::with(|cs| self.events.borrow(cs).borrow_mut().pop_front())
    }

    /// Number of events dropped because the queue was full
    pub fn dropped(&self) -> u32 {
        critical_section::with(|cs| self.dropped.borrow(cs).get())
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.events.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for EventQueue<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> ChangeHandler for EventQueue<SIZE> {
    fn on_change(&self, channel: ChannelId, state: bool) {
        if self.push(DebounceEvent { channel, state }).is_err() {
            critical_section::with(|cs| {
                let dropped = self.dropped.borrow(cs);
                dropped.set(dropped.get().saturating_add(1));
            });
        }
    }
}
