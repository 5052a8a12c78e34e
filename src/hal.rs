//! Hardware capabilities the core is written against.
//!
//! Pins and delays come from `embedded-hal`; the two traits here cover what
//! `embedded-hal` has no abstraction for.

use core::cell::RefCell;

use embedded_hal::digital::InputPin;

/// Free-running hardware counter used to time echo pulses
///
/// One tick is a fixed sub-microsecond unit reported by [`TickCounter::tick_ns`].
pub trait TickCounter {
    /// Set the count to zero without changing the running state
    fn reset(&mut self);

    /// Start counting
    fn start(&mut self);

    /// Stop counting, freezing the current value
    fn stop(&mut self);

    /// Current count in ticks
    fn value(&mut self) -> u32;

    /// Length of one tick in nanoseconds
    fn tick_ns(&self) -> u32;
}

/// Input port holding up to eight digital levels
///
/// Debounced channels keep a reference to a port plus a bit mask, so several
/// channels can share one register.
pub trait PortRead {
    /// Read the raw port value
    fn read(&self) -> u8;
}

/// Single [`InputPin`] exposed as a port with the level on bit 0
///
/// A failed read is reported as a low level.
pub struct PinPort<P> {
    pin: RefCell<P>,
}

impl<P: InputPin> PinPort<P> {
    pub const fn new(pin: P) -> Self {
        Self {
            pin: RefCell::new(pin),
        }
    }

    /// Release the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin.into_inner()
    }
}

impl<P: InputPin> PortRead for PinPort<P> {
    fn read(&self) -> u8 {
        let high = self.pin.borrow_mut().is_high().unwrap_or(false);
        u8::from(high)
    }
}
