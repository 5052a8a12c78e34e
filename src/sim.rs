//! Simulated hardware
//!
//! Deterministic stand-ins for the capabilities the core runs on. Everything
//! shares one [`SimClock`] that only moves when a delay runs or the counter is
//! polled, so tests reproduce exact edge timings without wall-clock waits.

use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin},
};
use heapless::Vec;

use crate::hal::{PortRead, TickCounter};

/// Simulated time in nanoseconds
#[derive(Debug, Default)]
pub struct SimClock {
    now_ns: Cell<u64>,
}

impl SimClock {
    pub const fn new() -> Self {
        Self {
            now_ns: Cell::new(0),
        }
    }

    pub fn now_ns(&self) -> u64 {
        self.now_ns.get()
    }

    pub fn advance_ns(&self, ns: u64) {
        self.now_ns.set(self.now_ns.get().saturating_add(ns));
    }
}

/// Delay that advances the clock instead of waiting
pub struct SimDelay<'a> {
    clock: &'a SimClock,
}

impl<'a> SimDelay<'a> {
    pub const fn new(clock: &'a SimClock) -> Self {
        Self { clock }
    }
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance_ns(u64::from(ns));
    }
}

/// Free-running counter over the simulated clock
///
/// Every `value` call while running advances the clock by `poll_ns`, which
/// stands in for the time one polling iteration takes.
pub struct SimCounter<'a> {
    clock: &'a SimClock,
    tick_ns: u32,
    poll_ns: u32,
    base_ns: u64,
    frozen: u32,
    running: bool,
}

impl<'a> SimCounter<'a> {
    pub const fn new(clock: &'a SimClock, tick_ns: u32, poll_ns: u32) -> Self {
        Self {
            clock,
            tick_ns,
            poll_ns,
            base_ns: 0,
            frozen: 0,
            running: false,
        }
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    fn count(&self) -> u32 {
        let elapsed = self.clock.now_ns().saturating_sub(self.base_ns);
        let ticks = elapsed / u64::from(self.tick_ns.max(1));
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}

impl TickCounter for SimCounter<'_> {
    fn reset(&mut self) {
        self.base_ns = self.clock.now_ns();
        self.frozen = 0;
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.frozen = self.count();
        self.running = false;
    }

    fn value(&mut self) -> u32 {
        if !self.running {
            return self.frozen;
        }
        self.clock.advance_ns(u64::from(self.poll_ns));
        self.count()
    }

    fn tick_ns(&self) -> u32 {
        self.tick_ns
    }
}

/// Echo the simulated sensor answers a trigger with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoProfile {
    /// From the falling trigger edge to the rising echo edge
    pub delay_ns: u64,
    /// Width of the echo pulse
    pub width_ns: u64,
}

/// Ultrasonic sensor with a trigger input and an echo output
///
/// The echo line goes high `delay_ns` after the trigger pulse ends and stays
/// high for `width_ns`. Without a profile it never goes high.
pub struct SimSonar<'a> {
    clock: &'a SimClock,
    echo: Cell<Option<EchoProfile>>,
    trigger_high: Cell<bool>,
    fired_at: Cell<Option<u64>>,
    triggers: Cell<u32>,
}

impl<'a> SimSonar<'a> {
    pub const fn new(clock: &'a SimClock, echo: Option<EchoProfile>) -> Self {
        Self {
            clock,
            echo: Cell::new(echo),
            trigger_high: Cell::new(false),
            fired_at: Cell::new(None),
            triggers: Cell::new(0),
        }
    }

    /// Change the echo returned for the next triggers
    pub fn set_echo(&self, echo: Option<EchoProfile>) {
        self.echo.set(echo);
    }

    /// Number of complete trigger pulses seen
    pub fn triggers(&self) -> u32 {
        self.triggers.get()
    }

    pub fn trigger(&self) -> SimTrigger<'_> {
        SimTrigger { sonar: self }
    }

    pub fn echo(&self) -> SimEcho<'_> {
        SimEcho { sonar: self }
    }

    fn echo_level(&self) -> bool {
        let (Some(fired_at), Some(echo)) = (self.fired_at.get(), self.echo.get()) else {
            return false;
        };
        let rise = fired_at.saturating_add(echo.delay_ns);
        let fall = rise.saturating_add(echo.width_ns);
        (rise..fall).contains(&self.clock.now_ns())
    }
}

/// Trigger input of a [`SimSonar`]
pub struct SimTrigger<'a> {
    sonar: &'a SimSonar<'a>,
}

impl ErrorType for SimTrigger<'_> {
    type Error = Infallible;
}

impl OutputPin for SimTrigger<'_> {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.sonar.trigger_high.set(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.sonar.trigger_high.replace(false) {
            self.sonar.fired_at.set(Some(self.sonar.clock.now_ns()));
            self.sonar.triggers.set(self.sonar.triggers.get() + 1);
        }
        Ok(())
    }
}

/// Echo output of a [`SimSonar`]
pub struct SimEcho<'a> {
    sonar: &'a SimSonar<'a>,
}

impl ErrorType for SimEcho<'_> {
    type Error = Infallible;
}

impl InputPin for SimEcho<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.sonar.echo_level())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.sonar.echo_level())
    }
}

/// Level change recorded by a [`SimLine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub high: bool,
    pub at_ns: u64,
}

/// High phase and following low phase of one pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub high_ns: u64,
    pub low_ns: u64,
}

/// Output line recording up to `N` level changes
///
/// Starts low. Edges beyond `N` are dropped and flagged.
pub struct SimLine<'a, const N: usize> {
    clock: &'a SimClock,
    level: bool,
    edges: Vec<Edge, N>,
    overflowed: bool,
}

impl<'a, const N: usize> SimLine<'a, N> {
    pub const fn new(clock: &'a SimClock) -> Self {
        Self {
            clock,
            level: false,
            edges: Vec::new(),
            overflowed: false,
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub const fn level(&self) -> bool {
        self.level
    }

    pub const fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn clear(&mut self) {
        self.edges.clear();
        self.overflowed = false;
    }

    /// Pulses in order; the last low phase runs until the current time
    pub fn pulses(&self) -> impl Iterator<Item = Pulse> + '_ {
        let edges = self.edges.as_slice();
        let end = self.clock.now_ns();
        edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| edge.high)
            .map(move |(index, rise)| {
                let fall = edges.get(index + 1).map_or(end, |edge| edge.at_ns);
                let next = edges.get(index + 2).map_or(end, |edge| edge.at_ns);
                Pulse {
                    high_ns: fall - rise.at_ns,
                    low_ns: next - fall,
                }
            })
    }

    fn drive(&mut self, high: bool) {
        if self.level == high {
            return;
        }
        self.level = high;
        let edge = Edge {
            high,
            at_ns: self.clock.now_ns(),
        };
        if self.edges.push(edge).is_err() {
            self.overflowed = true;
        }
    }
}

impl<const N: usize> ErrorType for SimLine<'_, N> {
    type Error = Infallible;
}

impl<const N: usize> OutputPin for SimLine<'_, N> {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }
}

impl<const N: usize> StatefulOutputPin for SimLine<'_, N> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level)
    }
}

/// Input port whose value the test sets directly
#[derive(Debug, Default)]
pub struct SimPort {
    value: Cell<u8>,
}

impl SimPort {
    pub const fn new(value: u8) -> Self {
        Self {
            value: Cell::new(value),
        }
    }

    pub fn set(&self, value: u8) {
        self.value.set(value);
    }

    pub fn set_bit(&self, bit: u8, high: bool) {
        let mask = 1u8 << (bit & 7);
        let value = self.value.get();
        self.value.set(if high { value | mask } else { value & !mask });
    }
}

impl PortRead for SimPort {
    fn read(&self) -> u8 {
        self.value.get()
    }
}
