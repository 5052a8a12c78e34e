//! One measure-and-render cycle
//!
//! [`SonarCycle`] measures the three sensors, appends their intensities to
//! the history and redraws the strip. [`Heartbeat`] blinks a status pin every
//! few cycles so a stalled loop is visible on the board.

use embassy_time::Duration;
use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorKind, StatefulOutputPin},
};
use smart_leds::SmartLedsWrite;

use crate::color::Rgb;
use crate::hal::TickCounter;
use crate::history::{ENTRY_CHANNELS, HistoryBuffer, HistoryEntry, entry_from_channels};
use crate::sampler::{DistanceSampler, EchoChannel, SamplerConfig};
use crate::scheduler::DEFAULT_CYCLE_PERIOD;

/// Default number of cycles between heartbeat toggles
pub const DEFAULT_HEARTBEAT_PERIOD: u16 = 20;

/// Configuration of the measure-and-render loop
#[derive(Debug, Clone, Copy)]
pub struct CycleConfig {
    pub sampler: SamplerConfig,
    /// Cycles between heartbeat toggles
    pub heartbeat_period: u16,
    /// Target time between cycle starts
    pub period: Duration,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerConfig::default(),
            heartbeat_period: DEFAULT_HEARTBEAT_PERIOD,
            period: DEFAULT_CYCLE_PERIOD,
        }
    }
}

/// Failure of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleError<E> {
    /// Pin access of sensor `index` failed
    Sensor { index: usize, kind: ErrorKind },
    /// The strip driver failed
    Strip(E),
}

/// Measure-and-render loop step
///
/// Owns the sampler and the history shown on a strip of `LEDS` pixels.
pub struct SonarCycle<C, D, const LEDS: usize> {
    sampler: DistanceSampler<C, D>,
    history: HistoryBuffer<LEDS>,
    cycles: u32,
}

impl<C, D, const LEDS: usize> SonarCycle<C, D, LEDS>
where
    C: TickCounter,
    D: DelayNs,
{
    pub const fn new(counter: C, delay: D, config: &CycleConfig) -> Self {
        Self {
            sampler: DistanceSampler::new(counter, delay, config.sampler),
            history: HistoryBuffer::new(),
            cycles: 0,
        }
    }

    /// Run one cycle
    ///
    /// Measures the sensors one after another in array order, pushes their
    /// intensities as a new history entry (sensor 0 red, 1 green, 2 blue) and
    /// streams the whole history to `strip`, newest entry on the first pixel.
    pub fn run<W>(
        &mut self,
        sensors: [&mut dyn EchoChannel; ENTRY_CHANNELS],
        strip: &mut W,
    ) -> Result<HistoryEntry, CycleError<W::Error>>
    where
        W: SmartLedsWrite<Color = Rgb>,
    {
        let mut intensities = [0u8; ENTRY_CHANNELS];
        for (index, (sensor, slot)) in sensors.into_iter().zip(&mut intensities).enumerate() {
            let measurement = self
                .sampler
                .measure(sensor)
                .map_err(|kind| CycleError::Sensor { index, kind })?;
            *slot = measurement.intensity;
        }

        let entry = entry_from_channels(intensities);
        self.history.push(entry);
        strip
            .write(self.history.frame().iter().copied())
            .map_err(CycleError::Strip)?;

        self.cycles = self.cycles.wrapping_add(1);
        Ok(entry)
    }

    pub const fn history(&self) -> &HistoryBuffer<LEDS> {
        &self.history
    }

    pub const fn sampler(&self) -> &DistanceSampler<C, D> {
        &self.sampler
    }

    /// Completed cycles, wrapping
    pub const fn cycles(&self) -> u32 {
        self.cycles
    }
}

/// Status indicator toggled every `period` cycles
pub struct Heartbeat<P> {
    pin: P,
    period: u16,
    count: u16,
}

impl<P: StatefulOutputPin> Heartbeat<P> {
    pub const fn new(pin: P, period: u16) -> Self {
        Self {
            pin,
            period,
            count: 0,
        }
    }

    /// Heartbeat toggling every `config.heartbeat_period` cycles
    pub const fn from_config(pin: P, config: &CycleConfig) -> Self {
        Self::new(pin, config.heartbeat_period)
    }

    pub const fn period(&self) -> u16 {
        self.period
    }

    /// Count one cycle, toggling the pin when the period is reached
    ///
    /// Returns whether the pin was toggled.
    pub fn beat(&mut self) -> Result<bool, P::Error> {
        self.count = self.count.saturating_add(1);
        if self.count < self.period {
            return Ok(false);
        }
        self.count = 0;
        self.pin.toggle()?;
        Ok(true)
    }

    pub fn release(self) -> P {
        self.pin
    }
}
