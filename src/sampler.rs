//! Ultrasonic distance sampling
//!
//! Each measurement fires a trigger pulse and times the echo pulse with a
//! free-running [`TickCounter`]. The echo width is converted to an intensity
//! in `0..=max` (closer objects are brighter) and smoothed by the channel's
//! own [`MovingAverage`].
//!
//! Measurement busy-waits. A call blocks for the settle delay plus the echo
//! round trip, or the configured timeout when no echo arrives. There is no
//! cancellation, so callers must budget for the worst case. Sensors must be
//! measured one after another: overlapping pulses produce false echoes on the
//! neighbouring sensors.

use embassy_time::Duration;
use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, ErrorKind, InputPin, OutputPin},
};
#[cfg(feature = "esp32-log")]
use esp_println::println;
use libm::{fmaxf, fminf, roundf};

use crate::filter::MovingAverage;
use crate::hal::TickCounter;

/// Default averaging window of a sonar channel
pub const DEFAULT_WINDOW: usize = 16;

/// Conversion from echo width to intensity
///
/// `intensity = clamp(max - elapsed / ticks_per_step, 0, max)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityScale {
    /// Intensity at zero distance
    pub max: u8,
    /// Echo ticks per intensity step; sets the sensitivity
    pub ticks_per_step: f32,
}

impl IntensityScale {
    /// Unsmoothed intensity for an echo width in ticks
    ///
    /// A non-positive or NaN `ticks_per_step` maps any echo to zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn intensity(&self, elapsed_ticks: u32) -> f32 {
        if self.ticks_per_step.is_nan() || self.ticks_per_step <= 0.0 {
            return 0.0;
        }
        let max = f32::from(self.max);
        let steps = elapsed_ticks as f32 / self.ticks_per_step;
        // fmaxf drops NaN, fminf caps infinities
        fminf(fmaxf(max - steps, 0.0), max)
    }

    /// Round a (smoothed) intensity to the output range
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn quantize(&self, value: f32) -> u8 {
        roundf(fminf(fmaxf(value, 0.0), f32::from(self.max))) as u8
    }
}

impl Default for IntensityScale {
    fn default() -> Self {
        Self {
            max: 255,
            ticks_per_step: 31.25,
        }
    }
}

/// Sampler timing and conversion settings
///
/// The defaults suit an HC-SR04 timed by a 0.5 µs counter.
#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    /// Quiet time before each trigger pulse so earlier echoes die out
    pub settle: Duration,
    /// Width of the trigger pulse
    pub trigger_pulse: Duration,
    /// Counter value at which a measurement is abandoned
    ///
    /// Also the elapsed value reported for a timed-out measurement.
    pub timeout_ticks: u32,
    pub scale: IntensityScale,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(6),
            trigger_pulse: Duration::from_micros(10),
            timeout_ticks: 15_000,
            scale: IntensityScale::default(),
        }
    }
}

/// Echo timing state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    WaitRisingEdge,
    WaitFallingEdge { start: u32 },
    Done { elapsed: u32 },
    Timeout,
}

/// Outcome of one measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Echo width in ticks, or the timeout value
    pub elapsed_ticks: u32,
    /// No complete echo was seen before the timeout
    pub timed_out: bool,
    /// Intensity before smoothing
    pub raw_intensity: f32,
    /// Smoothed and rounded intensity
    pub intensity: u8,
}

/// One sensor as seen by the sampler
///
/// Object safe, so sensors with different pin types can be measured in one
/// loop.
pub trait EchoChannel {
    fn set_trigger(&mut self, high: bool) -> Result<(), ErrorKind>;

    fn echo_is_high(&mut self) -> Result<bool, ErrorKind>;

    /// Feed an intensity through the channel's filter
    fn smooth(&mut self, intensity: f32) -> f32;
}

/// Trigger pin, echo pin and averaging window of one sensor
pub struct SonarChannel<TRIG, ECHO, const N: usize = DEFAULT_WINDOW> {
    trigger: TRIG,
    echo: ECHO,
    average: MovingAverage<N>,
}

impl<TRIG, ECHO, const N: usize> SonarChannel<TRIG, ECHO, N>
where
    TRIG: OutputPin,
    ECHO: InputPin,
{
    /// Both pins must already be configured; the echo input preferably with
    /// a pull-up.
    pub const fn new(trigger: TRIG, echo: ECHO) -> Self {
        Self {
            trigger,
            echo,
            average: MovingAverage::new(),
        }
    }

    pub const fn average(&self) -> &MovingAverage<N> {
        &self.average
    }

    /// Release the pins
    pub fn release(self) -> (TRIG, ECHO) {
        (self.trigger, self.echo)
    }
}

impl<TRIG, ECHO, const N: usize> EchoChannel for SonarChannel<TRIG, ECHO, N>
where
    TRIG: OutputPin,
    ECHO: InputPin,
{
    fn set_trigger(&mut self, high: bool) -> Result<(), ErrorKind> {
        let result = if high {
            self.trigger.set_high()
        } else {
            self.trigger.set_low()
        };
        result.map_err(|e| e.kind())
    }

    fn echo_is_high(&mut self) -> Result<bool, ErrorKind> {
        self.echo.is_high().map_err(|e| e.kind())
    }

    fn smooth(&mut self, intensity: f32) -> f32 {
        self.average.add(intensity)
    }
}

/// Drives the trigger/echo protocol using the shared hardware counter
///
/// `measure` takes `&mut self`, so measurements through one sampler never
/// overlap.
pub struct DistanceSampler<C, D> {
    counter: C,
    delay: D,
    config: SamplerConfig,
}

impl<C, D> DistanceSampler<C, D>
where
    C: TickCounter,
    D: DelayNs,
{
    pub const fn new(counter: C, delay: D, config: SamplerConfig) -> Self {
        Self {
            counter,
            delay,
            config,
        }
    }

    pub const fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Measure one sensor
    ///
    /// A missing echo is not an error: it yields `elapsed_ticks ==
    /// timeout_ticks` and the matching (minimum) intensity. Only pin access
    /// failures are reported as errors.
    pub fn measure<S>(&mut self, channel: &mut S) -> Result<Measurement, ErrorKind>
    where
        S: EchoChannel + ?Sized,
    {
        delay_for(&mut self.delay, self.config.settle);
        channel.set_trigger(true)?;
        delay_for(&mut self.delay, self.config.trigger_pulse);
        channel.set_trigger(false)?;

        self.counter.reset();
        self.counter.start();
        let phase = self.time_echo(channel);
        self.counter.stop();

        let (elapsed_ticks, timed_out) = match phase? {
            Phase::Done { elapsed } => (elapsed, false),
            _ => (self.config.timeout_ticks, true),
        };

        if timed_out {
            #[cfg(feature = "esp32-log")]
            println!(
                "[DistanceSampler.measure] no echo within {} ticks",
                self.config.timeout_ticks
            );
        }

        let raw_intensity = self.config.scale.intensity(elapsed_ticks);
        let smoothed = channel.smooth(raw_intensity);

        Ok(Measurement {
            elapsed_ticks,
            timed_out,
            raw_intensity,
            intensity: self.config.scale.quantize(smoothed),
        })
    }

    /// Poll the echo line until the pulse ends or the counter hits the timeout
    fn time_echo<S>(&mut self, channel: &mut S) -> Result<Phase, ErrorKind>
    where
        S: EchoChannel + ?Sized,
    {
        let mut phase = Phase::WaitRisingEdge;
        while !matches!(phase, Phase::Done { .. } | Phase::Timeout) {
            let now = self.counter.value();
            phase = match phase {
                _ if now >= self.config.timeout_ticks => Phase::Timeout,
                Phase::WaitRisingEdge if channel.echo_is_high()? => {
                    Phase::WaitFallingEdge { start: now }
                }
                Phase::WaitFallingEdge { start } if !channel.echo_is_high()? => Phase::Done {
                    elapsed: now.saturating_sub(start),
                },
                waiting => waiting,
            };
        }
        Ok(phase)
    }
}

fn delay_for<D: DelayNs>(delay: &mut D, duration: Duration) {
    let micros = u32::try_from(duration.as_micros()).unwrap_or(u32::MAX);
    delay.delay_us(micros);
}
