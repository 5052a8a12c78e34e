//! Single-wire LED strip encoder
//!
//! Every bit is one period `P` on the data line: high for `T1` then low for
//! `P - T1` when the bit is set, high for `T0` then low for `P - T0` when it is
//! clear. Bytes go out most significant bit first, three bytes per pixel in
//! the configured [`ColorOrder`]. After the last pixel the line is held low
//! for at least the latch time so the strip applies the frame.
//!
//! The pixel data is sent inside a critical section: one stretched bit
//! corrupts every color after it. The encoder cannot detect a too-slow pin or
//! delay at runtime. That the `DelayNs` and `OutputPin` in use are fast and
//! precise enough for the strip's tolerance is a precondition, to be checked
//! once per board with a logic analyzer.

use embassy_time::Duration;
use embedded_hal::{delay::DelayNs, digital::OutputPin};
use smart_leds::SmartLedsWrite;

use crate::color::{ColorOrder, Rgb};

/// Waveform timing of the strip's serial protocol
///
/// Strips typically accept a few percent around the nominal values; consult
/// the datasheet of the exact model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireTiming {
    /// Total length of one bit (`P`)
    pub bit_period_ns: u32,
    /// High time of a `1` bit (`T1`)
    pub t1_high_ns: u32,
    /// High time of a `0` bit (`T0`)
    pub t0_high_ns: u32,
    /// Minimum low hold after a frame
    pub latch: Duration,
}

impl WireTiming {
    /// Nominal WS2812B timing
    pub const WS2812: Self = Self {
        bit_period_ns: 1250,
        t1_high_ns: 800,
        t0_high_ns: 400,
        latch: Duration::from_micros(50),
    };

    /// High phase of a bit
    pub const fn high_ns(&self, bit: bool) -> u32 {
        if bit { self.t1_high_ns } else { self.t0_high_ns }
    }

    /// Low phase of a bit, the rest of the period
    pub const fn low_ns(&self, bit: bool) -> u32 {
        self.bit_period_ns.saturating_sub(self.high_ns(bit))
    }

    /// Wire time of a frame of `pixels` pixels, latch included
    pub fn frame_ns(&self, pixels: usize) -> u64 {
        let bits = pixels as u64 * 24;
        bits * u64::from(self.bit_period_ns) + self.latch.as_micros() * 1000
    }

    /// `T1 > T0` and both fit in the period
    pub const fn is_valid(&self) -> bool {
        self.t0_high_ns < self.t1_high_ns && self.t1_high_ns < self.bit_period_ns
    }
}

impl Default for WireTiming {
    fn default() -> Self {
        Self::WS2812
    }
}

/// Bit-banged strip driver
pub struct TimingEncoder<P, D> {
    pin: P,
    delay: D,
    timing: WireTiming,
    order: ColorOrder,
}

impl<P, D> TimingEncoder<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    pub const fn new(pin: P, delay: D, timing: WireTiming, order: ColorOrder) -> Self {
        Self {
            pin,
            delay,
            timing,
            order,
        }
    }

    pub const fn timing(&self) -> &WireTiming {
        &self.timing
    }

    pub const fn order(&self) -> ColorOrder {
        self.order
    }

    /// Send pixels and latch them
    ///
    /// Interrupts are masked while the pixel data is on the wire.
    pub fn write_frame<I>(&mut self, pixels: I) -> Result<(), P::Error>
    where
        I: IntoIterator<Item = Rgb>,
    {
        critical_section::with(|_| {
            for pixel in pixels {
                self.send_pixel(pixel)?;
            }
            Ok::<(), P::Error>(())
        })?;
        // the latch only has a lower bound, interrupts may stretch it
        self.latch()
    }

    /// Send the three bytes of one pixel
    pub fn send_pixel(&mut self, pixel: Rgb) -> Result<(), P::Error> {
        for byte in self.order.bytes(pixel) {
            self.send_byte(byte)?;
        }
        Ok(())
    }

    /// Send one byte, MSB first
    pub fn send_byte(&mut self, byte: u8) -> Result<(), P::Error> {
        for shift in (0..8).rev() {
            self.send_bit((byte >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    fn send_bit(&mut self, bit: bool) -> Result<(), P::Error> {
        self.pin.set_high()?;
        self.delay.delay_ns(self.timing.high_ns(bit));
        self.pin.set_low()?;
        self.delay.delay_ns(self.timing.low_ns(bit));
        Ok(())
    }

    /// Hold the line low long enough for the strip to apply the frame
    pub fn latch(&mut self) -> Result<(), P::Error> {
        self.pin.set_low()?;
        let micros = u32::try_from(self.timing.latch.as_micros()).unwrap_or(u32::MAX);
        self.delay.delay_us(micros);
        Ok(())
    }

    /// Release the pin and delay
    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

impl<P, D> SmartLedsWrite for TimingEncoder<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    type Error = P::Error;
    type Color = Rgb;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.write_frame(iterator.into_iter().map(Into::into))
    }
}
