//! Debounced digital inputs
//!
//! A [`Debouncer`] watches a fixed number of input channels. Each call to
//! [`Debouncer::tick`] samples every channel once; a channel's latched state
//! only follows the raw level after `threshold` consecutive mismatching
//! samples. Debounce time is therefore `threshold` times the period at which
//! the caller invokes `tick`.

mod events;

#[cfg(feature = "esp32-log")]
use esp_println::println;
use heapless::Vec;

use crate::hal::PortRead;

pub use events::{DebounceEvent, EventQueue};

/// Default number of consecutive ticks before a new level is latched
pub const DEFAULT_THRESHOLD: u8 = 20;

/// Identifier of a registered channel
///
/// Assigned in registration order starting at zero and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(usize);

impl ChannelId {
    /// Position of the channel in registration order
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Receives latched state changes
///
/// Called synchronously from [`Debouncer::tick`] with the effective
/// (invert-adjusted) state. The debouncer is mutably borrowed for the whole
/// tick, so a handler cannot re-enter it.
pub trait ChangeHandler {
    fn on_change(&self, channel: ChannelId, state: bool);
}

/// Error returned when a channel cannot be registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    /// Every channel slot is already taken
    CapacityExceeded,
    /// The bit index does not fit in a port byte
    InvalidBit(u8),
}

#[derive(Debug, Clone, Copy)]
pub struct DebounceConfig {
    /// Consecutive mismatching ticks required to latch a new level
    ///
    /// Zero is allowed but degenerate: the state then follows the first
    /// observed change immediately.
    pub threshold: u8,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

struct DebounceChannel<'a> {
    source: &'a dyn PortRead,
    mask: u8,
    invert: bool,
    /// Consecutive ticks the raw level differed from `state`
    count: u8,
    /// Latched raw level
    state: bool,
    handler: Option<&'a dyn ChangeHandler>,
}

impl DebounceChannel<'_> {
    fn raw_level(&self) -> bool {
        self.source.read() & self.mask != 0
    }

    const fn effective(&self) -> bool {
        self.state ^ self.invert
    }
}

/// Debouncer for up to `CHANNELS` inputs
pub struct Debouncer<'a, const CHANNELS: usize> {
    channels: Vec<DebounceChannel<'a>, CHANNELS>,
    threshold: u8,
}

impl<'a, const CHANNELS: usize> Debouncer<'a, CHANNELS> {
    pub const fn new(config: DebounceConfig) -> Self {
        Self {
            channels: Vec::new(),
            threshold: config.threshold,
        }
    }

    /// Register bit `bit` of `source` as a new channel
    ///
    /// The latched state starts at the level read during registration.
    /// With `invert` set the channel reports `true` while the line is low.
    /// Exceeding the capacity is a configuration error; callers should treat
    /// it as fatal during initialization.
    pub fn register(
        &mut self,
        source: &'a dyn PortRead,
        bit: u8,
        invert: bool,
        handler: Option<&'a dyn ChangeHandler>,
    ) -> Result<ChannelId, RegisterError> {
        let mask = 1u8
            .checked_shl(u32::from(bit))
            .ok_or(RegisterError::InvalidBit(bit))?;

        let mut channel = DebounceChannel {
            source,
            mask,
            invert,
            count: 0,
            state: false,
            handler,
        };
        channel.state = channel.raw_level();

        let id = ChannelId(self.channels.len());
        if self.channels.push(channel).is_err() {
            #[cfg(feature = "esp32-log")]
            println!(
                "[Debouncer.register] no free slot, capacity is {}",
                CHANNELS
            );
            return Err(RegisterError::CapacityExceeded);
        }
        Ok(id)
    }

    /// Sample every registered channel once
    pub fn tick(&mut self) {
        for (index, channel) in self.channels.iter_mut().enumerate() {
            let raw = channel.raw_level();
            if raw == channel.state {
                channel.count = 0;
                continue;
            }

            channel.count = channel.count.saturating_add(1);
            if channel.count < self.threshold {
                continue;
            }

            channel.state = raw;
            channel.count = 0;
            if let Some(handler) = channel.handler {
                handler.on_change(ChannelId(index), channel.effective());
            }
        }
    }

    /// Latched effective state of a channel
    ///
    /// Returns `None` for an id this debouncer never issued.
    pub fn get(&self, channel: ChannelId) -> Option<bool> {
        self.channels.get(channel.0).map(DebounceChannel::effective)
    }

    /// Number of registered channels
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        CHANNELS
    }

    pub const fn threshold(&self) -> u8 {
        self.threshold
    }
}
