//! Sliding window of past measurement cycles.
//!
//! Each cycle produces one [`HistoryEntry`] that is inserted at the head of
//! the buffer, pushing older entries toward the tail. Streamed to a strip this
//! makes the readings scroll away from the first pixel.

use crate::color::Rgb;

/// Intensities of one cycle, one per sensor
///
/// Sensor 0 drives the red axis, sensor 1 green and sensor 2 blue.
pub type HistoryEntry = Rgb;

/// Number of sensors folded into one entry
pub const ENTRY_CHANNELS: usize = 3;

/// Build an entry from per-sensor intensities in sensor order
pub const fn entry_from_channels(channels: [u8; ENTRY_CHANNELS]) -> HistoryEntry {
    Rgb {
        r: channels[0],
        g: channels[1],
        b: channels[2],
    }
}

/// Newest-first buffer of at most `C` entries
///
/// Slots that have never been written hold black, so a full frame of `C`
/// pixels can always be streamed.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<const C: usize> {
    entries: [HistoryEntry; C],
    len: usize,
}

impl<const C: usize> HistoryBuffer<C> {
    pub const fn new() -> Self {
        Self {
            entries: [Rgb { r: 0, g: 0, b: 0 }; C],
            len: 0,
        }
    }

    /// Insert `entry` at index 0
    ///
    /// Existing entries move one index up; the entry at index `C - 1` is
    /// discarded.
    pub fn push(&mut self, entry: HistoryEntry) {
        if C == 0 {
            return;
        }
        // the oldest slot wraps to the head and is overwritten
        self.entries.rotate_right(1);
        self.entries[0] = entry;
        self.len = (self.len + 1).min(C);
    }

    /// Stream every slot, newest first
    ///
    /// Calls `stream` exactly `C` times; unwritten slots are black. Index order
    /// equals pixel order on the strip.
    pub fn render<F: FnMut(HistoryEntry)>(&self, mut stream: F) {
        for entry in &self.entries {
            stream(*entry);
        }
    }

    /// Entries pushed so far (up to `C`), newest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries[..self.len]
    }

    /// All `C` slots, newest first
    pub const fn frame(&self) -> &[HistoryEntry; C] {
        &self.entries
    }

    /// Most recent entry
    pub fn newest(&self) -> Option<HistoryEntry> {
        self.entries().first().copied()
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn capacity(&self) -> usize {
        C
    }
}

impl<const C: usize> Default for HistoryBuffer<C> {
    fn default() -> Self {
        Self::new()
    }
}
