//! Sample filters applied to measured intensities.

/// Fixed-window arithmetic mean filter
///
/// The window always holds exactly `N` samples. It starts out filled with
/// zeros, so the first `N - 1` outputs are biased toward zero until the window
/// has been replaced by real samples.
#[derive(Debug, Clone)]
pub struct MovingAverage<const N: usize> {
    /// Newest sample first
    window: [f32; N],
}

impl<const N: usize> MovingAverage<N> {
    const NON_EMPTY: () = assert!(N > 0, "moving average window must not be empty");

    /// Create a zero-filled window
    pub const fn new() -> Self {
        let () = Self::NON_EMPTY;
        Self { window: [0.0; N] }
    }

    /// Insert `value` at the front of the window, dropping the oldest sample
    ///
    /// Returns the mean of all `N` samples including the new one.
    pub fn add(&mut self, value: f32) -> f32 {
        self.window.copy_within(0..N - 1, 1);
        self.window[0] = value;
        self.mean()
    }

    /// Mean of the current window
    ///
    /// Accumulated in `f64`, so a window of identical samples averages to
    /// exactly that sample.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn mean(&self) -> f32 {
        let sum: f64 = self.window.iter().copied().map(f64::from).sum();
        (sum / N as f64) as f32
    }

    /// Samples in the window, newest first
    pub const fn samples(&self) -> &[f32; N] {
        &self.window
    }

    /// Number of samples in the window
    pub const fn window_len(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for MovingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}
