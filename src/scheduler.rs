//! Cycle pacing.
//!
//! A cycle takes longer for far objects than for near ones, so running cycles
//! back to back makes the history scroll at a distance-dependent speed. The
//! scheduler returns how long to wait so cycles start at a fixed period.
//! The caller does the actual sleeping.

use embassy_time::{Duration, Instant};
#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::cycle::CycleConfig;

/// Default time between cycle starts (20 cycles per second)
pub const DEFAULT_CYCLE_PERIOD: Duration = Duration::from_millis(50);

/// When the next cycle should start
#[derive(Debug, Clone, Copy)]
pub struct CycleTiming {
    /// The deadline for the next cycle
    pub next_deadline: Instant,
    /// How long to wait until the next cycle (zero if behind schedule)
    pub sleep_duration: Duration,
}

/// Fixed-period pacing with drift correction
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = CycleScheduler::from_config(&config);
///
/// loop {
///     cycle.run(sensors, &mut strip)?;
///     let timing = scheduler.tick(Instant::now());
///     Timer::after(timing.sleep_duration).await;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CycleScheduler {
    next_cycle: Instant,
    period: Duration,
}

impl CycleScheduler {
    pub const fn new(period: Duration) -> Self {
        Self {
            next_cycle: Instant::from_ticks(0),
            period,
        }
    }

    /// Scheduler pacing cycles at `config.period`
    pub const fn from_config(config: &CycleConfig) -> Self {
        Self::new(config.period)
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Account for a finished cycle and compute the next deadline
    ///
    /// After falling more than two periods behind, the schedule restarts from
    /// `now` instead of running the missed cycles back to back.
    pub fn tick(&mut self, now: Instant) -> CycleTiming {
        let max_drift = self.period + self.period;
        if now > self.next_cycle + max_drift {
            #[cfg(feature = "esp32-log")]
            println!(
                "[CycleScheduler.tick] {} ms behind, restarting schedule",
                now.duration_since(self.next_cycle).as_millis()
            );
            self.next_cycle = now;
        }

        self.next_cycle += self.period;

        let sleep_duration = self
            .next_cycle
            .checked_duration_since(now)
            .unwrap_or(Duration::from_ticks(0));

        CycleTiming {
            next_deadline: self.next_cycle,
            sleep_duration,
        }
    }
}

impl Default for CycleScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_PERIOD)
    }
}
