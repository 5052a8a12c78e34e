#![no_std]

pub mod color;
pub mod cycle;
pub mod debounce;
pub mod encoder;
pub mod filter;
pub mod hal;
pub mod history;
pub mod sampler;
pub mod scheduler;
pub mod sim;

pub use cycle::{CycleConfig, CycleError, Heartbeat, SonarCycle};
pub use debounce::{
    ChangeHandler, ChannelId, DebounceConfig, DebounceEvent, Debouncer, EventQueue,
    RegisterError,
};
pub use encoder::{TimingEncoder, WireTiming};
pub use filter::MovingAverage;
pub use hal::{PinPort, PortRead, TickCounter};
pub use history::{HistoryBuffer, HistoryEntry};
pub use sampler::{
    DistanceSampler, EchoChannel, IntensityScale, Measurement, SamplerConfig, SonarChannel,
};
pub use scheduler::{CycleScheduler, CycleTiming};

pub use color::{ColorOrder, Rgb};
pub use embassy_time::{Duration, Instant};
