pub mod clock;
pub mod config;
pub mod events;
pub mod meter;
pub mod names;
pub mod service;
pub mod tracker;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{ConfigError, MeterConfig, MeterConfigExt};
pub use events::{MeterEvent, TimedEvent};
pub use meter::{DisplaySink, DpsMeter, MeterOutput, StdoutSink};
pub use names::{CreatureNames, NameCache, NameResolver};
pub use tracker::{DpsInfo, FightRecord, FightTracker, FormatError, TargetId, TrackerSettings};
