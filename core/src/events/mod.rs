pub mod codes;
pub mod event;

pub use event::{MeterEvent, TimedEvent};
