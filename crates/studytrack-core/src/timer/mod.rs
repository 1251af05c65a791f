mod clock;
mod engine;
mod mode;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use engine::{SessionSink, TickToken, TimerEngine, TimerState};
pub use mode::{TimerMode, TimerSettings};
