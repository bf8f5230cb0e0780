// Transport - metronome state machine, scheduling, and the polling driver

pub mod engine;
pub mod scheduler;
pub mod state;

// Re-export main types
pub use engine::{ClickSink, Metronome, NullSink, SystemClock, TransportClock};
pub use scheduler::{
    LookaheadScheduler, SchedulerEvent, DISPLAY_EPSILON, LOOKAHEAD_HORIZON, POLL_INTERVAL_MS,
    START_DELAY,
};
pub use state::{AccentMode, PlaybackState, SwitchOffset, TransportConfig, MAX_BPM, MIN_BPM};
