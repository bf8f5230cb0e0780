// Audio - live output backend

pub mod output;

// Re-export main types
pub use output::{AudioClock, AudioError, AudioOutput, ClickQueue};
