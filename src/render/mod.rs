// Render - click-tone synthesis and offline click-track rendering

pub mod click;
pub mod wav;

// Re-export main types
pub use click::{ClickTone, ACCENT_FREQ_HZ, BEAT_FREQ_HZ};
pub use wav::{render_click_track, render_click_wav, write_wav, RenderError};
