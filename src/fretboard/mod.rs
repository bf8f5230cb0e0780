// Fretboard - tunings and the positioned note grid

pub mod grid;
pub mod tuning;

// Re-export main types
pub use grid::{build_grid, mirror_column, visual_row, window_column, FretWindow, GridNote, Handedness};
pub use tuning::Tuning;
