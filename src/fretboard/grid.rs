// Fretboard Grid - positioned note records for a tuning and fret window
// Row inversion and handedness mirroring are separate pure transforms

use serde::{Deserialize, Serialize};

use super::tuning::Tuning;
use crate::theory::{PitchClass, PitchClassSet};

/// Inclusive fret range shown on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FretWindow {
    /// First fret in the window (0 = nut)
    pub start: u8,

    /// Last fret in the window, inclusive
    pub end: u8,
}

impl FretWindow {
    pub fn new(start: u8, end: u8) -> Self {
        FretWindow { start, end }
    }

    /// Number of fret columns in the window; 0 when the window is degenerate
    pub fn width(&self) -> usize {
        if self.end >= self.start {
            (self.end - self.start) as usize + 1
        } else {
            0
        }
    }
}

/// Player handedness; left-handed mirrors the fret axis only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Right,
    Left,
}

/// One positioned note on the board.
///
/// `column`/`row` are the visual coordinates the renderer consumes (read-only
/// contract); `string`/`fret` record the record's origin so consumers never
/// have to rely on array order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridNote {
    /// String index, 0 = lowest-pitched string
    pub string: usize,

    /// Absolute fret number
    pub fret: u8,

    /// Horizontal cell-center coordinate, window-relative
    pub column: f32,

    /// Vertical coordinate; 0 is the top row (highest-pitched string)
    pub row: f32,

    /// The note's pitch class
    pub pitch_class: PitchClass,

    /// Whether the note belongs to the active scale
    pub in_scale: bool,

    /// Whether the note belongs to the active chord-tone set
    pub chord_tone: bool,
}

/// Visual row for a string: string order inverted so the highest-pitched
/// string lands on row 0 regardless of tuning
pub fn visual_row(string_index: usize, string_count: usize) -> f32 {
    (string_count - 1 - string_index) as f32
}

/// Window-relative column with a half-cell center offset
pub fn window_column(fret: u8, window: FretWindow) -> f32 {
    (fret - window.start) as f32 + 0.5
}

/// Mirror a column across the window for left-handed display.
/// Rows are never mirrored: handedness flips left/right, not string order.
pub fn mirror_column(column: f32, window_width: usize) -> f32 {
    window_width as f32 - column
}

/// Generate one note record per (string, fret) pair in the window.
///
/// Output order is unspecified; consumers key records by `string`/`fret`.
pub fn build_grid<F>(
    tuning: &Tuning,
    window: FretWindow,
    handedness: Handedness,
    scale_membership: F,
    chord_tones: PitchClassSet,
) -> Vec<GridNote>
where
    F: Fn(PitchClass) -> bool,
{
    let string_count = tuning.string_count();
    let mut notes = Vec::with_capacity(string_count * window.width());
    if window.width() == 0 {
        return notes;
    }

    for (string, &open) in tuning.open_strings().iter().enumerate() {
        for fret in window.start..=window.end {
            let pitch_class = open.transposed(fret as i32);
            let column = match handedness {
                Handedness::Right => window_column(fret, window),
                Handedness::Left => mirror_column(window_column(fret, window), window.width()),
            };

            notes.push(GridNote {
                string,
                fret,
                column,
                row: visual_row(string, string_count),
                pitch_class,
                in_scale: scale_membership(pitch_class),
                chord_tone: chord_tones.contains(pitch_class),
            });
        }
    }

    notes
}
