// Fretline - Fretboard note-model and metronome practice engine
// Module declarations

pub mod audio;
pub mod export;
pub mod fretboard;
pub mod progression;
pub mod render;
pub mod theory;
pub mod transport;

// Re-export the main types
pub use fretboard::{build_grid, FretWindow, GridNote, Handedness, Tuning};
pub use progression::ChordProgression;
pub use theory::{
    degree_label, ChordQuality, ChordToneMode, PitchClass, PitchClassSet, ScaleDefinition,
    ScaleKind, UnknownNoteError,
};
pub use transport::{AccentMode, Metronome, PlaybackState, SwitchOffset, TransportConfig};
