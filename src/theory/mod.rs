// Music Theory - pitch classes, scales, chord tones
// The deterministic note model everything else derives from

pub mod chord;
pub mod pitch;
pub mod scale;

// Re-export main types
pub use chord::{chord_tones, parse_chord_root, ChordQuality, ChordToneMode};
pub use pitch::{degree_label, PitchClass, PitchClassSet, UnknownNoteError};
pub use scale::{ScaleDefinition, ScaleDefinitionError, ScaleKind};
