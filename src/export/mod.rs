// Export - Standard MIDI File output

pub mod midi;

// Re-export main types
pub use midi::{export_progression_midi, MidiExportError, MidiExportOptions};
