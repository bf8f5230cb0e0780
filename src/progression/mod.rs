// Chord Progressions - named per-bar chord sequences
// Presets are immutable 12-bar tables looked up by name

use serde::{Deserialize, Serialize};

use crate::theory::{parse_chord_root, ChordQuality, PitchClass, PitchClassSet};

/// An ordered chord-symbol sequence, one symbol per bar, 1-indexed by bar.
///
/// Symbols follow `<letter>[accidental][quality-suffix]` (`Bb7`, `Edim`);
/// only the root prefix participates in chord-tone computation, the suffix is
/// display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordProgression {
    name: String,
    chords: Vec<String>,
}

impl ChordProgression {
    /// Create a progression from chord symbols, one per bar
    pub fn new(name: &str, chords: &[&str]) -> Self {
        ChordProgression {
            name: name.to_string(),
            chords: chords.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// The progression's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of bars
    pub fn bar_count(&self) -> usize {
        self.chords.len()
    }

    /// The chord symbol at a 1-indexed bar
    pub fn chord_at(&self, bar: usize) -> Option<&str> {
        if bar == 0 {
            return None;
        }
        self.chords.get(bar - 1).map(String::as_str)
    }

    /// The chord root at a 1-indexed bar.
    ///
    /// Malformed symbols resolve to C via the parser's soft fallback.
    pub fn root_at(&self, bar: usize) -> Option<PitchClass> {
        self.chord_at(bar).map(parse_chord_root)
    }

    /// Absolute chord tones sounding at a 1-indexed bar, for a fixed quality
    pub fn chord_tones_at(&self, bar: usize, quality: ChordQuality) -> Option<PitchClassSet> {
        self.root_at(bar).map(|root| quality.tones_on(root))
    }
}

/// Get a progression preset by name (case-insensitive)
pub fn preset(name: &str) -> Option<ChordProgression> {
    match name.to_uppercase().as_str() {
        "TWELVE BAR BLUES IN A" => Some(twelve_bar_blues_in_a()),
        "TWELVE BAR BLUES IN E" => Some(twelve_bar_blues_in_e()),
        "TWELVE BAR BLUES IN G" => Some(twelve_bar_blues_in_g()),
        "MINOR BLUES IN A" => Some(minor_blues_in_a()),
        _ => None,
    }
}

/// All preset names
pub fn preset_names() -> Vec<&'static str> {
    vec![
        "TWELVE BAR BLUES IN A",
        "TWELVE BAR BLUES IN E",
        "TWELVE BAR BLUES IN G",
        "MINOR BLUES IN A",
    ]
}

fn twelve_bar_blues_in_a() -> ChordProgression {
    ChordProgression::new(
        "TWELVE BAR BLUES IN A",
        &["A", "D", "A", "A", "D", "D", "A", "A", "E", "D", "E", "A"],
    )
}

fn twelve_bar_blues_in_e() -> ChordProgression {
    ChordProgression::new(
        "TWELVE BAR BLUES IN E",
        &["E", "A", "E", "E", "A", "A", "E", "E", "B", "A", "B", "E"],
    )
}

fn twelve_bar_blues_in_g() -> ChordProgression {
    ChordProgression::new(
        "TWELVE BAR BLUES IN G",
        &["G", "C", "G", "G", "C", "C", "G", "G", "D", "C", "D", "G"],
    )
}

fn minor_blues_in_a() -> ChordProgression {
    ChordProgression::new(
        "MINOR BLUES IN A",
        &["Am", "Dm", "Am", "Am", "Dm", "Dm", "Am", "Am", "F", "E", "Am", "E"],
    )
}
