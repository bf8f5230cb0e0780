// Tunings - ordered open-string pitch classes
// Listed lowest-pitched string first, the way a player names them

use serde::{Deserialize, Serialize};

use crate::theory::{PitchClass, UnknownNoteError};

/// An instrument tuning: the open pitch class of each string, lowest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuning {
    name: String,
    open_strings: Vec<PitchClass>,
}

impl Tuning {
    /// Build a tuning from note names, lowest-pitched string first.
    ///
    /// Fails on the first unparseable name; a wrong open string would shift
    /// every note on that string.
    pub fn from_names(name: &str, notes: &[&str]) -> Result<Self, UnknownNoteError> {
        let open_strings = notes
            .iter()
            .map(|note| PitchClass::parse(note))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Tuning {
            name: name.to_string(),
            open_strings,
        })
    }

    /// Standard six-string tuning, E A D G B E
    pub fn standard() -> Self {
        preset("STANDARD").expect("standard tuning preset exists")
    }

    /// The tuning's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of strings
    pub fn string_count(&self) -> usize {
        self.open_strings.len()
    }

    /// Open pitch classes, lowest-pitched string first
    pub fn open_strings(&self) -> &[PitchClass] {
        &self.open_strings
    }
}

/// Get a tuning preset by name (case-insensitive)
pub fn preset(name: &str) -> Option<Tuning> {
    let (display, notes): (&str, &[&str]) = match name.to_uppercase().as_str() {
        "STANDARD" => ("STANDARD", &["E", "A", "D", "G", "B", "E"]),
        "DROP D" => ("DROP D", &["D", "A", "D", "G", "B", "E"]),
        "DADGAD" => ("DADGAD", &["D", "A", "D", "G", "A", "D"]),
        "OPEN G" => ("OPEN G", &["D", "G", "D", "G", "B", "D"]),
        "HALF-STEP DOWN" => ("HALF-STEP DOWN", &["Eb", "Ab", "Db", "Gb", "Bb", "Eb"]),
        _ => return None,
    };

    Some(Tuning::from_names(display, notes).expect("preset note names are valid"))
}

/// All tuning preset names
pub fn preset_names() -> Vec<&'static str> {
    vec!["STANDARD", "DROP D", "DADGAD", "OPEN G", "HALF-STEP DOWN"]
}
