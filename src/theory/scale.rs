// Scale definitions - interval patterns and derived pitch-class sets

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pitch::{PitchClass, PitchClassSet};

/// Errors produced when validating a custom scale definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScaleDefinitionError {
    #[error("scale must contain the root interval 0")]
    MissingRoot,

    #[error("scale interval {0} is outside [0, 11]")]
    OutOfRange(u8),

    #[error("scale intervals must be strictly ascending")]
    NotAscending,
}

/// Built-in scale families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    Major,
    NaturalMinor,
    HarmonicMinor,
    MelodicMinor,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
}

impl ScaleKind {
    /// Semitone intervals from the root, ascending, root included
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            ScaleKind::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleKind::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleKind::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            ScaleKind::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleKind::MinorPentatonic => &[0, 3, 5, 7, 10],
            ScaleKind::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleKind::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleKind::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleKind::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            ScaleKind::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleKind::Locrian => &[0, 1, 3, 5, 6, 8, 10],
        }
    }

    /// Human-readable name for UI display
    pub fn display_name(&self) -> &'static str {
        match self {
            ScaleKind::Major => "Major",
            ScaleKind::NaturalMinor => "Natural Minor",
            ScaleKind::HarmonicMinor => "Harmonic Minor",
            ScaleKind::MelodicMinor => "Melodic Minor",
            ScaleKind::MajorPentatonic => "Major Pentatonic",
            ScaleKind::MinorPentatonic => "Minor Pentatonic",
            ScaleKind::Blues => "Blues",
            ScaleKind::Dorian => "Dorian",
            ScaleKind::Phrygian => "Phrygian",
            ScaleKind::Lydian => "Lydian",
            ScaleKind::Mixolydian => "Mixolydian",
            ScaleKind::Locrian => "Locrian",
        }
    }
}

/// A named scale: an ascending list of semitone intervals from the root.
///
/// The root interval 0 is always present. Built-in kinds convert via `From`;
/// custom definitions go through the validating constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleDefinition {
    name: String,
    intervals: Vec<u8>,
}

impl ScaleDefinition {
    /// Create a custom scale, validating the interval list
    pub fn new(name: &str, intervals: Vec<u8>) -> Result<Self, ScaleDefinitionError> {
        if intervals.first() != Some(&0) {
            return Err(ScaleDefinitionError::MissingRoot);
        }
        if let Some(&bad) = intervals.iter().find(|&&i| i > 11) {
            return Err(ScaleDefinitionError::OutOfRange(bad));
        }
        if intervals.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ScaleDefinitionError::NotAscending);
        }

        Ok(ScaleDefinition {
            name: name.to_string(),
            intervals,
        })
    }

    /// The scale's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semitone intervals from the root, ascending
    pub fn intervals(&self) -> &[u8] {
        &self.intervals
    }

    /// The intervals as a set relative to the root (tonic at 0)
    pub fn relative_set(&self) -> PitchClassSet {
        self.intervals
            .iter()
            .map(|&i| PitchClass::from_semitones(i as i32))
            .collect()
    }

    /// Absolute pitch classes of this scale built on `tonic`
    pub fn pitch_classes(&self, tonic: PitchClass) -> PitchClassSet {
        self.relative_set().transposed(tonic.semitones() as i32)
    }
}

impl From<ScaleKind> for ScaleDefinition {
    fn from(kind: ScaleKind) -> Self {
        ScaleDefinition {
            name: kind.display_name().to_string(),
            intervals: kind.intervals().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pc(n: i32) -> PitchClass {
        PitchClass::from_semitones(n)
    }

    #[test]
    fn test_all_kinds_contain_root() {
        let kinds = [
            ScaleKind::Major,
            ScaleKind::NaturalMinor,
            ScaleKind::HarmonicMinor,
            ScaleKind::MelodicMinor,
            ScaleKind::MajorPentatonic,
            ScaleKind::MinorPentatonic,
            ScaleKind::Blues,
            ScaleKind::Dorian,
            ScaleKind::Phrygian,
            ScaleKind::Lydian,
            ScaleKind::Mixolydian,
            ScaleKind::Locrian,
        ];
        for kind in kinds {
            let def = ScaleDefinition::from(kind);
            assert_eq!(def.intervals().first(), Some(&0), "{:?}", kind);
            assert!(def.intervals().windows(2).all(|p| p[0] < p[1]), "{:?}", kind);
        }
    }

    #[test]
    fn test_c_major_pitch_classes() {
        let def = ScaleDefinition::from(ScaleKind::Major);
        let set = def.pitch_classes(pc(0));
        let expected: PitchClassSet = [0, 2, 4, 5, 7, 9, 11].iter().map(|&n| pc(n)).collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn test_transposed_scale_wraps() {
        // A natural minor: A B C D E F G
        let def = ScaleDefinition::from(ScaleKind::NaturalMinor);
        let set = def.pitch_classes(pc(9));
        let expected: PitchClassSet = [9, 11, 0, 2, 4, 5, 7].iter().map(|&n| pc(n)).collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn test_custom_definition_validation() {
        assert!(ScaleDefinition::new("ok", vec![0, 2, 4]).is_ok());
        assert_eq!(
            ScaleDefinition::new("no root", vec![2, 4]),
            Err(ScaleDefinitionError::MissingRoot)
        );
        assert_eq!(
            ScaleDefinition::new("too high", vec![0, 12]),
            Err(ScaleDefinitionError::OutOfRange(12))
        );
        assert_eq!(
            ScaleDefinition::new("duplicate", vec![0, 4, 4]),
            Err(ScaleDefinitionError::NotAscending)
        );
    }
}
