// Pitch classes - canonical 12-tone representation
// Name parsing/formatting and interval/degree arithmetic

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when note-name text matches no known spelling.
/// Parsing never falls back to a default value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown note name: {name:?}")]
pub struct UnknownNoteError {
    /// The text that failed to parse (as given, before normalization)
    pub name: String,
}

/// Sharp-preferring note spellings, indexed by semitone distance from C
const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat-preferring note spellings, indexed by semitone distance from C
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Keys whose signatures contain flats (major and relative/parallel minor).
/// Any key context outside this list formats with the sharp table.
const FLAT_KEYS: [&str; 14] = [
    "F", "BB", "EB", "AB", "DB", "GB", "CB", "DM", "GM", "CM", "FM", "BBM", "EBM", "ABM",
];

/// Degree labels relative to a tonic, flat-preferring spelling
const FLAT_DEGREES: [&str; 12] = [
    "R", "b2", "2", "b3", "3", "4", "b5", "5", "b6", "6", "b7", "7",
];

/// Degree labels relative to a tonic, sharp-preferring spelling.
/// Differs from the flat table only at the altered slots (#1, #4, #5).
const SHARP_DEGREES: [&str; 12] = [
    "R", "#1", "2", "b3", "3", "4", "#4", "5", "#5", "6", "b7", "7",
];

/// One of the 12 equivalence classes of pitch under octave transposition,
/// numbered 0 (C) through 11 (B).
///
/// The wrapped value is always in [0, 11]; every constructor reduces mod 12
/// and serde round-trips through a checked `u8` conversion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct PitchClass(u8);

impl PitchClass {
    /// Build a pitch class from any semitone count, reduced mod 12
    pub fn from_semitones(semitones: i32) -> Self {
        PitchClass(semitones.rem_euclid(12) as u8)
    }

    /// Parse a note name into a pitch class.
    ///
    /// Case-insensitive, trims whitespace, and strips one trailing minor-chord
    /// marker (`m`), so `"bb"`, `" Eb "`, and `"F#m"` all parse. Accepts the
    /// theoretical spellings (E#, Fb, B#, Cb) alongside the common ones.
    pub fn parse(text: &str) -> Result<Self, UnknownNoteError> {
        let mut normalized = text.trim().to_uppercase();
        if normalized.len() > 1 && normalized.ends_with('M') {
            normalized.pop();
        }

        let semitones = match normalized.as_str() {
            "B#" | "C" => 0,
            "C#" | "DB" => 1,
            "D" => 2,
            "D#" | "EB" => 3,
            "E" | "FB" => 4,
            "E#" | "F" => 5,
            "F#" | "GB" => 6,
            "G" => 7,
            "G#" | "AB" => 8,
            "A" => 9,
            "A#" | "BB" => 10,
            "B" | "CB" => 11,
            _ => {
                return Err(UnknownNoteError {
                    name: text.to_string(),
                })
            }
        };

        Ok(PitchClass(semitones))
    }

    /// Semitone distance from C, in [0, 11]
    pub fn semitones(self) -> u8 {
        self.0
    }

    /// Transpose by a (possibly negative) number of semitones
    pub fn transposed(self, semitones: i32) -> Self {
        Self::from_semitones(self.0 as i32 + semitones)
    }

    /// Ascending interval from `self` to `other`, in [0, 11]
    pub fn interval_to(self, other: Self) -> u8 {
        (other.0 + 12 - self.0) % 12
    }

    /// Format with the spelling table implied by a key context.
    ///
    /// Flat-preferring spellings are chosen when the key context names a key
    /// with flats in its signature; everything else (including unknown
    /// contexts) gets sharps. Total function, never fails.
    pub fn spelled_for(self, key_context: &str) -> &'static str {
        let key = key_context.trim().to_uppercase();
        if FLAT_KEYS.contains(&key.as_str()) {
            FLAT_NAMES[self.0 as usize]
        } else {
            SHARP_NAMES[self.0 as usize]
        }
    }

    /// The sharp-preferring spelling
    pub fn sharp_name(self) -> &'static str {
        SHARP_NAMES[self.0 as usize]
    }

    /// The flat-preferring spelling
    pub fn flat_name(self) -> &'static str {
        FLAT_NAMES[self.0 as usize]
    }
}

impl TryFrom<u8> for PitchClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < 12 {
            Ok(PitchClass(value))
        } else {
            Err(format!("pitch class out of range: {}", value))
        }
    }
}

impl From<PitchClass> for u8 {
    fn from(pc: PitchClass) -> u8 {
        pc.0
    }
}

/// Label a note's scale degree relative to a tonic (R, b3, 5, ...).
///
/// `prefer_sharp` selects between the flat- and sharp-preferring tables; it
/// only changes the enharmonic slots (b2/#1, b5/#4, b6/#5) and is supplied by
/// the caller, not derived from key context.
pub fn degree_label(tonic: PitchClass, note: PitchClass, prefer_sharp: bool) -> &'static str {
    let degree = tonic.interval_to(note) as usize;
    if prefer_sharp {
        SHARP_DEGREES[degree]
    } else {
        FLAT_DEGREES[degree]
    }
}

/// A set of pitch classes packed into a 12-bit mask.
/// Bit `n` set means pitch class `n` is a member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    /// The empty set
    pub fn empty() -> Self {
        PitchClassSet(0)
    }

    /// Whether `pc` is a member
    pub fn contains(self, pc: PitchClass) -> bool {
        (self.0 >> pc.semitones()) & 1 != 0
    }

    /// Add a member in place
    pub fn insert(&mut self, pc: PitchClass) {
        self.0 |= 1 << pc.semitones();
    }

    /// The union of two sets
    pub fn union(self, other: Self) -> Self {
        PitchClassSet(self.0 | other.0)
    }

    /// Whether every member of `other` is also a member of `self`
    pub fn is_superset_of(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Number of members
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set has no members
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Transpose every member by the same interval
    pub fn transposed(self, semitones: i32) -> Self {
        self.iter()
            .map(|pc| pc.transposed(semitones))
            .collect()
    }

    /// Iterate members in ascending pitch-class order
    pub fn iter(self) -> impl Iterator<Item = PitchClass> {
        (0u8..12).filter_map(move |n| {
            if (self.0 >> n) & 1 != 0 {
                Some(PitchClass(n))
            } else {
                None
            }
        })
    }
}

impl FromIterator<PitchClass> for PitchClassSet {
    fn from_iter<I: IntoIterator<Item = PitchClass>>(iter: I) -> Self {
        let mut set = PitchClassSet::empty();
        for pc in iter {
            set.insert(pc);
        }
        set
    }
}
