// Chord tones - promotes scale degrees to chord-tone status
// and resolves chord-symbol roots

use serde::{Deserialize, Serialize};

use super::pitch::{PitchClass, PitchClassSet};
use super::scale::ScaleDefinition;

/// How many degrees of the active scale are promoted to chord tones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordToneMode {
    /// No chord-tone highlighting
    Off,
    /// Root, third, fifth
    Triad,
    /// Triad plus the seventh
    Seventh,
    /// Seventh chord plus 9th/11th/13th extensions
    Extended,
}

/// Fixed chord shapes used when a progression names the chord directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Triad,
    Dominant7,
}

impl ChordQuality {
    /// Semitone degrees relative to the chord root
    pub fn degrees(&self) -> &'static [u8] {
        match self {
            ChordQuality::Triad => &[0, 4, 7],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
        }
    }

    /// Absolute chord tones for this quality built on `root`
    pub fn tones_on(&self, root: PitchClass) -> PitchClassSet {
        self.degrees()
            .iter()
            .map(|&d| root.transposed(d as i32))
            .collect()
    }
}

/// Derive the chord-tone subset of a scale, built degree by degree.
///
/// Each degree prefers its major/perfect form and falls back to the altered
/// form when that is what the scale offers: major third over minor third,
/// perfect fifth over diminished fifth, minor seventh over major seventh.
/// Degrees the scale lacks entirely are skipped, so a scale with no third
/// yields a bare root-fifth set rather than borrowing outside the scale.
pub fn chord_tones(
    scale: &ScaleDefinition,
    tonic: PitchClass,
    mode: ChordToneMode,
) -> PitchClassSet {
    if mode == ChordToneMode::Off {
        return PitchClassSet::empty();
    }

    let in_scale = scale.relative_set();
    let has = |interval: i32| in_scale.contains(PitchClass::from_semitones(interval));

    let mut tones = PitchClassSet::empty();
    tones.insert(PitchClass::from_semitones(0));

    if has(4) {
        tones.insert(PitchClass::from_semitones(4));
    } else if has(3) {
        tones.insert(PitchClass::from_semitones(3));
    }

    if has(7) {
        tones.insert(PitchClass::from_semitones(7));
    } else if has(6) {
        tones.insert(PitchClass::from_semitones(6));
    }

    if mode != ChordToneMode::Triad {
        if has(10) {
            tones.insert(PitchClass::from_semitones(10));
        } else if has(11) {
            tones.insert(PitchClass::from_semitones(11));
        }

        if mode == ChordToneMode::Extended {
            // 9th, 11th, 13th reduce to these intervals mod 12
            for extension in [2, 5, 9] {
                if has(extension) {
                    tones.insert(PitchClass::from_semitones(extension));
                }
            }
        }
    }

    tones.transposed(tonic.semitones() as i32)
}

/// Resolve the root of a chord symbol like `Bb7` or `Edim`.
///
/// Only the letter + optional accidental prefix is read; any quality suffix
/// is display-only. A malformed prefix degrades to C rather than failing so a
/// broken progression preset cannot halt playback; the wrong highlight is the
/// accepted cost and the degradation is logged.
pub fn parse_chord_root(symbol: &str) -> PitchClass {
    let trimmed = symbol.trim();
    let mut chars = trimmed.chars();

    let prefix_len = match chars.next() {
        Some(letter) if letter.is_ascii_alphabetic() => match chars.next() {
            Some('#') | Some('b') => 2,
            _ => 1,
        },
        _ => 0,
    };

    let parsed = trimmed
        .get(..prefix_len)
        .filter(|prefix| !prefix.is_empty())
        .and_then(|prefix| PitchClass::parse(prefix).ok());

    match parsed {
        Some(root) => root,
        None => {
            log::warn!(
                "unparseable chord symbol {:?}; falling back to C root",
                symbol
            );
            PitchClass::from_semitones(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::scale::ScaleKind;

    fn pc(n: i32) -> PitchClass {
        PitchClass::from_semitones(n)
    }

    fn set(values: &[i32]) -> PitchClassSet {
        values.iter().map(|&n| pc(n)).collect()
    }

    #[test]
    fn test_off_mode_is_empty() {
        let major = ScaleDefinition::from(ScaleKind::Major);
        assert!(chord_tones(&major, pc(0), ChordToneMode::Off).is_empty());
    }

    #[test]
    fn test_c_major_triad() {
        let major = ScaleDefinition::from(ScaleKind::Major);
        assert_eq!(chord_tones(&major, pc(0), ChordToneMode::Triad), set(&[0, 4, 7]));
    }

    #[test]
    fn test_a_natural_minor_seventh() {
        // Relative degrees {0,3,7,10} transposed to A
        let minor = ScaleDefinition::from(ScaleKind::NaturalMinor);
        assert_eq!(
            chord_tones(&minor, pc(9), ChordToneMode::Seventh),
            set(&[9, 0, 4, 7])
        );
    }

    #[test]
    fn test_harmonic_minor_falls_back_to_major_seventh() {
        let harmonic = ScaleDefinition::from(ScaleKind::HarmonicMinor);
        assert_eq!(
            chord_tones(&harmonic, pc(0), ChordToneMode::Seventh),
            set(&[0, 3, 7, 11])
        );
    }

    #[test]
    fn test_locrian_uses_diminished_fifth() {
        let locrian = ScaleDefinition::from(ScaleKind::Locrian);
        assert_eq!(
            chord_tones(&locrian, pc(0), ChordToneMode::Triad),
            set(&[0, 3, 6])
        );
    }

    #[test]
    fn test_extended_adds_present_extensions() {
        let major = ScaleDefinition::from(ScaleKind::Major);
        assert_eq!(
            chord_tones(&major, pc(0), ChordToneMode::Extended),
            set(&[0, 2, 4, 5, 7, 9, 11])
        );

        // Minor pentatonic has no 9th or 13th; only the 11th joins
        let pentatonic = ScaleDefinition::from(ScaleKind::MinorPentatonic);
        assert_eq!(
            chord_tones(&pentatonic, pc(0), ChordToneMode::Extended),
            set(&[0, 3, 5, 7, 10])
        );
    }

    #[test]
    fn test_mode_monotonicity() {
        let kinds = [
            ScaleKind::Major,
            ScaleKind::NaturalMinor,
            ScaleKind::Blues,
            ScaleKind::Locrian,
            ScaleKind::MajorPentatonic,
        ];
        for kind in kinds {
            let scale = ScaleDefinition::from(kind);
            for tonic in 0..12 {
                let triad = chord_tones(&scale, pc(tonic), ChordToneMode::Triad);
                let seventh = chord_tones(&scale, pc(tonic), ChordToneMode::Seventh);
                let extended = chord_tones(&scale, pc(tonic), ChordToneMode::Extended);

                assert!(triad.contains(pc(tonic)), "{:?} root missing", kind);
                assert!(seventh.is_superset_of(triad), "{:?}", kind);
                assert!(extended.is_superset_of(seventh), "{:?}", kind);
            }
        }
    }

    #[test]
    fn test_quality_templates() {
        assert_eq!(ChordQuality::Triad.tones_on(pc(0)), set(&[0, 4, 7]));
        assert_eq!(
            ChordQuality::Dominant7.tones_on(pc(4)),
            set(&[4, 8, 11, 2])
        );
    }

    #[test]
    fn test_chord_root_parsing() {
        assert_eq!(parse_chord_root("Bb7"), pc(10));
        assert_eq!(parse_chord_root("Edim"), pc(4));
        assert_eq!(parse_chord_root("F#m7"), pc(6));
        assert_eq!(parse_chord_root("A"), pc(9));
    }

    #[test]
    fn test_chord_root_soft_fallback() {
        // Malformed prefixes degrade to C instead of failing
        assert_eq!(parse_chord_root(""), pc(0));
        assert_eq!(parse_chord_root("7"), pc(0));
        assert_eq!(parse_chord_root("Hb"), pc(0));
    }
}
