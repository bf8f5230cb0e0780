// MIDI Export - progression click tracks as Standard MIDI Files using midly
// Produces DAW-friendly files with tempo and time-signature metadata

use midly::{Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progression::ChordProgression;
use crate::transport::TransportConfig;

/// GM percussion key for the accented click (high wood block)
const ACCENT_KEY: u8 = 76;

/// GM percussion key for the regular click (low wood block)
const BEAT_KEY: u8 = 77;

const ACCENT_VELOCITY: u8 = 110;
const BEAT_VELOCITY: u8 = 80;

/// Chord roots are voiced in the C3 octave (MIDI 48-59)
const ROOT_BASE_KEY: u8 = 48;

/// Errors from MIDI export
#[derive(Debug, Error)]
pub enum MidiExportError {
    #[error("failed to write MIDI: {0}")]
    Write(String),
}

/// MIDI export options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiExportOptions {
    /// Pulses per quarter note - typically 480 or 960
    pub ppq: u16,

    /// Include tempo metadata
    pub include_tempo: bool,

    /// Include time signature metadata
    pub include_time_signature: bool,

    /// Include track names
    pub track_names: bool,
}

impl Default for MidiExportOptions {
    fn default() -> Self {
        MidiExportOptions {
            ppq: 480,
            include_tempo: true,
            include_time_signature: true,
            track_names: true,
        }
    }
}

/// Export one pass of a progression as MIDI file bytes.
///
/// Three parallel tracks: metadata (tempo, time signature), the click on the
/// percussion channel with accents per the configured accent mode, and one
/// held chord-root note per bar.
pub fn export_progression_midi(
    progression: &ChordProgression,
    config: &TransportConfig,
    options: &MidiExportOptions,
) -> Result<Vec<u8>, MidiExportError> {
    let header = Header {
        format: midly::Format::Parallel,
        timing: Timing::Metrical(options.ppq.into()),
    };

    let mut tracks = Vec::new();

    // Track 0: tempo and time signature metadata
    let mut meta_track = Track::new();
    if options.track_names {
        add_track_name(&mut meta_track, "META");
    }
    if options.include_tempo {
        add_tempo(&mut meta_track, config.bpm);
    }
    if options.include_time_signature {
        add_time_signature(&mut meta_track, config.beats_per_bar);
    }
    add_end_of_track(&mut meta_track);
    tracks.push(meta_track);

    tracks.push(click_track(progression.bar_count() as u32, config, options));
    tracks.push(root_track(progression, config, options));

    let smf = Smf { header, tracks };

    let mut bytes = Vec::new();
    smf.write(&mut bytes)
        .map_err(|e| MidiExportError::Write(e.to_string()))?;

    Ok(bytes)
}

/// One click per beat on the percussion channel, beat = quarter note
fn click_track<'a>(bars: u32, config: &TransportConfig, options: &MidiExportOptions) -> Track<'a> {
    let ppq = options.ppq as u32;
    let beats_per_bar = config.beats_per_bar;
    let click_len = (ppq / 8).max(1);

    let mut events: Vec<(u32, TrackEventKind)> = Vec::new();
    for k in 0..bars * beats_per_bar {
        let beat_in_bar = k % beats_per_bar + 1;
        let accent = config.accent.accents(beat_in_bar, beats_per_bar);
        let (key, velocity) = if accent {
            (ACCENT_KEY, ACCENT_VELOCITY)
        } else {
            (BEAT_KEY, BEAT_VELOCITY)
        };

        let tick = k * ppq;
        events.push((
            tick,
            TrackEventKind::Midi {
                channel: 9.into(), // channel 10 (0-indexed = 9) is percussion
                message: MidiMessage::NoteOn {
                    key: key.into(),
                    vel: velocity.into(),
                },
            },
        ));
        events.push((
            tick + click_len,
            TrackEventKind::Midi {
                channel: 9.into(),
                message: MidiMessage::NoteOff {
                    key: key.into(),
                    vel: 0.into(),
                },
            },
        ));
    }

    finish_track(events, options, "CLICK")
}

/// The chord root of each bar, held for the whole bar
fn root_track<'a>(
    progression: &ChordProgression,
    config: &TransportConfig,
    options: &MidiExportOptions,
) -> Track<'a> {
    let ppq = options.ppq as u32;
    let bar_len = config.beats_per_bar * ppq;

    let mut events: Vec<(u32, TrackEventKind)> = Vec::new();
    for bar in 1..=progression.bar_count() {
        let Some(root) = progression.root_at(bar) else {
            continue;
        };
        let key = ROOT_BASE_KEY + root.semitones();
        let tick = (bar as u32 - 1) * bar_len;

        events.push((
            tick,
            TrackEventKind::Midi {
                channel: 0.into(),
                message: MidiMessage::NoteOn {
                    key: key.into(),
                    vel: 70.into(),
                },
            },
        ));
        events.push((
            tick + bar_len,
            TrackEventKind::Midi {
                channel: 0.into(),
                message: MidiMessage::NoteOff {
                    key: key.into(),
                    vel: 0.into(),
                },
            },
        ));
    }

    finish_track(events, options, "ROOTS")
}

/// Sort absolute-tick events, delta-encode, and terminate the track
fn finish_track<'a>(
    mut events: Vec<(u32, TrackEventKind<'a>)>,
    options: &MidiExportOptions,
    name: &'a str,
) -> Track<'a> {
    let mut track = Track::new();
    if options.track_names {
        add_track_name(&mut track, name);
    }

    events.sort_by_key(|(tick, _)| *tick);

    let mut last_tick = 0;
    for (tick, kind) in events {
        let delta = tick.saturating_sub(last_tick);
        track.push(TrackEvent {
            delta: delta.into(),
            kind,
        });
        last_tick = tick;
    }

    add_end_of_track(&mut track);
    track
}

fn add_track_name<'a>(track: &mut Track<'a>, name: &'a str) {
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
    });
}

fn add_tempo(track: &mut Track, bpm: f64) {
    let us_per_quarter = (60_000_000.0 / bpm) as u32;
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(us_per_quarter.into())),
    });
}

fn add_time_signature(track: &mut Track, beats_per_bar: u32) {
    // Denominator is encoded as a power of two: 2^2 = quarter note
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::TimeSignature(beats_per_bar as u8, 2, 24, 8)),
    });
}

fn add_end_of_track(track: &mut Track) {
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
}
