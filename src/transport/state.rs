// Transport State - metronome configuration and playback position
// Configuration is an explicit struct handed to the scheduler, never ambient

use serde::{Deserialize, Serialize};

/// Lowest settable tempo
pub const MIN_BPM: f64 = 30.0;

/// Highest settable tempo
pub const MAX_BPM: f64 = 240.0;

/// Which beats of the bar receive the accented click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccentMode {
    /// Accent beat 1 only
    Downbeat,

    /// Accent beat 2, and beat 4 in meters of four or more
    Backbeat,

    /// No accents
    Even,
}

impl AccentMode {
    /// Whether `beat` (1-indexed) is accented in a bar of `beats_per_bar`
    pub fn accents(&self, beat: u32, beats_per_bar: u32) -> bool {
        match self {
            AccentMode::Downbeat => beat == 1,
            AccentMode::Backbeat => beat == 2 || (beats_per_bar >= 4 && beat == 4),
            AccentMode::Even => false,
        }
    }
}

/// Where inside the bar's final beat the displayed bar switches ahead.
///
/// Named after the sixteenth-note counting syllables ("1 e & a"): the display
/// can anticipate the downbeat so a performer sees the next chord coming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchOffset {
    /// Switch exactly on the final beat
    Immediate,
    /// A quarter of a beat after the final beat
    E,
    /// Halfway through the final beat
    And,
    /// Three quarters through the final beat
    A,
}

impl SwitchOffset {
    /// Fraction of one beat after the bar's final click at which the
    /// display switches
    pub fn fraction(&self) -> f64 {
        match self {
            SwitchOffset::Immediate => 0.0,
            SwitchOffset::E => 0.25,
            SwitchOffset::And => 0.5,
            SwitchOffset::A => 0.75,
        }
    }
}

/// Metronome configuration.
///
/// Every setter clamps, so a config that exists is a config the scheduler can
/// run: tempo stays positive, volume stays a sane gain scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Beats per minute
    pub bpm: f64,

    /// Time signature numerator; practically 3, 4, or 6
    pub beats_per_bar: u32,

    /// Accent placement
    pub accent: AccentMode,

    /// Display-bar anticipation offset
    pub switch_offset: SwitchOffset,

    /// Click gain scalar [0.0, 1.0]
    pub click_volume: f32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            bpm: 120.0,
            beats_per_bar: 4,
            accent: AccentMode::Downbeat,
            switch_offset: SwitchOffset::Immediate,
            click_volume: 0.8,
        }
    }
}

impl TransportConfig {
    /// Set tempo, clamped to the supported range
    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    }

    /// Set beats per bar, clamped to [1, 12]
    pub fn set_beats_per_bar(&mut self, beats: u32) {
        self.beats_per_bar = beats.clamp(1, 12);
    }

    /// Set click volume, clamped to [0.0, 1.0]
    pub fn set_click_volume(&mut self, gain: f32) {
        self.click_volume = gain.clamp(0.0, 1.0);
    }

    /// Seconds between beats at the configured tempo.
    /// Guards against hand-built configs with a non-positive tempo.
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm.max(1.0)
    }
}

/// The transport position as the scheduler advances it.
///
/// `current_bar`/`current_beat` are the authoritative position;
/// `display_bar` is what the viewer sees and may lead `current_bar` at bar
/// boundaries by the configured anticipation offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// 1-indexed beat within the bar
    pub current_beat: u32,

    /// 1-indexed bar within the progression
    pub current_bar: usize,

    /// 1-indexed bar currently shown to the viewer
    pub display_bar: usize,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState {
            current_beat: 1,
            current_bar: 1,
            display_bar: 1,
        }
    }
}
