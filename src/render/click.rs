// Click Tones - short enveloped sine bursts for the metronome
// One fixed frequency per accent state; linear attack, exponential decay

/// Frequency of the accented click
pub const ACCENT_FREQ_HZ: f32 = 1000.0;

/// Frequency of the unaccented click
pub const BEAT_FREQ_HZ: f32 = 800.0;

/// Linear attack length up to peak amplitude
const ATTACK_SECS: f32 = 0.005;

/// Total click length; decayed to near-silence well before the next beat
const DURATION_SECS: f32 = 0.09;

/// Exponential decay rate after the attack
const DECAY_PER_SEC: f32 = 60.0;

const ACCENT_PEAK: f32 = 0.8;
const BEAT_PEAK: f32 = 0.5;

/// A pre-rendered click: mono samples at a fixed sample rate
#[derive(Debug, Clone)]
pub struct ClickTone {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl ClickTone {
    /// The accented (downbeat/backbeat) click
    pub fn accent(sample_rate: u32) -> Self {
        Self::generate(sample_rate, ACCENT_FREQ_HZ, ACCENT_PEAK)
    }

    /// The regular click
    pub fn beat(sample_rate: u32) -> Self {
        Self::generate(sample_rate, BEAT_FREQ_HZ, BEAT_PEAK)
    }

    /// The click matching an accent flag
    pub fn for_accent(accent: bool, sample_rate: u32) -> Self {
        if accent {
            Self::accent(sample_rate)
        } else {
            Self::beat(sample_rate)
        }
    }

    fn generate(sample_rate: u32, freq: f32, peak: f32) -> Self {
        let num_samples = (sample_rate as f32 * DURATION_SECS) as usize;
        let mut samples = Vec::with_capacity(num_samples);

        for i in 0..num_samples {
            let t = i as f32 / sample_rate as f32;
            let envelope = if t < ATTACK_SECS {
                t / ATTACK_SECS
            } else {
                (-(t - ATTACK_SECS) * DECAY_PER_SEC).exp()
            };
            samples.push((t * freq * std::f32::consts::TAU).sin() * envelope * peak);
        }

        ClickTone {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Click length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
