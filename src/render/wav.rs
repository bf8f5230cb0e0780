// Offline Click-Track Rendering - bars of metronome into a WAV file
// Shares the scheduler's beat arithmetic: beat k lands at k * 60/bpm

use std::path::Path;

use thiserror::Error;

use super::click::ClickTone;
use crate::transport::TransportConfig;

/// Errors from offline rendering
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write WAV file: {0}")]
    WavWrite(#[from] hound::Error),
}

/// Render `bars` of the configured click pattern into mono f32 samples.
///
/// Beat k of the render starts at exactly `k * 60/bpm` seconds; accents
/// follow the configured accent mode; the configured click volume is baked
/// into the samples.
pub fn render_click_track(config: &TransportConfig, bars: u32, sample_rate: u32) -> Vec<f32> {
    let beats_per_bar = config.beats_per_bar;
    let total_beats = bars * beats_per_bar;
    let seconds_per_beat = config.seconds_per_beat();

    let duration = total_beats as f64 * seconds_per_beat;
    let mut output = vec![0.0f32; (duration * sample_rate as f64).round() as usize];

    let accent_tone = ClickTone::accent(sample_rate);
    let beat_tone = ClickTone::beat(sample_rate);

    for k in 0..total_beats {
        let beat_in_bar = k % beats_per_bar + 1;
        let tone = if config.accent.accents(beat_in_bar, beats_per_bar) {
            &accent_tone
        } else {
            &beat_tone
        };

        let start = (k as f64 * seconds_per_beat * sample_rate as f64).round() as usize;
        for (offset, &sample) in tone.samples().iter().enumerate() {
            if let Some(slot) = output.get_mut(start + offset) {
                *slot += sample * config.click_volume;
            }
        }
    }

    log::info!(
        "rendered click track: {} bars of {}/4 at {:.0} bpm, {:.2}s @ {}Hz",
        bars,
        beats_per_bar,
        config.bpm,
        duration,
        sample_rate
    );

    output
}

/// Write mono f32 samples as a 16-bit PCM WAV file
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), RenderError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(value)?;
    }
    writer.finalize()?;

    Ok(())
}

/// Render and write in one step
pub fn render_click_wav(
    path: &Path,
    config: &TransportConfig,
    bars: u32,
    sample_rate: u32,
) -> Result<(), RenderError> {
    let samples = render_click_track(config, bars, sample_rate);
    write_wav(path, &samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::AccentMode;

    fn test_config() -> TransportConfig {
        let mut config = TransportConfig::default();
        config.set_bpm(120.0);
        config.set_beats_per_bar(4);
        config.set_click_volume(1.0);
        config
    }

    #[test]
    fn test_render_length() {
        // One 4/4 bar at 120 bpm is exactly two seconds
        let samples = render_click_track(&test_config(), 1, 44100);
        assert_eq!(samples.len(), 2 * 44100);
    }

    #[test]
    fn test_clicks_land_on_beats() {
        let samples = render_click_track(&test_config(), 1, 44100);

        // Energy right after each beat start, silence just before the next
        for beat in 0..4usize {
            let start = beat * 22050;
            let on_beat: f32 = samples[start..start + 2000].iter().map(|s| s.abs()).sum();
            assert!(on_beat > 1.0, "beat {} silent", beat);

            let before_next = start + 22050 - 2000;
            if before_next + 1000 <= samples.len() {
                let gap: f32 = samples[before_next..before_next + 1000]
                    .iter()
                    .map(|s| s.abs())
                    .sum();
                assert!(gap < 0.01, "beat {} bleeds into the gap", beat);
            }
        }
    }

    #[test]
    fn test_accent_mode_shapes_the_render() {
        let mut config = test_config();
        config.accent = AccentMode::Even;
        let even = render_click_track(&config, 1, 44100);

        config.accent = AccentMode::Downbeat;
        let accented = render_click_track(&config, 1, 44100);

        // The downbeat render is louder at beat 1 and identical at beat 2
        let peak = |s: &[f32]| s.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        assert!(peak(&accented[..4000]) > peak(&even[..4000]));
        assert_eq!(peak(&accented[22050..26050]), peak(&even[22050..26050]));
    }

    #[test]
    fn test_volume_scales_samples() {
        let mut config = test_config();
        config.set_click_volume(0.5);
        let half = render_click_track(&config, 1, 44100);

        config.set_click_volume(1.0);
        let full = render_click_track(&config, 1, 44100);

        let peak = |s: &[f32]| s.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        assert!((peak(&half) - peak(&full) * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_wav_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("click.wav");

        let config = test_config();
        render_click_wav(&path, &config, 2, 22050).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.bits_per_sample, 16);
        // Two 4/4 bars at 120 bpm = 4 seconds
        assert_eq!(reader.len(), 4 * 22050);
    }
}
