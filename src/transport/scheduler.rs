// Lookahead Scheduler - drift-free click and bar-display scheduling
// Event times come from an accumulated running sum of seconds-per-beat
// against the audio clock, never from polling-callback wall time

use serde::{Deserialize, Serialize};

use super::state::{PlaybackState, TransportConfig};

/// Delay between starting the transport and the first click, so the first
/// event cannot be missed to main-thread jitter
pub const START_DELAY: f64 = 0.05;

/// How far ahead of the audio clock each pass schedules events
pub const LOOKAHEAD_HORIZON: f64 = 0.1;

/// Wall-clock polling period of the driver loop, in milliseconds.
/// Shorter than any beat at the supported tempo range.
pub const POLL_INTERVAL_MS: u64 = 25;

/// Offset applied to intra-bar display updates so they land just after
/// their click
pub const DISPLAY_EPSILON: f64 = 0.005;

/// An effect the scheduler asks its driver to perform.
///
/// The scheduler never touches the audio backend or the UI itself; each tick
/// returns the effects to apply, which keeps the state machine pure and
/// testable against a fake clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SchedulerEvent {
    /// Emit a click tone at an exact audio-clock time
    Click { time: f64, accent: bool },

    /// Set the displayed bar once the audio clock reaches `time`
    DisplayBar { time: f64, bar: usize },
}

/// Two-state (Idle/Running) lookahead scheduler over a beat/bar counter.
///
/// While running, `schedule` drains every beat whose event time falls within
/// the lookahead horizon of the supplied clock reading. Stopping freezes the
/// counters so a later start resumes from the same beat and bar.
#[derive(Debug, Clone)]
pub struct LookaheadScheduler {
    bar_count: usize,
    running: bool,
    next_event_time: f64,
    /// Meter seen on the previous pass; a change hard-resets the beat counter
    last_meter: Option<u32>,
    state: PlaybackState,
}

impl LookaheadScheduler {
    /// Create an idle scheduler for a progression of `bar_count` bars
    pub fn new(bar_count: usize) -> Self {
        LookaheadScheduler {
            bar_count: bar_count.max(1),
            running: false,
            next_event_time: 0.0,
            last_meter: None,
            state: PlaybackState::default(),
        }
    }

    /// Idle -> Running. The first click lands `START_DELAY` after `now`;
    /// beat and bar counters keep their last values so playback resumes
    /// where it stopped.
    pub fn start(&mut self, now: f64) {
        if self.running {
            return;
        }
        self.running = true;
        self.next_event_time = now + START_DELAY;
    }

    /// Running -> Idle. Counters are frozen, not reset.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of bars the bar counter wraps at
    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    /// Snapshot of the transport position
    pub fn playback(&self) -> PlaybackState {
        self.state
    }

    /// Apply a deferred display-bar switch once its time has arrived
    pub fn set_display_bar(&mut self, bar: usize) {
        self.state.display_bar = bar;
    }

    /// One polling pass: drain every beat event inside the lookahead horizon.
    ///
    /// Configuration is re-read each pass, so tempo/accent/offset changes take
    /// effect on the next pass without a restart. A meter change resets the
    /// beat counter to 1: changing bar length mid-bar is a hard reset, not a
    /// reinterpretation of the current position.
    pub fn schedule(&mut self, now: f64, config: &TransportConfig) -> Vec<SchedulerEvent> {
        let mut effects = Vec::new();
        if !self.running {
            return effects;
        }

        if let Some(previous) = self.last_meter {
            if previous != config.beats_per_bar {
                self.state.current_beat = 1;
            }
        }
        self.last_meter = Some(config.beats_per_bar);

        let seconds_per_beat = config.seconds_per_beat();

        while self.next_event_time < now + LOOKAHEAD_HORIZON {
            let beat = self.state.current_beat;
            let time = self.next_event_time;

            effects.push(SchedulerEvent::Click {
                time,
                accent: config.accent.accents(beat, config.beats_per_bar),
            });

            if beat == config.beats_per_bar {
                // Bar boundary: the display anticipates the next bar by a
                // musician-configurable fraction of this final beat
                let next_bar = self.state.current_bar % self.bar_count + 1;
                effects.push(SchedulerEvent::DisplayBar {
                    time: time + seconds_per_beat * config.switch_offset.fraction(),
                    bar: next_bar,
                });
            } else {
                // Mid-bar the display simply follows the transport
                effects.push(SchedulerEvent::DisplayBar {
                    time: time + DISPLAY_EPSILON,
                    bar: self.state.current_bar,
                });
            }

            self.state.current_beat = beat % config.beats_per_bar + 1;
            self.next_event_time += seconds_per_beat;
            if self.state.current_beat == 1 {
                self.state.current_bar = self.state.current_bar % self.bar_count + 1;
            }
        }

        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::state::{AccentMode, SwitchOffset};

    fn config_at(bpm: f64) -> TransportConfig {
        let mut config = TransportConfig::default();
        config.set_bpm(bpm);
        config
    }

    fn clicks(effects: &[SchedulerEvent]) -> Vec<(f64, bool)> {
        effects
            .iter()
            .filter_map(|e| match e {
                SchedulerEvent::Click { time, accent } => Some((*time, *accent)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_idle_scheduler_emits_nothing() {
        let mut scheduler = LookaheadScheduler::new(12);
        let config = config_at(120.0);
        assert!(scheduler.schedule(0.0, &config).is_empty());
    }

    #[test]
    fn test_click_times_are_exact_despite_polling_jitter() {
        // 8 simulated seconds at 120 bpm: 16 clicks at 0.05, 0.55, 1.05, ...
        let mut scheduler = LookaheadScheduler::new(12);
        let config = config_at(120.0);
        scheduler.start(0.0);

        // Irregular polling instants, far from a clean 25 ms cadence
        let mut all = Vec::new();
        let mut now = 0.0;
        let jitter = [0.013, 0.041, 0.007, 0.033, 0.026, 0.019, 0.038];
        let mut i = 0;
        while now < 8.0 - LOOKAHEAD_HORIZON {
            all.extend(clicks(&scheduler.schedule(now, &config)));
            now += jitter[i % jitter.len()];
            i += 1;
        }

        assert_eq!(all.len(), 16);
        for (k, (time, _)) in all.iter().enumerate() {
            let expected = 0.05 + 0.5 * k as f64;
            assert!(
                (time - expected).abs() < 1e-9,
                "click {} at {} expected {}",
                k,
                time,
                expected
            );
        }
    }

    #[test]
    fn test_no_double_fire_when_polled_densely() {
        let mut scheduler = LookaheadScheduler::new(12);
        let config = config_at(120.0);
        scheduler.start(0.0);

        // Many passes at the same clock reading must not re-emit a beat
        let first = clicks(&scheduler.schedule(0.0, &config));
        let again = clicks(&scheduler.schedule(0.0, &config));
        assert_eq!(first.len(), 1);
        assert!(again.is_empty());
    }

    #[test]
    fn test_accent_patterns() {
        let mut config = config_at(120.0);
        config.accent = AccentMode::Downbeat;

        let mut scheduler = LookaheadScheduler::new(12);
        scheduler.start(0.0);

        let mut accents = Vec::new();
        let mut now = 0.0;
        while accents.len() < 8 {
            accents.extend(clicks(&scheduler.schedule(now, &config)).into_iter().map(|c| c.1));
            now += 0.025;
        }
        assert_eq!(&accents[..8], &[true, false, false, false, true, false, false, false]);

        // Backbeat accents 2 and 4 in common time
        let mut config = config_at(120.0);
        config.accent = AccentMode::Backbeat;
        let mut scheduler = LookaheadScheduler::new(12);
        scheduler.start(0.0);

        let mut accents = Vec::new();
        let mut now = 0.0;
        while accents.len() < 8 {
            accents.extend(clicks(&scheduler.schedule(now, &config)).into_iter().map(|c| c.1));
            now += 0.025;
        }
        assert_eq!(&accents[..8], &[false, true, false, true, false, true, false, true]);
    }

    #[test]
    fn test_bar_wraparound_never_skips() {
        // Bars must advance 1 -> 2 -> ... -> 12 -> 1 exactly on beat-1
        // transitions, four clicks per bar
        let mut scheduler = LookaheadScheduler::new(12);
        let config = config_at(240.0);
        scheduler.start(0.0);

        let mut bars_seen = Vec::new();
        let mut clicks_in_bar = Vec::new();
        let mut count = 0usize;
        let mut now = 0.0;

        // Step finely so each pass drains at most one beat
        while count < 12 * 4 * 2 + 1 {
            let n = clicks(&scheduler.schedule(now, &config)).len();
            for _ in 0..n {
                count += 1;
                let bar = scheduler.playback().current_bar;
                match bars_seen.last() {
                    Some(&last) if last == bar => *clicks_in_bar.last_mut().unwrap() += 1,
                    _ => {
                        bars_seen.push(bar);
                        clicks_in_bar.push(1usize);
                    }
                }
            }
            now += 0.01;
        }

        // current_bar advances when the beat counter wraps to 1, which
        // happens as the bar's last click is scheduled; every bar therefore
        // holds exactly beats_per_bar clicks once rolling
        let expected: Vec<usize> = (0..bars_seen.len()).map(|i| i % 12 + 1).collect();
        assert_eq!(bars_seen, expected);
        for (i, &n) in clicks_in_bar.iter().enumerate() {
            if i > 0 && i + 1 < clicks_in_bar.len() {
                assert_eq!(n, 4, "bar run {} held {} clicks", i, n);
            }
        }
    }

    #[test]
    fn test_display_follows_and_anticipates() {
        let mut config = config_at(120.0);
        config.switch_offset = SwitchOffset::And;

        let mut scheduler = LookaheadScheduler::new(12);
        scheduler.start(0.0);

        let mut displays = Vec::new();
        let mut now = 0.0;
        while now < 2.2 {
            for effect in scheduler.schedule(now, &config) {
                if let SchedulerEvent::DisplayBar { time, bar } = effect {
                    displays.push((time, bar));
                }
            }
            now += 0.025;
        }

        // Beats 1-3 keep the display on bar 1 just after each click
        for (k, expected_click) in [0.05, 0.55, 1.05].iter().enumerate() {
            let (time, bar) = displays[k];
            assert_eq!(bar, 1);
            assert!((time - (expected_click + DISPLAY_EPSILON)).abs() < 1e-9);
        }

        // Beat 4 anticipates bar 2 halfway through the beat: 1.55 + 0.25
        let (switch_time, switch_bar) = displays[3];
        assert_eq!(switch_bar, 2);
        assert!((switch_time - 1.80).abs() < 1e-9);
    }

    #[test]
    fn test_immediate_switch_lands_on_final_click() {
        let config = config_at(120.0);
        let mut scheduler = LookaheadScheduler::new(12);
        scheduler.start(0.0);

        let mut boundary = None;
        let mut now = 0.0;
        while boundary.is_none() && now < 3.0 {
            for effect in scheduler.schedule(now, &config) {
                if let SchedulerEvent::DisplayBar { time, bar: 2 } = effect {
                    boundary = Some(time);
                }
            }
            now += 0.025;
        }

        // Beat 4 of bar 1 clicks at 1.55; immediate switch shares its time
        assert!((boundary.unwrap() - 1.55).abs() < 1e-9);
    }

    #[test]
    fn test_tempo_change_applies_next_pass() {
        let mut config = config_at(120.0);
        let mut scheduler = LookaheadScheduler::new(12);
        scheduler.start(0.0);

        let mut times = Vec::new();
        let mut now = 0.0;
        while now < 1.2 {
            times.extend(clicks(&scheduler.schedule(now, &config)).into_iter().map(|c| c.0));
            now += 0.025;
        }

        config.set_bpm(60.0);
        while now < 4.6 {
            times.extend(clicks(&scheduler.schedule(now, &config)).into_iter().map(|c| c.0));
            now += 0.025;
        }

        // Spacing is 0.5 s before the change and 1.0 s after, with no gap or
        // overlap at the splice
        let deltas: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(deltas.iter().take(2).all(|d| (d - 0.5).abs() < 1e-9));
        assert!(deltas.iter().rev().take(2).all(|d| (d - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_meter_change_resets_beat_counter() {
        let mut config = config_at(120.0);
        let mut scheduler = LookaheadScheduler::new(12);
        scheduler.start(0.0);

        // Advance into the bar
        let mut now = 0.0;
        while scheduler.playback().current_beat < 3 {
            scheduler.schedule(now, &config);
            now += 0.025;
        }

        config.set_beats_per_bar(3);
        scheduler.schedule(now, &config);
        assert_eq!(scheduler.playback().current_beat, 1);
    }

    #[test]
    fn test_stop_freezes_position_and_start_resumes() {
        let config = config_at(120.0);
        let mut scheduler = LookaheadScheduler::new(12);
        scheduler.start(0.0);

        let mut now = 0.0;
        while now < 2.6 {
            scheduler.schedule(now, &config);
            now += 0.025;
        }
        scheduler.stop();

        let frozen = scheduler.playback();
        assert!(scheduler.schedule(now + 10.0, &config).is_empty());
        assert_eq!(scheduler.playback(), frozen);

        // Restarting picks the counters back up with a fresh first-click delay
        scheduler.start(100.0);
        let resumed = clicks(&scheduler.schedule(100.0, &config));
        assert_eq!(resumed.len(), 1);
        assert!((resumed[0].0 - 100.05).abs() < 1e-9);
        assert_eq!(scheduler.playback().current_bar, frozen.current_bar);
    }

    #[test]
    fn test_single_beat_meter() {
        let mut config = config_at(120.0);
        config.set_beats_per_bar(1);

        let mut scheduler = LookaheadScheduler::new(4);
        scheduler.start(0.0);

        // Every beat is a bar boundary; bars wrap at 4
        let mut bars = Vec::new();
        let mut now = 0.0;
        while bars.len() < 6 {
            for effect in scheduler.schedule(now, &config) {
                if let SchedulerEvent::DisplayBar { bar, .. } = effect {
                    bars.push(bar);
                }
            }
            now += 0.025;
        }
        assert_eq!(&bars[..6], &[2, 3, 4, 1, 2, 3]);
    }
}
