// Transport Engine - polling driver around the lookahead scheduler
// Scheduling decisions run against the backend clock; observable effects
// (click tones, display-bar updates) are handed to injectable collaborators

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::scheduler::{LookaheadScheduler, SchedulerEvent, POLL_INTERVAL_MS};
use super::state::{AccentMode, PlaybackState, SwitchOffset, TransportConfig};
use crate::audio::AudioOutput;

/// Monotonic clock the scheduler reads event times against
pub trait TransportClock: Send + Sync {
    /// Seconds elapsed on this clock
    fn now(&self) -> f64;
}

/// Receiver for click effects, scheduled at exact clock times
pub trait ClickSink: Send {
    /// Queue a click to sound at `time` on the transport clock
    fn schedule_click(&mut self, time: f64, accent: bool);

    /// Update the click gain scalar [0.0, 1.0]
    fn set_gain(&mut self, _gain: f32) {}
}

/// Wall-clock fallback used when no audio backend is available
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportClock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Sink that discards clicks; paired with `SystemClock` when audio is
/// unavailable so the transport still runs, silently
pub struct NullSink;

impl ClickSink for NullSink {
    fn schedule_click(&mut self, _time: f64, _accent: bool) {}
}

struct TransportInner {
    config: TransportConfig,
    scheduler: LookaheadScheduler,
    /// Deferred display-bar switches not yet due
    pending_display: Vec<(f64, usize)>,
}

struct Backend {
    clock: Arc<dyn TransportClock>,
    sink: Arc<Mutex<dyn ClickSink>>,
    /// Keeps the audio stream alive across stop/start cycles
    _output: Option<AudioOutput>,
    /// True when this is the silent fallback; a later start retries audio
    fallback: bool,
}

/// The metronome facade: owns the polling worker and the backend seams.
///
/// One polling worker at most is ever active; starting cancels and joins any
/// prior worker first. Stopping cancels future scheduling only - clicks
/// already handed to the sink play out.
pub struct Metronome {
    inner: Arc<Mutex<TransportInner>>,
    backend: Option<Backend>,
    stop_signal: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Metronome {
    /// Create a metronome with the default audio backend, acquired lazily on
    /// the first `start` (audio resources want a user gesture behind them)
    pub fn new(config: TransportConfig, bar_count: usize) -> Self {
        Metronome {
            inner: Arc::new(Mutex::new(TransportInner {
                config,
                scheduler: LookaheadScheduler::new(bar_count),
                pending_display: Vec::new(),
            })),
            backend: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Create a metronome over injected clock/sink collaborators.
    /// Tests drive the transport through fakes this way.
    pub fn with_backend<C, S>(config: TransportConfig, bar_count: usize, clock: C, sink: S) -> Self
    where
        C: TransportClock + 'static,
        S: ClickSink + 'static,
    {
        let mut metronome = Self::new(config, bar_count);
        metronome.backend = Some(Backend {
            clock: Arc::new(clock),
            sink: Arc::new(Mutex::new(sink)),
            _output: None,
            fallback: false,
        });
        metronome
    }

    /// Start (or restart) playback.
    ///
    /// Resumes from the last beat/bar position; the first click lands a fixed
    /// small delay after the clock's current time.
    pub fn start(&mut self) {
        self.cancel_worker();
        self.ensure_backend();

        let backend = self.backend.as_ref().expect("backend installed above");
        let clock = Arc::clone(&backend.clock);
        let sink = Arc::clone(&backend.sink);
        let inner = Arc::clone(&self.inner);

        {
            let mut guard = inner.lock().unwrap();
            guard.pending_display.clear();
            // Re-arm even if a previous session never saw a clean stop
            guard.scheduler.stop();
            guard.scheduler.start(clock.now());
        }

        self.stop_signal.store(false, Ordering::SeqCst);
        let stop_signal = Arc::clone(&self.stop_signal);

        log::info!("transport started");
        self.worker = Some(thread::spawn(move || {
            while !stop_signal.load(Ordering::SeqCst) {
                let now = clock.now();
                {
                    let mut guard = inner.lock().unwrap();
                    let TransportInner {
                        config,
                        scheduler,
                        pending_display,
                    } = &mut *guard;

                    let events = scheduler.schedule(now, config);

                    let mut sink_guard = sink.lock().unwrap();
                    sink_guard.set_gain(config.click_volume);
                    for event in events {
                        match event {
                            SchedulerEvent::Click { time, accent } => {
                                sink_guard.schedule_click(time, accent);
                            }
                            SchedulerEvent::DisplayBar { time, bar } => {
                                pending_display.push((time, bar));
                            }
                        }
                    }
                    drop(sink_guard);

                    pending_display.retain(|&(time, bar)| {
                        if time <= now {
                            scheduler.set_display_bar(bar);
                            false
                        } else {
                            true
                        }
                    });
                }
                thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
            }
        }));
    }

    /// Stop playback, freezing the transport position for a later resume.
    /// Display switches already due are applied; undue ones are dropped.
    pub fn stop(&mut self) {
        self.cancel_worker();

        let now = self.backend.as_ref().map(|b| b.clock.now());
        let mut guard = self.inner.lock().unwrap();
        let TransportInner {
            scheduler,
            pending_display,
            ..
        } = &mut *guard;

        scheduler.stop();
        if let Some(now) = now {
            for (time, bar) in pending_display.drain(..) {
                if time <= now {
                    scheduler.set_display_bar(bar);
                }
            }
        } else {
            pending_display.clear();
        }

        log::info!("transport stopped");
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().unwrap().scheduler.is_running()
    }

    /// Snapshot of the transport position
    pub fn playback(&self) -> PlaybackState {
        self.inner.lock().unwrap().scheduler.playback()
    }

    /// Snapshot of the configuration
    pub fn config(&self) -> TransportConfig {
        self.inner.lock().unwrap().config.clone()
    }

    /// Set tempo; takes effect on the next scheduling pass
    pub fn set_bpm(&self, bpm: f64) {
        self.inner.lock().unwrap().config.set_bpm(bpm);
    }

    /// Set beats per bar; resets the beat counter on the next pass
    pub fn set_beats_per_bar(&self, beats: u32) {
        self.inner.lock().unwrap().config.set_beats_per_bar(beats);
    }

    /// Set accent placement; takes effect on the next scheduling pass
    pub fn set_accent(&self, accent: AccentMode) {
        self.inner.lock().unwrap().config.accent = accent;
    }

    /// Set the display-bar anticipation offset
    pub fn set_switch_offset(&self, offset: SwitchOffset) {
        self.inner.lock().unwrap().config.switch_offset = offset;
    }

    /// Set click volume [0.0, 1.0]
    pub fn set_click_volume(&self, gain: f32) {
        self.inner.lock().unwrap().config.set_click_volume(gain);
    }

    /// Install the audio backend if missing, retrying after earlier failures.
    /// A failed build degrades to the silent wall-clock fallback.
    fn ensure_backend(&mut self) {
        let retry = match &self.backend {
            None => true,
            Some(backend) => backend.fallback,
        };
        if !retry {
            return;
        }

        match AudioOutput::spawn() {
            Ok(output) => {
                self.backend = Some(Backend {
                    clock: Arc::new(output.clock()),
                    sink: Arc::new(Mutex::new(output.sink())),
                    _output: Some(output),
                    fallback: false,
                });
            }
            Err(err) => {
                if self.backend.is_none() {
                    log::warn!("audio output unavailable ({}); running silently", err);
                    self.backend = Some(Backend {
                        clock: Arc::new(SystemClock::new()),
                        sink: Arc::new(Mutex::new(NullSink)),
                        _output: None,
                        fallback: true,
                    });
                } else {
                    log::warn!("audio output still unavailable ({})", err);
                }
            }
        }
    }

    fn cancel_worker(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Metronome {
    fn drop(&mut self) {
        self.cancel_worker();
    }
}
