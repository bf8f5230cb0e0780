// Audio Output - cpal stream with a sample-position transport clock
// The stream's running sample counter is the monotonic clock the scheduler
// reads; clicks are mixed in the callback at their exact start sample, so
// tick spacing is sample-accurate regardless of UI-thread load

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use thiserror::Error;

use crate::render::click::ClickTone;
use crate::transport::{ClickSink, TransportClock};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output device available")]
    NoOutputDevice,

    #[error("failed to get default output config: {0}")]
    ConfigError(String),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to build output stream: {0}")]
    StreamError(String),
}

/// A click waiting for its start sample to arrive
struct PendingClick {
    start_sample: u64,
    accent: bool,
}

/// State shared between the audio callback, the clock, and the sink
struct OutputShared {
    /// Samples rendered so far; the clock reading is derived from this
    sample_pos: AtomicU64,
    sample_rate: u32,
    /// Clicks queued by the scheduler, drained by the callback
    queue: Mutex<Vec<PendingClick>>,
    /// Click gain scalar as f32 bits
    volume: AtomicU32,
    alive: AtomicBool,
}

/// The live audio backend.
///
/// The cpal stream is owned by a dedicated thread (streams are not `Send`);
/// everyone else talks to it through the shared state. The stream survives
/// transport stop/start cycles and dies when this handle is dropped, letting
/// clicks already queued play out in the meantime.
pub struct AudioOutput {
    shared: Arc<OutputShared>,
    worker: Option<JoinHandle<()>>,
}

impl AudioOutput {
    /// Open the default output device and start the stream.
    ///
    /// Best-effort by contract: callers treat every error as "run silently",
    /// so failures describe themselves instead of panicking.
    pub fn spawn() -> Result<AudioOutput, AudioError> {
        let (result_tx, result_rx) = mpsc::channel();

        let worker = thread::spawn(move || match build_stream() {
            Ok((stream, shared)) => {
                let _ = result_tx.send(Ok(Arc::clone(&shared)));
                while shared.alive.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(50));
                }
                drop(stream);
            }
            Err(err) => {
                let _ = result_tx.send(Err(err));
            }
        });

        match result_rx.recv() {
            Ok(Ok(shared)) => Ok(AudioOutput {
                shared,
                worker: Some(worker),
            }),
            Ok(Err(err)) => {
                let _ = worker.join();
                Err(err)
            }
            Err(_) => Err(AudioError::StreamError(
                "audio thread terminated unexpectedly".to_string(),
            )),
        }
    }

    /// The stream's sample rate
    pub fn sample_rate(&self) -> u32 {
        self.shared.sample_rate
    }

    /// A clock handle reading the stream's sample position
    pub fn clock(&self) -> AudioClock {
        AudioClock {
            shared: Arc::clone(&self.shared),
        }
    }

    /// A sink handle queuing clicks into the stream
    pub fn sink(&self) -> ClickQueue {
        ClickQueue {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.shared.alive.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Transport clock backed by the stream's sample counter
pub struct AudioClock {
    shared: Arc<OutputShared>,
}

impl TransportClock for AudioClock {
    fn now(&self) -> f64 {
        self.shared.sample_pos.load(Ordering::Relaxed) as f64 / self.shared.sample_rate as f64
    }
}

/// Click sink feeding the stream's queue
pub struct ClickQueue {
    shared: Arc<OutputShared>,
}

impl ClickSink for ClickQueue {
    fn schedule_click(&mut self, time: f64, accent: bool) {
        let start_sample = (time.max(0.0) * self.shared.sample_rate as f64).round() as u64;
        self.shared
            .queue
            .lock()
            .unwrap()
            .push(PendingClick {
                start_sample,
                accent,
            });
    }

    fn set_gain(&mut self, gain: f32) {
        self.shared
            .volume
            .store(gain.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }
}

fn build_stream() -> Result<(cpal::Stream, Arc<OutputShared>), AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(AudioError::NoOutputDevice)?;
    let supported = device
        .default_output_config()
        .map_err(|e| AudioError::ConfigError(e.to_string()))?;

    if supported.sample_format() != SampleFormat::F32 {
        return Err(AudioError::UnsupportedFormat(format!(
            "{:?}",
            supported.sample_format()
        )));
    }

    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    let stream_config: cpal::StreamConfig = supported.into();

    let shared = Arc::new(OutputShared {
        sample_pos: AtomicU64::new(0),
        sample_rate,
        queue: Mutex::new(Vec::new()),
        volume: AtomicU32::new(1.0f32.to_bits()),
        alive: AtomicBool::new(true),
    });

    let accent_tone = ClickTone::accent(sample_rate);
    let beat_tone = ClickTone::beat(sample_rate);
    let callback_shared = Arc::clone(&shared);
    let mut active: Vec<PendingClick> = Vec::new();

    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let start = callback_shared.sample_pos.load(Ordering::Relaxed);
                {
                    let mut queue = callback_shared.queue.lock().unwrap();
                    active.append(&mut queue);
                }
                let volume = f32::from_bits(callback_shared.volume.load(Ordering::Relaxed));

                let frames = data.len() / channels;
                mix_clicks(
                    &mut active,
                    &accent_tone,
                    &beat_tone,
                    volume,
                    start,
                    data,
                    channels,
                );
                callback_shared
                    .sample_pos
                    .store(start + frames as u64, Ordering::Relaxed);
            },
            move |err| {
                log::error!("audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| AudioError::StreamError(e.to_string()))?;

    stream
        .play()
        .map_err(|e| AudioError::StreamError(e.to_string()))?;

    log::info!(
        "audio output running: {} Hz, {} channel(s)",
        sample_rate,
        channels
    );

    Ok((stream, shared))
}

/// Mix every active click into an interleaved output block starting at
/// absolute sample `start`. Clicks are dropped once fully played; clicks
/// scheduled in the future stay queued untouched.
fn mix_clicks(
    active: &mut Vec<PendingClick>,
    accent_tone: &ClickTone,
    beat_tone: &ClickTone,
    volume: f32,
    start: u64,
    data: &mut [f32],
    channels: usize,
) {
    let frames = data.len() / channels;

    for frame in 0..frames {
        let pos = start + frame as u64;
        let mut sample = 0.0f32;

        active.retain(|click| {
            if pos < click.start_sample {
                return true;
            }
            let offset = (pos - click.start_sample) as usize;
            let tone = if click.accent {
                accent_tone.samples()
            } else {
                beat_tone.samples()
            };
            match tone.get(offset) {
                Some(&value) => {
                    sample += value * volume;
                    true
                }
                None => false,
            }
        });

        let value = sample.clamp(-1.0, 1.0);
        for channel in 0..channels {
            data[frame * channels + channel] = value;
        }
    }
}
