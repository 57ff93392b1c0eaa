//! Audible feedback cues.
//!
//! The controller only ever emits short square-wave tone bursts described by
//! frequency/duration pairs, no waveform shaping. Each [`FeedbackCue`]
//! expands to a fixed tone sequence; the [`ToneSink`] trait is the seam to
//! whatever renders them (amplifier pin on hardware, log line on a host).

use crate::error::Result;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// One square-wave burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

const fn tone(frequency_hz: u32, duration_ms: u32) -> Tone {
    Tone {
        frequency_hz,
        duration_ms,
    }
}

/// Semantic feedback cues the controller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCue {
    /// Played once after boot.
    Startup,
    /// Short blip when a voice capture starts.
    Listening,
    /// Command accepted and executed.
    Confirm,
    /// Command rejected or capture resolved to nothing.
    Error,
    /// Firmware update session started.
    UpdateStarted,
    /// Firmware update session completed.
    UpdateFinished,
}

impl FeedbackCue {
    /// The tone sequence for this cue.
    pub fn tones(self) -> &'static [Tone] {
        const STARTUP: [Tone; 3] = [tone(600, 100), tone(800, 100), tone(1000, 100)];
        const LISTENING: [Tone; 1] = [tone(1000, 50)];
        const CONFIRM: [Tone; 2] = [tone(800, 150), tone(1200, 150)];
        const ERROR: [Tone; 2] = [tone(400, 250), tone(300, 250)];
        const UPDATE_STARTED: [Tone; 2] = [tone(1000, 200), tone(1200, 200)];
        const UPDATE_FINISHED: [Tone; 3] = [tone(800, 150), tone(1000, 150), tone(1200, 150)];

        match self {
            FeedbackCue::Startup => &STARTUP,
            FeedbackCue::Listening => &LISTENING,
            FeedbackCue::Confirm => &CONFIRM,
            FeedbackCue::Error => &ERROR,
            FeedbackCue::UpdateStarted => &UPDATE_STARTED,
            FeedbackCue::UpdateFinished => &UPDATE_FINISHED,
        }
    }
}

/// Trait for rendering feedback cues.
///
/// This trait allows swapping implementations (real audio output vs mock).
pub trait ToneSink: Send + Sync {
    /// Render the cue's tone sequence.
    fn play(&self, cue: FeedbackCue) -> Result<()>;
}

/// Sink that logs cues instead of producing sound.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogToneSink;

impl ToneSink for LogToneSink {
    fn play(&self, cue: FeedbackCue) -> Result<()> {
        debug!(?cue, tones = cue.tones().len(), "feedback cue");
        Ok(())
    }
}

/// Mock sink for tests; records every cue played.
#[derive(Debug, Clone, Default)]
pub struct MockToneSink {
    played: Arc<Mutex<Vec<FeedbackCue>>>,
}

impl MockToneSink {
    /// Create a new mock sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All cues played so far, in order.
    pub fn played(&self) -> Vec<FeedbackCue> {
        self.played.lock().unwrap().clone()
    }
}

impl ToneSink for MockToneSink {
    fn play(&self, cue: FeedbackCue) -> Result<()> {
        self.played.lock().unwrap().push(cue);
        Ok(())
    }
}
