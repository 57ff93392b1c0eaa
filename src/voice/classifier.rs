//! Command classification.
//!
//! Maps a finished capture window to a symbolic action. Two interchangeable
//! implementations exist behind one trait so a real speech recognizer can be
//! substituted later without touching the capture machine:
//!
//! - [`DurationClassifier`]: a timing heuristic. It does not analyze audio
//!   content at all and is a stand-in for a recognizer, not one.
//! - [`PhraseClassifier`]: substring matching over recognized phrase text,
//!   used when captures arrive with a transcript attached.

use crate::command::Action;
use crate::defaults;
use crate::voice::capture::CaptureWindow;

/// Trait mapping a capture window to an action.
pub trait CommandClassifier: Send {
    /// Classify a finished window. `None` means no command was recognized.
    fn classify(&mut self, window: &CaptureWindow) -> Option<Action>;

    /// Name of this classifier for logging.
    fn name(&self) -> &'static str;
}

/// Timing-heuristic classifier.
///
/// Valid only for durations in (500 ms, 3000 ms]. Longer utterances
/// (> 1000 ms) alternate deterministically between TurnOn and TurnOff;
/// (600 ms, 1000 ms] maps to a status query; anything else is unrecognized.
///
/// The alternating toggle is a hidden cross-call dependency, held here as
/// explicit classifier state rather than anything ambient. A design smell
/// rather than a feature; do not extend it.
#[derive(Debug, Clone, Default)]
pub struct DurationClassifier {
    last_was_on: bool,
}

impl DurationClassifier {
    /// Create a classifier whose first long capture yields TurnOn.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandClassifier for DurationClassifier {
    fn classify(&mut self, window: &CaptureWindow) -> Option<Action> {
        let ms = window.duration.as_millis() as u64;

        if ms <= defaults::MIN_COMMAND_MS || ms > defaults::MAX_COMMAND_MS {
            return None;
        }

        if ms > defaults::TOGGLE_COMMAND_MS {
            self.last_was_on = !self.last_was_on;
            Some(if self.last_was_on {
                Action::TurnOn
            } else {
                Action::TurnOff
            })
        } else if ms > defaults::STATUS_COMMAND_MS {
            Some(Action::GetStatus)
        } else {
            None
        }
    }

    fn name(&self) -> &'static str {
        "duration"
    }
}

/// Phrase table: first entry whose phrases match wins, ties broken by table
/// order; matching is lowercase substring.
const PHRASE_TABLE: &[(&[&str], fn() -> Action)] = &[
    (&["turn on", "light on", "switch on"], || Action::TurnOn),
    (&["turn off", "light off", "switch off"], || Action::TurnOff),
    (&["status", "state", "check"], || Action::GetStatus),
];

/// Phrase-matching classifier for captures that carry recognized text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhraseClassifier;

impl PhraseClassifier {
    /// Create a phrase classifier.
    pub fn new() -> Self {
        Self
    }

    /// Match a bare phrase outside the capture flow.
    pub fn classify_text(text: &str) -> Option<Action> {
        let lowered = text.to_lowercase();
        for (phrases, action) in PHRASE_TABLE {
            if phrases.iter().any(|p| lowered.contains(p)) {
                return Some(action());
            }
        }
        None
    }
}

impl CommandClassifier for PhraseClassifier {
    fn classify(&mut self, window: &CaptureWindow) -> Option<Action> {
        Self::classify_text(window.transcript.as_deref()?)
    }

    fn name(&self) -> &'static str {
        "phrase"
    }
}
