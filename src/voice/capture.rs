//! Voice-command capture state machine.
//!
//! Owns the lifecycle of a single command attempt: Idle until voice activity
//! appears, then Capturing for exactly one fixed window, then back to Idle
//! with the finished window handed to the classifier. Single-flight by
//! construction: activity arriving mid-capture neither resets nor extends
//! the window, and there is no cancellation path besides the timeout.
//!
//! The machine takes the current `Instant` from its caller so the whole
//! polling loop shares one clock read per iteration.

use crate::defaults;
use std::time::{Duration, Instant};

/// Configuration for command capture.
#[derive(Debug, Clone, Copy)]
pub struct CaptureConfig {
    /// Fixed time budget attributed to one command attempt.
    pub window: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(defaults::CAPTURE_WINDOW_MS),
        }
    }
}

/// Current state of the capture machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No capture in progress.
    Idle,
    /// A capture attempt is running.
    Capturing,
}

/// A finished capture window, ready for classification.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureWindow {
    /// Elapsed time from capture start to resolution.
    pub duration: Duration,
    /// Moving-average energy at resolution time.
    pub energy_average: f32,
    /// Recognized phrase text accumulated during the window, if any.
    pub transcript: Option<String>,
}

/// State transitions reported to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureTransition {
    /// A new capture attempt just started.
    Started,
    /// The window elapsed; the capture is resolved whether or not a command
    /// was recognized.
    Finished(CaptureWindow),
}

/// Single-flight capture state machine.
#[derive(Debug, Clone)]
pub struct CaptureMachine {
    config: CaptureConfig,
    started_at: Option<Instant>,
    transcript: String,
}

impl CaptureMachine {
    /// Create an idle machine.
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            started_at: None,
            transcript: String::new(),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> CaptureState {
        if self.started_at.is_some() {
            CaptureState::Capturing
        } else {
            CaptureState::Idle
        }
    }

    /// Append recognized phrase text to the working accumulator.
    ///
    /// Ignored while idle; the accumulator is cleared when a capture starts.
    pub fn append_transcript(&mut self, text: &str) {
        if self.started_at.is_some() {
            if !self.transcript.is_empty() {
                self.transcript.push(' ');
            }
            self.transcript.push_str(text);
        }
    }

    /// Advance the machine by one observation.
    ///
    /// `active` is this block's voice-activity decision, `now` the loop's
    /// clock reading, `energy_average` the contemporaneous moving average.
    pub fn observe(
        &mut self,
        active: bool,
        now: Instant,
        energy_average: f32,
    ) -> Option<CaptureTransition> {
        match self.started_at {
            None => {
                if active {
                    self.started_at = Some(now);
                    self.transcript.clear();
                    Some(CaptureTransition::Started)
                } else {
                    None
                }
            }
            Some(started) => {
                // Further activity is ignored: the window neither resets nor
                // extends.
                let elapsed = now.duration_since(started);
                if elapsed > self.config.window {
                    self.started_at = None;
                    let transcript = if self.transcript.is_empty() {
                        None
                    } else {
                        Some(std::mem::take(&mut self.transcript))
                    };
                    Some(CaptureTransition::Finished(CaptureWindow {
                        duration: elapsed,
                        energy_average,
                        transcript,
                    }))
                } else {
                    None
                }
            }
        }
    }
}

impl Default for CaptureMachine {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(window_ms: u64) -> CaptureMachine {
        CaptureMachine::new(CaptureConfig {
            window: Duration::from_millis(window_ms),
        })
    }

    #[test]
    fn starts_on_first_activity() {
        let mut m = machine(1500);
        let t0 = Instant::now();

        assert_eq!(m.observe(false, t0, 0.0), None);
        assert_eq!(m.state(), CaptureState::Idle);

        assert_eq!(m.observe(true, t0, 0.0), Some(CaptureTransition::Started));
        assert_eq!(m.state(), CaptureState::Capturing);
    }

    #[test]
    fn finishes_only_after_window_elapses() {
        let mut m = machine(1500);
        let t0 = Instant::now();
        m.observe(true, t0, 0.0);

        assert_eq!(m.observe(false, t0 + Duration::from_millis(1500), 0.0), None);

        let transition = m.observe(false, t0 + Duration::from_millis(1501), 42.0);
        match transition {
            Some(CaptureTransition::Finished(window)) => {
                assert_eq!(window.duration, Duration::from_millis(1501));
                assert_eq!(window.energy_average, 42.0);
                assert_eq!(window.transcript, None);
            }
            other => panic!("expected Finished, got {:?}", other),
        }
        assert_eq!(m.state(), CaptureState::Idle);
    }

    #[test]
    fn activity_mid_capture_does_not_reset_the_start() {
        let mut m = machine(1000);
        let t0 = Instant::now();
        m.observe(true, t0, 0.0);

        // A second burst of activity halfway through must not move the start
        // timestamp: the window still closes relative to t0.
        assert_eq!(m.observe(true, t0 + Duration::from_millis(500), 0.0), None);
        assert!(matches!(
            m.observe(false, t0 + Duration::from_millis(1001), 0.0),
            Some(CaptureTransition::Finished(_))
        ));
    }

    #[test]
    fn at_most_one_capture_in_flight() {
        let mut m = machine(1000);
        let t0 = Instant::now();

        assert_eq!(m.observe(true, t0, 0.0), Some(CaptureTransition::Started));
        // Continuous activity never yields a second Started until the first
        // window resolves.
        for ms in (100..=1000).step_by(100) {
            assert_eq!(m.observe(true, t0 + Duration::from_millis(ms), 0.0), None);
        }
        assert!(matches!(
            m.observe(true, t0 + Duration::from_millis(1001), 0.0),
            Some(CaptureTransition::Finished(_))
        ));
        // Back to Idle: new activity starts a fresh capture.
        assert_eq!(
            m.observe(true, t0 + Duration::from_millis(1100), 0.0),
            Some(CaptureTransition::Started)
        );
    }

    #[test]
    fn capture_runs_to_the_window_even_in_silence() {
        // No cancellation path: silence after the trigger still resolves at
        // the fixed window.
        let mut m = machine(800);
        let t0 = Instant::now();
        m.observe(true, t0, 0.0);
        assert_eq!(m.observe(false, t0 + Duration::from_millis(400), 0.0), None);
        assert!(matches!(
            m.observe(false, t0 + Duration::from_millis(801), 0.0),
            Some(CaptureTransition::Finished(_))
        ));
    }

    #[test]
    fn transcript_accumulates_during_capture_and_clears_on_start() {
        let mut m = machine(1000);
        let t0 = Instant::now();

        // Ignored while idle.
        m.append_transcript("stale");

        m.observe(true, t0, 0.0);
        m.append_transcript("turn");
        m.append_transcript("on");

        let transition = m.observe(false, t0 + Duration::from_millis(1001), 0.0);
        match transition {
            Some(CaptureTransition::Finished(window)) => {
                assert_eq!(window.transcript.as_deref(), Some("turn on"));
            }
            other => panic!("expected Finished, got {:?}", other),
        }

        // Next capture starts with a clean accumulator.
        m.observe(true, t0 + Duration::from_millis(1100), 0.0);
        let transition = m.observe(false, t0 + Duration::from_millis(2200), 0.0);
        match transition {
            Some(CaptureTransition::Finished(window)) => {
                assert_eq!(window.transcript, None);
            }
            other => panic!("expected Finished, got {:?}", other),
        }
    }
}
