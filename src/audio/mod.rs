//! Audio boundary: block capture in, tone bursts out, and the energy /
//! voice-activity analysis that sits between them.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod energy;
pub mod source;
pub mod tone;
pub mod vad;

pub use energy::{EnergyEstimator, EnergyReading};
pub use source::{AudioSource, MockAudioSource};
pub use tone::{FeedbackCue, LogToneSink, MockToneSink, Tone, ToneSink};
pub use vad::{VadConfig, VoiceActivityDetector, VoiceActivityEvent};
