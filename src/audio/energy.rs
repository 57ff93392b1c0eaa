//! Short-term signal energy estimation.
//!
//! Computes RMS energy per audio block and keeps a fixed-capacity ring of
//! recent readings whose arithmetic mean serves as the adaptive baseline for
//! voice-activity detection. The ring is zero-initialized, so the average is
//! defined before it has fully warmed up.

use crate::defaults;

/// One RMS energy reading derived from a single audio block.
///
/// Values keep the raw i16 amplitude scale (0 .. ~32767), matching the
/// absolute detection threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyReading {
    pub value: f32,
}

/// RMS estimator with a rolling history ring.
///
/// Sole owner of the ring: the detector only ever sees the read-only
/// moving average.
#[derive(Debug, Clone)]
pub struct EnergyEstimator {
    history: [f32; defaults::ENERGY_HISTORY_LEN],
    cursor: usize,
}

impl EnergyEstimator {
    /// Create an estimator with a zeroed history.
    pub fn new() -> Self {
        Self {
            history: [0.0; defaults::ENERGY_HISTORY_LEN],
            cursor: 0,
        }
    }

    /// Compute the RMS of one block and push it into the history ring.
    ///
    /// Returns `None` for an empty block: no reading is available and the
    /// ring is left untouched.
    pub fn push_block(&mut self, samples: &[i16]) -> Option<EnergyReading> {
        if samples.is_empty() {
            return None;
        }

        let sum_squares: f64 = samples
            .iter()
            .map(|&sample| {
                let s = sample as f64;
                s * s
            })
            .sum();
        let rms = (sum_squares / samples.len() as f64).sqrt() as f32;

        self.history[self.cursor] = rms;
        self.cursor = (self.cursor + 1) % self.history.len();

        Some(EnergyReading { value: rms })
    }

    /// Arithmetic mean of the history ring.
    pub fn moving_average(&self) -> f32 {
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }
}

impl Default for EnergyEstimator {
    fn default() -> Self {
        Self::new()
    }
}
