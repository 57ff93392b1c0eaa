//! Audio source seam.
//!
//! One call returns at most one fixed-size block of 16-bit PCM samples.
//! `Ok(None)` means no block was ready this tick, a transient condition the
//! polling loop simply retries on its next audio gate.

use crate::defaults;
use crate::error::{LumenError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Trait for microphone-style block sources.
///
/// This trait allows swapping implementations (real audio device vs mock).
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    fn stop(&mut self) -> Result<()>;

    /// Read one block of samples, or `None` when no block is ready.
    fn read_block(&mut self) -> Result<Option<Vec<i16>>>;
}

/// Configuration for audio source initialization.
#[derive(Debug, Clone)]
pub struct AudioSourceConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub block_size: usize,
}

impl Default for AudioSourceConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            block_size: defaults::BLOCK_SIZE,
        }
    }
}

/// Mock audio source for testing.
///
/// Serves queued blocks in order, then reports "no block ready". Clones
/// share the queue, so tests can keep feeding blocks after handing the
/// source to the controller.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    blocks: Arc<Mutex<VecDeque<Vec<i16>>>>,
    reads: Arc<Mutex<usize>>,
    is_started: bool,
    should_fail_start: bool,
    should_fail_read: bool,
}

impl MockAudioSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self {
            blocks: Arc::new(Mutex::new(VecDeque::new())),
            reads: Arc::new(Mutex::new(0)),
            is_started: false,
            should_fail_start: false,
            should_fail_read: false,
        }
    }

    /// Configure the mock to fail on start, simulating a broken microphone.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configure the mock to fail reads once its queue is empty, simulating
    /// a capture driver that errors instead of reporting "no block ready".
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Queue a block to be served by a future `read_block` call.
    pub fn push_block(&self, samples: Vec<i16>) {
        self.blocks.lock().unwrap().push_back(samples);
    }

    /// Number of `read_block` calls made so far.
    pub fn reads(&self) -> usize {
        *self.reads.lock().unwrap()
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(LumenError::AudioCapture {
                message: "mock start failure".to_string(),
            });
        }
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_block(&mut self) -> Result<Option<Vec<i16>>> {
        *self.reads.lock().unwrap() += 1;
        match self.blocks.lock().unwrap().pop_front() {
            Some(block) => Ok(Some(block)),
            None if self.should_fail_read => Err(LumenError::AudioCapture {
                message: "mock read failure".to_string(),
            }),
            None => Ok(None),
        }
    }
}
