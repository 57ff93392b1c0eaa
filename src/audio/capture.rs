//! Real audio capture using CPAL (Cross-Platform Audio Library).
//!
//! Captures 16-bit PCM at the configured rate and serves it to the polling
//! loop in fixed-size blocks. Only built with the `cpal-audio` feature; the
//! controller itself depends solely on the [`AudioSource`] trait.

use crate::audio::source::{AudioSource, AudioSourceConfig};
use crate::error::{LumenError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only touched through `&mut self` on the owning
/// source, so there is never concurrent access from multiple threads.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Microphone block source backed by a CPAL input stream.
///
/// The stream callback appends samples to a shared buffer; `read_block`
/// drains one block at a time and reports "no block ready" while the buffer
/// is still filling.
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Option<SendableStream>,
    buffer: Arc<Mutex<Vec<i16>>>,
    sample_rate: u32,
    block_size: usize,
}

impl CpalAudioSource {
    /// Create a new CPAL audio source.
    ///
    /// # Errors
    /// Returns `LumenError::AudioDeviceNotFound` when the named (or default)
    /// input device is unavailable.
    pub fn new(config: &AudioSourceConfig) -> Result<Self> {
        let host = cpal::default_host();

        let device = match &config.device {
            Some(name) => {
                let mut found = None;
                let devices = host.input_devices().map_err(|e| LumenError::AudioCapture {
                    message: format!("Failed to enumerate devices: {}", e),
                })?;
                for dev in devices {
                    if dev.name().is_ok_and(|n| &n == name) {
                        found = Some(dev);
                        break;
                    }
                }
                found.ok_or_else(|| LumenError::AudioDeviceNotFound {
                    device: name.clone(),
                })?
            }
            None => host
                .default_input_device()
                .ok_or_else(|| LumenError::AudioDeviceNotFound {
                    device: "default".to_string(),
                })?,
        };

        Ok(Self {
            device,
            stream: None,
            buffer: Arc::new(Mutex::new(Vec::new())),
            sample_rate: config.sample_rate,
            block_size: config.block_size,
        })
    }

    /// Build the input stream, trying i16 first and falling back to f32 for
    /// devices that only expose float formats.
    fn build_stream(&self) -> Result<cpal::Stream> {
        let stream_config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            tracing::warn!("audio stream error: {}", err);
        };

        let buffer = Arc::clone(&self.buffer);
        if let Ok(stream) = self.device.build_input_stream(
            &stream_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                if let Ok(mut buf) = buffer.lock() {
                    buf.extend_from_slice(data);
                }
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        let buffer = Arc::clone(&self.buffer);
        self.device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(
                            data.iter()
                                .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16),
                        );
                    }
                },
                err_callback,
                None,
            )
            .map_err(|e| LumenError::AudioCapture {
                message: format!("Failed to build input stream: {}", e),
            })
    }
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        let stream = self.build_stream()?;
        stream.play().map_err(|e| LumenError::AudioCapture {
            message: format!("Failed to start stream: {}", e),
        })?;
        self.stream = Some(SendableStream(stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.stream = None;
        self.buffer.lock().map(|mut b| b.clear()).ok();
        Ok(())
    }

    fn read_block(&mut self) -> Result<Option<Vec<i16>>> {
        let mut buffer = self.buffer.lock().map_err(|_| LumenError::AudioCapture {
            message: "capture buffer poisoned".to_string(),
        })?;
        if buffer.len() < self.block_size {
            return Ok(None);
        }
        let block: Vec<i16> = buffer.drain(..self.block_size).collect();
        Ok(Some(block))
    }
}
