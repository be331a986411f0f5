//! Audio device seams.
//!
//! Playback and capture are platform concerns, so the session client talks
//! to them through traits. The provided implementations discard audio; real
//! device backends plug in at construction time.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Failures from an audio backend.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The platform denied microphone access
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),

    /// Device open or I/O failure
    #[error("Audio device error: {0}")]
    Device(String),

    /// Incoming audio could not be decoded
    #[error("Audio decode error: {0}")]
    Decode(String),
}

/// Plays agent audio. `play` resolves when playback finishes; `stop` aborts
/// any in-flight playback immediately.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, audio: Bytes) -> Result<(), AudioError>;
    async fn stop(&self);
}

/// Captures candidate audio. `stop` releases the device and returns the
/// recorded bytes; `cancel` releases the device and discards them.
#[async_trait]
pub trait AudioCapture: Send + Sync {
    async fn start(&self) -> Result<(), AudioError>;
    async fn stop(&self) -> Result<Bytes, AudioError>;
    async fn cancel(&self);
}

/// Player that drops audio on the floor. Used headless and in tests.
#[derive(Debug, Default)]
pub struct DiscardPlayer;

#[async_trait]
impl AudioPlayer for DiscardPlayer {
    async fn play(&self, _audio: Bytes) -> Result<(), AudioError> {
        Ok(())
    }

    async fn stop(&self) {}
}

/// Capture that records nothing and returns empty audio.
#[derive(Debug, Default)]
pub struct NullCapture;

#[async_trait]
impl AudioCapture for NullCapture {
    async fn start(&self) -> Result<(), AudioError> {
        Ok(())
    }

    async fn stop(&self) -> Result<Bytes, AudioError> {
        Ok(Bytes::new())
    }

    async fn cancel(&self) {}
}
