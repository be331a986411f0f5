//! Voice interview session: WebSocket protocol adapter for round 3.
//!
//! The remote agent drives the conversation; this module owns the connection
//! lifecycle, the turn-taking phases, audio hand-off, and the append-only
//! transcript. Consumers observe the session through an ordered
//! [`SessionEvent`](client::SessionEvent) stream.

mod audio;
mod client;
mod messages;
mod transcript;

pub use audio::{AudioCapture, AudioError, AudioPlayer, DiscardPlayer, NullCapture};
pub use client::{OutboundFrame, SessionEvent, VoiceSessionClient, VoiceSessionConfig};
pub use messages::{
    ClientMessage, FinalScores, InterviewSummary, ServerMessage, parse_server_message,
};
pub use transcript::{SpeakerRole, Transcript, TranscriptEntry};

use std::fmt;

use thiserror::Error;

/// Errors from the voice session adapter.
#[derive(Debug, Error)]
pub enum VoiceSessionError {
    /// WebSocket connection could not be established
    #[error("Failed to connect to interview agent: {0}")]
    ConnectionFailed(String),

    /// Session configuration is incomplete or inconsistent
    #[error("Invalid session configuration: {0}")]
    InvalidConfiguration(String),

    /// Operation requires an established connection
    #[error("Not connected to the interview agent")]
    NotConnected,

    /// Recording attempted outside the candidate's turn
    #[error("Cannot record during phase {0}: it is not the candidate's turn")]
    NotYourTurn(SessionPhase),

    /// Recording started while already recording
    #[error("Already recording")]
    AlreadyRecording,

    /// Stop requested with no recording in progress
    #[error("Not recording")]
    NotRecording,

    /// Microphone permission denied by the platform
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),

    /// Audio device or codec failure
    #[error("Audio error: {0}")]
    Audio(String),

    /// Transport-level WebSocket failure
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Outbound message could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for voice session operations.
pub type VoiceResult<T> = Result<T, VoiceSessionError>;

/// Turn-taking phase of a voice session.
///
/// Transitions are driven by server messages and local audio lifecycle;
/// consumers never set the phase directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No connection
    Disconnected,
    /// Connection attempt in flight
    Connecting,
    /// Connected, waiting for the agent's opening
    Ready,
    /// Agent audio is playing
    AiSpeaking,
    /// Candidate may record an answer
    AwaitingCandidate,
    /// Answer sent, agent is thinking
    Processing,
    /// Final summary received, winding down
    Concluding,
    /// Session over
    Closed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Disconnected => "disconnected",
            SessionPhase::Connecting => "connecting",
            SessionPhase::Ready => "ready",
            SessionPhase::AiSpeaking => "ai_speaking",
            SessionPhase::AwaitingCandidate => "awaiting_candidate",
            SessionPhase::Processing => "processing",
            SessionPhase::Concluding => "concluding",
            SessionPhase::Closed => "closed",
        };
        write!(f, "{name}")
    }
}
