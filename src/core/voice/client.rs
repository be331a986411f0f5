//! WebSocket client for the voice interview agent.
//!
//! One connection per round attempt: connect, handshake with `init`, then
//! exchange control JSON and binary audio until the final summary arrives or
//! the session is torn down. There is no reconnection; a dropped connection
//! ends the attempt and the round is re-entered from selection.
//!
//! # Thread safety
//!
//! Shared session state lives behind `Arc` so the spawned connection task and
//! the owning client see the same flags. Consumers observe everything through
//! the ordered [`SessionEvent`] stream returned by [`VoiceSessionClient::connect`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::prelude::*;
use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use super::audio::{AudioCapture, AudioError, AudioPlayer};
use super::messages::{
    ClientMessage, InterviewSummary, ServerMessage, parse_server_message,
};
use super::transcript::{SpeakerRole, Transcript, TranscriptEntry};
use super::{SessionPhase, VoiceResult, VoiceSessionError};

/// Default capacity for the event and outbound-frame channels.
const CHANNEL_CAPACITY: usize = 256;

/// Configuration for one voice session.
#[derive(Debug, Clone)]
pub struct VoiceSessionConfig {
    /// Agent WebSocket endpoint, e.g. `ws://host/ws/interview`
    pub ws_url: String,
    /// Session identifier sent in the handshake
    pub session_id: String,
    /// Position being interviewed for
    pub job_role: String,
    /// Candidate display name
    pub candidate_name: String,
    /// Auth token forwarded to the agent, if any
    pub token: Option<String>,
    /// Capacity of the session event channel
    pub event_capacity: usize,
}

impl VoiceSessionConfig {
    /// New session config with a random session id.
    pub fn new(
        ws_url: impl Into<String>,
        job_role: impl Into<String>,
        candidate_name: impl Into<String>,
    ) -> Self {
        Self {
            ws_url: ws_url.into(),
            session_id: Uuid::new_v4().to_string(),
            job_role: job_role.into(),
            candidate_name: candidate_name.into(),
            token: None,
            event_capacity: CHANNEL_CAPACITY,
        }
    }

    fn validate(&self) -> VoiceResult<()> {
        if self.ws_url.is_empty() {
            return Err(VoiceSessionError::InvalidConfiguration(
                "ws_url is required".to_string(),
            ));
        }
        if self.job_role.is_empty() {
            return Err(VoiceSessionError::InvalidConfiguration(
                "job_role is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ordered session events delivered to the consumer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Connection established and handshake queued
    Connected,
    /// A line was appended to the transcript
    TranscriptAppended(TranscriptEntry),
    /// Non-fatal progress notice from the agent
    StatusUpdate(String),
    /// Turn-taking phase changed
    PhaseChanged(SessionPhase),
    /// Final summary received; the session is winding down
    Completed(InterviewSummary),
    /// Agent-reported error; the session continues
    ServerError(String),
    /// Unrecognized agent message type
    UnknownMessage(String),
    /// Session over. `completed` is false for abnormal or early termination
    Closed { completed: bool },
}

/// Frames queued for the WebSocket writer.
#[derive(Debug)]
pub enum OutboundFrame {
    /// JSON control message
    Control(ClientMessage),
    /// Candidate answer audio
    Audio(Bytes),
    /// Orderly close
    Close,
}

/// State shared between the client and the spawned connection task.
struct Shared {
    phase: RwLock<SessionPhase>,
    connected: AtomicBool,
    completed: AtomicBool,
    recording: AtomicBool,
    intentional_disconnect: AtomicBool,
    /// Guards single emission of the terminal Closed event
    closed_emitted: AtomicBool,
    transcript: Mutex<Transcript>,
    events: mpsc::Sender<SessionEvent>,
}

impl Shared {
    async fn set_phase(&self, phase: SessionPhase) {
        *self.phase.write().await = phase;
        let _ = self.events.send(SessionEvent::PhaseChanged(phase)).await;
    }

    async fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event).await;
    }

    async fn emit_closed(&self) {
        if !self.closed_emitted.swap(true, Ordering::SeqCst) {
            let completed = self.completed.load(Ordering::SeqCst);
            let _ = self.events.send(SessionEvent::Closed { completed }).await;
        }
    }
}

/// Voice interview session client.
pub struct VoiceSessionClient {
    config: VoiceSessionConfig,
    shared: Arc<Shared>,
    ws_sender: Arc<Mutex<Option<mpsc::Sender<OutboundFrame>>>>,
    connection_handle: Mutex<Option<JoinHandle<()>>>,
    playback: Arc<Mutex<Option<JoinHandle<()>>>>,
    player: Arc<dyn AudioPlayer>,
    capture: Arc<dyn AudioCapture>,
}

impl VoiceSessionClient {
    /// Create a client with the given audio backends. Does not connect.
    pub fn new(
        config: VoiceSessionConfig,
        player: Arc<dyn AudioPlayer>,
        capture: Arc<dyn AudioCapture>,
    ) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (events_tx, events_rx) = mpsc::channel(config.event_capacity.max(1));
        let shared = Arc::new(Shared {
            phase: RwLock::new(SessionPhase::Disconnected),
            connected: AtomicBool::new(false),
            completed: AtomicBool::new(false),
            recording: AtomicBool::new(false),
            intentional_disconnect: AtomicBool::new(false),
            closed_emitted: AtomicBool::new(false),
            transcript: Mutex::new(Transcript::new()),
            events: events_tx,
        });
        let client = Self {
            config,
            shared,
            ws_sender: Arc::new(Mutex::new(None)),
            connection_handle: Mutex::new(None),
            playback: Arc::new(Mutex::new(None)),
            player,
            capture,
        };
        (client, events_rx)
    }

    /// Current turn-taking phase.
    pub async fn phase(&self) -> SessionPhase {
        *self.shared.phase.read().await
    }

    /// Whether the connection task is live.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Whether the final summary has been received.
    pub fn is_completed(&self) -> bool {
        self.shared.completed.load(Ordering::SeqCst)
    }

    /// Snapshot of the transcript so far.
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.shared.transcript.lock().await.entries().to_vec()
    }

    /// Connect to the agent and start the session.
    ///
    /// Queues the `init` handshake and spawns the connection task. A single
    /// attempt: connection failure is returned to the caller, never retried.
    pub async fn connect(&self) -> VoiceResult<()> {
        if self.shared.connected.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.config.validate()?;
        self.shared
            .intentional_disconnect
            .store(false, Ordering::SeqCst);
        *self.shared.phase.write().await = SessionPhase::Connecting;

        let (ws_stream, _response) = tokio_tungstenite::connect_async(&self.config.ws_url)
            .await
            .map_err(|e| VoiceSessionError::ConnectionFailed(e.to_string()))?;

        tracing::info!(session_id = %self.config.session_id, "Connected to interview agent");

        let (ws_sink, ws_reader) = ws_stream.split();
        let (tx, rx) = mpsc::channel::<OutboundFrame>(CHANNEL_CAPACITY);

        // Handshake goes out before anything else can be queued
        tx.send(OutboundFrame::Control(ClientMessage::Init {
            session_id: self.config.session_id.clone(),
            job_role: self.config.job_role.clone(),
            candidate_name: self.config.candidate_name.clone(),
            token: self.config.token.clone(),
        }))
        .await
        .map_err(|e| VoiceSessionError::WebSocket(e.to_string()))?;

        *self.ws_sender.lock().await = Some(tx);
        self.shared.connected.store(true, Ordering::SeqCst);
        self.shared.emit(SessionEvent::Connected).await;
        self.shared.set_phase(SessionPhase::Ready).await;

        let shared = self.shared.clone();
        let ws_sender = self.ws_sender.clone();
        let player = self.player.clone();
        let playback = self.playback.clone();

        let handle = tokio::spawn(async move {
            Self::run_connection(ws_sink, ws_reader, rx, &shared, &player, &playback).await;

            // Loop exit, orderly or not: release the sender and surface Closed
            shared.connected.store(false, Ordering::SeqCst);
            *ws_sender.lock().await = None;
            shared.set_phase(SessionPhase::Closed).await;
            shared.emit_closed().await;
            tracing::info!("Interview session connection task ended");
        });
        *self.connection_handle.lock().await = Some(handle);

        Ok(())
    }

    async fn run_connection<W, R>(
        mut ws_sink: W,
        mut ws_reader: R,
        mut rx: mpsc::Receiver<OutboundFrame>,
        shared: &Arc<Shared>,
        player: &Arc<dyn AudioPlayer>,
        playback: &Arc<Mutex<Option<JoinHandle<()>>>>,
    ) where
        W: Sink<Message> + Unpin,
        W::Error: std::fmt::Display,
        R: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            tokio::select! {
                Some(frame) = rx.recv() => {
                    match frame {
                        OutboundFrame::Control(message) => {
                            let json = match serde_json::to_string(&message) {
                                Ok(j) => j,
                                Err(e) => {
                                    tracing::error!("Failed to serialize control message: {}", e);
                                    continue;
                                }
                            };
                            if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                                tracing::error!("Failed to send control message: {}", e);
                                break;
                            }
                        }
                        OutboundFrame::Audio(bytes) => {
                            if let Err(e) = ws_sink.send(Message::Binary(bytes)).await {
                                tracing::error!("Failed to send answer audio: {}", e);
                                break;
                            }
                        }
                        OutboundFrame::Close => {
                            let _ = ws_sink.send(Message::Close(None)).await;
                            break;
                        }
                    }
                }

                Some(message) = ws_reader.next() => {
                    match message {
                        Ok(Message::Text(text)) => {
                            match parse_server_message(&text) {
                                Ok(parsed) => {
                                    Self::handle_server_message(parsed, shared, player, playback)
                                        .await;
                                }
                                Err(e) => {
                                    tracing::warn!("Failed to parse agent message: {} - {}", e, text);
                                }
                            }
                        }
                        Ok(Message::Ping(data)) => {
                            if let Err(e) = ws_sink.send(Message::Pong(data)).await {
                                tracing::error!("Failed to send pong: {}", e);
                            }
                        }
                        Ok(Message::Close(_)) => {
                            tracing::info!("WebSocket closed by agent");
                            break;
                        }
                        Err(e) => {
                            tracing::error!("WebSocket error: {}", e);
                            break;
                        }
                        _ => {}
                    }
                }

                else => break,
            }
        }
    }

    async fn handle_server_message(
        message: ServerMessage,
        shared: &Arc<Shared>,
        player: &Arc<dyn AudioPlayer>,
        playback: &Arc<Mutex<Option<JoinHandle<()>>>>,
    ) {
        match message {
            ServerMessage::CandidateTranscript(m) => {
                let entry = shared
                    .transcript
                    .lock()
                    .await
                    .append(SpeakerRole::Candidate, m.transcript, m.stage);
                if let Some(entry) = entry {
                    shared.emit(SessionEvent::TranscriptAppended(entry)).await;
                }
            }

            ServerMessage::InterviewerResponse(m) => {
                let entry = shared
                    .transcript
                    .lock()
                    .await
                    .append(SpeakerRole::Interviewer, m.text, m.stage);
                if let Some(entry) = entry {
                    shared.emit(SessionEvent::TranscriptAppended(entry)).await;
                }

                let audio = match m.audio.as_deref().map(|a| BASE64_STANDARD.decode(a)) {
                    Some(Ok(bytes)) => Some(Bytes::from(bytes)),
                    Some(Err(e)) => {
                        tracing::error!("Failed to decode agent audio: {}", e);
                        None
                    }
                    None => None,
                };

                // A new utterance preempts any audio still playing
                if let Some(handle) = playback.lock().await.take() {
                    handle.abort();
                    player.stop().await;
                }

                match audio {
                    Some(bytes) => {
                        shared.set_phase(SessionPhase::AiSpeaking).await;
                        let shared = shared.clone();
                        let player = player.clone();
                        let handle = tokio::spawn(async move {
                            if let Err(e) = player.play(bytes).await {
                                tracing::error!("Playback failed: {}", e);
                            }
                            if !shared.completed.load(Ordering::SeqCst) {
                                shared.set_phase(SessionPhase::AwaitingCandidate).await;
                            }
                        });
                        *playback.lock().await = Some(handle);
                    }
                    None => {
                        shared.set_phase(SessionPhase::AwaitingCandidate).await;
                    }
                }
            }

            ServerMessage::Status(m) => {
                shared.emit(SessionEvent::StatusUpdate(m.message)).await;
                shared.set_phase(SessionPhase::Processing).await;
            }

            ServerMessage::InterviewComplete { summary } => {
                // Exactly one completion per session; duplicates are dropped
                if shared.completed.swap(true, Ordering::SeqCst) {
                    tracing::warn!("Duplicate interview_complete ignored");
                    return;
                }
                shared.transcript.lock().await.freeze();
                shared.set_phase(SessionPhase::Concluding).await;
                shared.emit(SessionEvent::Completed(summary)).await;
            }

            ServerMessage::Error { message } => {
                tracing::error!("Agent error: {}", message);
                shared.emit(SessionEvent::ServerError(message)).await;
            }

            ServerMessage::Unknown(kind) => {
                tracing::error!("Unknown agent message type: {}", kind);
                shared.emit(SessionEvent::UnknownMessage(kind)).await;
            }
        }
    }

    /// Start recording the candidate's answer.
    ///
    /// Only valid during the candidate's turn.
    pub async fn start_recording(&self) -> VoiceResult<()> {
        if !self.is_connected() {
            return Err(VoiceSessionError::NotConnected);
        }
        let phase = self.phase().await;
        if phase != SessionPhase::AwaitingCandidate {
            return Err(VoiceSessionError::NotYourTurn(phase));
        }
        if self.shared.recording.swap(true, Ordering::SeqCst) {
            return Err(VoiceSessionError::AlreadyRecording);
        }

        if let Err(e) = self.capture.start().await {
            self.shared.recording.store(false, Ordering::SeqCst);
            return Err(match e {
                AudioError::PermissionDenied(msg) => VoiceSessionError::PermissionDenied(msg),
                other => VoiceSessionError::Audio(other.to_string()),
            });
        }
        Ok(())
    }

    /// Stop recording and send the captured answer as one binary frame.
    pub async fn stop_recording(&self) -> VoiceResult<()> {
        if !self.shared.recording.swap(false, Ordering::SeqCst) {
            return Err(VoiceSessionError::NotRecording);
        }

        let audio = self
            .capture
            .stop()
            .await
            .map_err(|e| VoiceSessionError::Audio(e.to_string()))?;

        self.send_frame(OutboundFrame::Audio(audio)).await?;
        self.shared.set_phase(SessionPhase::Processing).await;
        Ok(())
    }

    /// Ask the agent to wind the interview down early. The agent still
    /// delivers a final summary for the questions answered so far.
    pub async fn end_interview(&self) -> VoiceResult<()> {
        self.send_frame(OutboundFrame::Control(ClientMessage::EndInterview))
            .await
    }

    /// Tear the session down.
    ///
    /// Releases the microphone, stops playback, and closes the connection.
    /// If no summary was received the terminal event is `Closed { completed: false }`.
    pub async fn disconnect(&self) {
        self.shared
            .intentional_disconnect
            .store(true, Ordering::SeqCst);

        // Microphone release comes first
        if self.shared.recording.swap(false, Ordering::SeqCst) {
            self.capture.cancel().await;
        }
        if let Some(handle) = self.playback.lock().await.take() {
            handle.abort();
        }
        self.player.stop().await;

        let sender = self.ws_sender.lock().await.take();
        if let Some(sender) = sender {
            let _ = sender.send(OutboundFrame::Close).await;
        }
        if let Some(handle) = self.connection_handle.lock().await.take() {
            // Give the writer a moment to flush the close frame
            let _ = tokio::time::timeout(std::time::Duration::from_secs(2), handle).await;
        }

        self.shared.connected.store(false, Ordering::SeqCst);
        *self.shared.phase.write().await = SessionPhase::Closed;
        self.shared.emit_closed().await;
        tracing::info!("Disconnected from interview agent");
    }

    async fn send_frame(&self, frame: OutboundFrame) -> VoiceResult<()> {
        if let Some(sender) = self.ws_sender.lock().await.as_ref() {
            sender
                .send(frame)
                .await
                .map_err(|e| VoiceSessionError::WebSocket(e.to_string()))?;
            Ok(())
        } else {
            Err(VoiceSessionError::NotConnected)
        }
    }
}
