pub mod mcq;
pub mod rounds;
pub mod session;
pub mod voice;

// Re-export commonly used types for convenience
pub use mcq::{
    Choice, DEFAULT_ROUND_SIZE, McqError, Question, RoundScore, ScoredAnswer, aptitude_bank,
    dsa_bank, passing_threshold, sample_questions, score_answers,
};

pub use rounds::{
    AdvanceOutcome, ArchivedAttempt, Attempt, MachinePhase, OrchestratorError, OrchestratorResult,
    OverallStatus, Recommendation, RoundKind, RoundOutcome, RoundStateMachine, RoundStatus,
    ScoreReporter,
};

pub use session::CandidateSession;

pub use voice::{
    AudioCapture, AudioPlayer, InterviewSummary, SessionEvent, SessionPhase, Transcript,
    TranscriptEntry, VoiceResult, VoiceSessionClient, VoiceSessionConfig, VoiceSessionError,
};
