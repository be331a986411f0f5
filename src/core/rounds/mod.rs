//! Round orchestration: the three-stage assessment state machine.
//!
//! The machine sequences Aptitude -> DSA -> Voice, enforces unlock order,
//! collects MCQ answers, scores submissions, and reports results to the
//! backend through the [`ScoreReporter`] seam. Voice-round completion is
//! signalled by the voice session adapter and finalizes the attempt.

mod attempt;
mod machine;

pub use attempt::{
    ArchivedAttempt, Attempt, OverallStatus, Recommendation, RoundKind, RoundStatus,
};
pub use machine::{AdvanceOutcome, MachinePhase, RoundOutcome, RoundStateMachine, ScoreReporter};

use thiserror::Error;

use crate::core::mcq::McqError;

/// Errors from round orchestration.
///
/// Validation failures are rejected synchronously before any state mutation
/// or network call.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The requested round's unlock predicate failed
    #[error("Round {0} is locked: the previous round is not finished")]
    RoundLocked(RoundKind),

    /// The round was already submitted in this attempt
    #[error("Round {0} has already been completed in this attempt")]
    RoundAlreadyCompleted(RoundKind),

    /// Operation not valid in the current machine phase
    #[error("Invalid transition: {0}")]
    InvalidTransition(&'static str),

    /// Advancing requires a selected answer for the current question
    #[error("No answer selected for the current question")]
    NoAnswerSelected,

    /// The answered question is not part of the presented set
    #[error("Question {0} is not part of this round")]
    UnknownQuestion(String),

    /// The machine was configured with a zero-question round
    #[error("Round size must be at least 1")]
    EmptyRoundSize,

    /// Question sampling failed
    #[error(transparent)]
    Mcq(#[from] McqError),
}

/// Result type for round orchestration operations.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
