//! MCQ evaluation: question banks, round sampling, and answer-key scoring.
//!
//! The two MCQ rounds (Aptitude and DSA) each draw a fixed-size random
//! sample from a static question bank. The sample stays fixed for the
//! lifetime of one round attempt and is drawn fresh on every round entry.

mod bank;
mod sampler;
mod scoring;

pub use bank::{Choice, Question, aptitude_bank, dsa_bank};
pub use sampler::{DEFAULT_ROUND_SIZE, sample_questions};
pub use scoring::{RoundScore, ScoredAnswer, passing_threshold, score_answers};

use thiserror::Error;

/// Errors from question sampling.
#[derive(Debug, Error)]
pub enum McqError {
    /// The bank does not hold enough distinct questions for a round
    #[error("Question bank holds {available} questions, need {requested}")]
    BankTooSmall {
        /// Questions available in the bank
        available: usize,
        /// Questions requested for the round
        requested: usize,
    },
}
