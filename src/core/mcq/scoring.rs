//! Deterministic answer-key scoring for MCQ rounds.

use std::collections::HashMap;

use super::bank::Question;

/// A single scored answer, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredAnswer {
    /// Question identifier
    pub question_id: String,
    /// Option the candidate selected, if any
    pub selected_option_id: Option<String>,
    /// Whether the selection matched the answer key
    pub is_correct: bool,
}

/// The result of scoring one MCQ round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundScore {
    /// Per-question outcomes in presentation order
    pub answers: Vec<ScoredAnswer>,
    /// Count of correct answers
    pub correct: u32,
    /// Number of questions presented
    pub total: u32,
}

impl RoundScore {
    /// Whether the round meets the majority pass threshold.
    pub fn passed(&self) -> bool {
        self.correct >= passing_threshold(self.total)
    }
}

/// Majority pass threshold: `ceil(total / 2)` (3 for the fixed 5-question round).
#[inline]
pub fn passing_threshold(total: u32) -> u32 {
    total.div_ceil(2)
}

/// Score a round's answers against the presented question set.
///
/// An unanswered question counts as incorrect. Answers for questions not in
/// the presented set are ignored.
pub fn score_answers(questions: &[Question], answers: &HashMap<String, String>) -> RoundScore {
    let scored: Vec<ScoredAnswer> = questions
        .iter()
        .map(|question| {
            let selected = answers.get(&question.id).cloned();
            let is_correct = selected
                .as_deref()
                .map(|option| question.is_correct(option))
                .unwrap_or(false);
            ScoredAnswer {
                question_id: question.id.clone(),
                selected_option_id: selected,
                is_correct,
            }
        })
        .collect();

    let correct = scored.iter().filter(|a| a.is_correct).count() as u32;
    RoundScore {
        correct,
        total: questions.len() as u32,
        answers: scored,
    }
}
