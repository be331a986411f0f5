//! Attempt state: per-round statuses, scores, and re-attempt archiving.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One stage of the three-stage assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundKind {
    /// Round 1: logical reasoning MCQ
    Aptitude,
    /// Round 2: data structures and algorithms MCQ
    Dsa,
    /// Round 3: spoken interview with the remote agent
    Voice,
}

impl RoundKind {
    /// Ordinal position, 1-based.
    pub fn ordinal(self) -> u8 {
        match self {
            RoundKind::Aptitude => 1,
            RoundKind::Dsa => 2,
            RoundKind::Voice => 3,
        }
    }

    /// The round preceding this one, if any.
    pub fn previous(self) -> Option<RoundKind> {
        match self {
            RoundKind::Aptitude => None,
            RoundKind::Dsa => Some(RoundKind::Aptitude),
            RoundKind::Voice => Some(RoundKind::Dsa),
        }
    }

    /// Whether this round presents MCQ questions.
    pub fn is_mcq(self) -> bool {
        !matches!(self, RoundKind::Voice)
    }

    /// Human-readable round title.
    pub fn title(self) -> &'static str {
        match self {
            RoundKind::Aptitude => "Aptitude Round",
            RoundKind::Dsa => "DSA Round",
            RoundKind::Voice => "Voice Interview",
        }
    }

    fn index(self) -> usize {
        self.ordinal() as usize - 1
    }
}

impl fmt::Display for RoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Status of a single round within an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Not yet entered
    #[default]
    NotStarted,
    /// Entered but not submitted
    InProgress,
    /// Submitted with a passing score
    Passed,
    /// Submitted with a failing score
    Failed,
}

impl RoundStatus {
    /// A consumed round has been submitted, passing or not. Consumed rounds
    /// unlock the next round (always-advance policy).
    #[inline]
    pub fn is_consumed(self) -> bool {
        matches!(self, RoundStatus::Passed | RoundStatus::Failed)
    }
}

/// Overall attempt status mirroring the backend candidate record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// Signed up, no round submitted yet
    #[default]
    Registered,
    /// At least one round submitted
    InProgress,
    /// All three rounds finished
    Completed,
    /// An MCQ round was failed (candidate may still continue)
    Rejected,
}

/// Hire recommendation bands derived from the overall percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    /// Overall score >= 70
    Hire,
    /// Overall score >= 50
    Consider,
    /// Below 50
    NoHire,
}

impl Recommendation {
    /// Band for an overall percentage score.
    pub fn from_score(score: f32) -> Self {
        if score >= 70.0 {
            Recommendation::Hire
        } else if score >= 50.0 {
            Recommendation::Consider
        } else {
            Recommendation::NoHire
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Recommendation::Hire => "Recommended to Hire",
            Recommendation::Consider => "Consider for Next Steps",
            Recommendation::NoHire => "Not Recommended",
        };
        write!(f, "{text}")
    }
}

/// One candidate's pass through the three rounds.
///
/// The round state machine is the sole mutator of an attempt; archived
/// attempts are immutable snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    /// Attempt number, monotonically increasing per candidate
    pub number: u32,
    /// Overall status derived from submissions
    pub overall_status: OverallStatus,
    statuses: [RoundStatus; 3],
    /// Round 1 correct-answer count (out of the round size)
    pub round_1_score: Option<u32>,
    /// Round 2 correct-answer count (out of the round size)
    pub round_2_score: Option<u32>,
    /// Round 3 percentage score reported by the interview agent
    pub round_3_score: Option<f32>,
}

impl Attempt {
    /// A fresh first attempt.
    pub fn new() -> Self {
        Self::numbered(1)
    }

    /// A fresh attempt with an explicit attempt number.
    pub fn numbered(number: u32) -> Self {
        Self {
            number,
            overall_status: OverallStatus::Registered,
            statuses: [RoundStatus::NotStarted; 3],
            round_1_score: None,
            round_2_score: None,
            round_3_score: None,
        }
    }

    /// Status of a round.
    pub fn status(&self, round: RoundKind) -> RoundStatus {
        self.statuses[round.index()]
    }

    pub(crate) fn set_status(&mut self, round: RoundKind, status: RoundStatus) {
        self.statuses[round.index()] = status;
    }

    pub(crate) fn set_mcq_score(&mut self, round: RoundKind, correct: u32) {
        match round {
            RoundKind::Aptitude => self.round_1_score = Some(correct),
            RoundKind::Dsa => self.round_2_score = Some(correct),
            RoundKind::Voice => {}
        }
    }

    /// Unlock predicate: round n is enterable iff n == 1 or round n-1 is
    /// consumed.
    pub fn is_unlocked(&self, round: RoundKind) -> bool {
        match round.previous() {
            None => true,
            Some(prev) => self.status(prev).is_consumed(),
        }
    }

    /// Overall percentage score across submitted rounds, if any.
    ///
    /// MCQ scores are scaled out of the round size; the voice score is
    /// already a percentage.
    pub fn overall_score(&self, round_size: u32) -> Option<f32> {
        let mut parts = Vec::new();
        if let Some(s) = self.round_1_score {
            parts.push(s as f32 * 100.0 / round_size as f32);
        }
        if let Some(s) = self.round_2_score {
            parts.push(s as f32 * 100.0 / round_size as f32);
        }
        if let Some(s) = self.round_3_score {
            parts.push(s);
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.iter().sum::<f32>() / parts.len() as f32)
        }
    }

    /// Snapshot this attempt for archival before a re-attempt reset.
    pub fn archive(&self, round_size: u32) -> ArchivedAttempt {
        let overall_score = self.overall_score(round_size);
        ArchivedAttempt {
            attempt_number: self.number,
            round_1_score: self.round_1_score,
            round_2_score: self.round_2_score,
            round_3_score: self.round_3_score,
            overall_score,
            overall_status: self.overall_status,
            recommendation: overall_score.map(Recommendation::from_score),
        }
    }
}

impl Default for Attempt {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of a finished (or abandoned) attempt, taken when a
/// re-attempt is granted. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedAttempt {
    /// Attempt number at the time of archival
    pub attempt_number: u32,
    /// Round 1 correct-answer count
    pub round_1_score: Option<u32>,
    /// Round 2 correct-answer count
    pub round_2_score: Option<u32>,
    /// Round 3 percentage score
    pub round_3_score: Option<f32>,
    /// Derived overall percentage
    pub overall_score: Option<f32>,
    /// Overall status at archival time
    pub overall_status: OverallStatus,
    /// Derived recommendation band, if scored
    pub recommendation: Option<Recommendation>,
}
