//! Candidate session: identity plus progress synced from the backend.

use crate::backend::{BackendClient, BackendResult, QuizStatus, UserInfo};
use crate::core::mcq::passing_threshold;
use crate::core::rounds::{Attempt, OverallStatus, RoundKind, RoundStatus};

/// A logged-in candidate with their synced assessment progress.
///
/// The backend record is authoritative at sync time; afterwards the round
/// state machine owns progression locally.
#[derive(Debug, Clone)]
pub struct CandidateSession {
    pub user: UserInfo,
    pub attempt: Attempt,
    pub can_reattempt: bool,
}

impl CandidateSession {
    /// Fetch the candidate's profile and progress from the backend.
    pub async fn sync(client: &BackendClient, round_size: u32) -> BackendResult<Self> {
        let user = client.whoami().await?;
        let status = client.quiz_status().await?;
        let attempt = attempt_from_status(&status, round_size);
        Ok(Self {
            user,
            attempt,
            can_reattempt: status.can_reattempt,
        })
    }
}

/// Rebuild local attempt state from the backend progress record.
fn attempt_from_status(status: &QuizStatus, round_size: u32) -> Attempt {
    let mut attempt = Attempt::numbered(status.current_attempt_number);

    if let Some(score) = status.round_1_score {
        attempt.round_1_score = Some(score);
        attempt.set_status(RoundKind::Aptitude, mcq_status(score, round_size));
    }
    if let Some(score) = status.round_2_score {
        attempt.round_2_score = Some(score);
        attempt.set_status(RoundKind::Dsa, mcq_status(score, round_size));
    }
    if let Some(score) = status.round_3_score {
        attempt.round_3_score = Some(score);
        attempt.set_status(RoundKind::Voice, RoundStatus::Passed);
    }

    attempt.overall_status = match status.overall_status.as_str() {
        "completed" => OverallStatus::Completed,
        "rejected" => OverallStatus::Rejected,
        "in_progress" => OverallStatus::InProgress,
        _ => OverallStatus::Registered,
    };
    attempt
}

fn mcq_status(score: u32, round_size: u32) -> RoundStatus {
    if score >= passing_threshold(round_size) {
        RoundStatus::Passed
    } else {
        RoundStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> QuizStatus {
        QuizStatus {
            current_round: 1,
            round_1_score: None,
            round_2_score: None,
            round_3_score: None,
            overall_status: "registered".to_string(),
            can_reattempt: false,
            current_attempt_number: 1,
        }
    }

    #[test]
    fn test_fresh_candidate() {
        let attempt = attempt_from_status(&status(), 5);
        assert_eq!(attempt.number, 1);
        assert_eq!(attempt.status(RoundKind::Aptitude), RoundStatus::NotStarted);
        assert_eq!(attempt.overall_status, OverallStatus::Registered);
    }

    #[test]
    fn test_partial_progress_maps_statuses() {
        let mut s = status();
        s.round_1_score = Some(4);
        s.round_2_score = Some(2);
        s.overall_status = "rejected".to_string();

        let attempt = attempt_from_status(&s, 5);
        assert_eq!(attempt.status(RoundKind::Aptitude), RoundStatus::Passed);
        assert_eq!(attempt.status(RoundKind::Dsa), RoundStatus::Failed);
        assert_eq!(attempt.overall_status, OverallStatus::Rejected);
        // Failed round 2 still unlocks round 3
        assert!(attempt.is_unlocked(RoundKind::Voice));
    }

    #[test]
    fn test_completed_candidate() {
        let mut s = status();
        s.round_1_score = Some(5);
        s.round_2_score = Some(3);
        s.round_3_score = Some(78.5);
        s.overall_status = "completed".to_string();
        s.current_attempt_number = 2;

        let attempt = attempt_from_status(&s, 5);
        assert_eq!(attempt.number, 2);
        assert_eq!(attempt.status(RoundKind::Voice), RoundStatus::Passed);
        assert_eq!(attempt.overall_status, OverallStatus::Completed);
    }
}
