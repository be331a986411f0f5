//! Request and response bodies for the hiring backend REST API.

use serde::{Deserialize, Serialize};

/// POST /auth/signup
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// POST /auth/login
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authenticated user profile.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Response from signup and login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

/// GET /auth/me
#[derive(Debug, Clone, Deserialize)]
pub struct WhoAmI {
    pub user: UserInfo,
}

/// One scored answer in a quiz submission. `question_id` is the 1-based
/// position within the presented round.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QuizAnswer {
    pub question_id: u32,
    pub answer: String,
    pub is_correct: bool,
}

/// POST /quiz/submit
#[derive(Debug, Clone, Serialize)]
pub struct QuizSubmission {
    pub round_number: u8,
    pub answers: Vec<QuizAnswer>,
    pub total_questions: u32,
}

/// Response to a quiz submission.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizSubmitResponse {
    pub score: u32,
    pub passed: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// GET /quiz/status: the candidate's live progress record.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizStatus {
    pub current_round: u8,
    #[serde(default)]
    pub round_1_score: Option<u32>,
    #[serde(default)]
    pub round_2_score: Option<u32>,
    #[serde(default)]
    pub round_3_score: Option<f32>,
    pub overall_status: String,
    #[serde(default)]
    pub can_reattempt: bool,
    #[serde(default = "default_attempt")]
    pub current_attempt_number: u32,
}

fn default_attempt() -> u32 {
    1
}

/// Per-round breakdown in the results view, as percentages.
#[derive(Debug, Clone, Deserialize)]
pub struct RoundReport {
    pub round_number: u8,
    pub score: f32,
    pub passed: bool,
}

/// One archived attempt in the candidate's history.
#[derive(Debug, Clone, Deserialize)]
pub struct AttemptRecord {
    pub attempt_number: u32,
    #[serde(default)]
    pub round_1_score: Option<u32>,
    #[serde(default)]
    pub round_2_score: Option<u32>,
    #[serde(default)]
    pub round_3_score: Option<f32>,
    #[serde(default)]
    pub overall_score: Option<f32>,
    pub overall_status: String,
    #[serde(default)]
    pub recommendation: Option<String>,
}

/// GET /interview/{session_id}/results
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewResults {
    pub session_id: String,
    pub candidate_name: String,
    pub job_role: String,
    pub rounds: Vec<RoundReport>,
    pub overall_score: f32,
    pub recommendation: String,
}

/// GET /admin/candidate/{id}/analysis: the agent's qualitative evaluation.
#[derive(Debug, Clone, Deserialize)]
pub struct Analysis {
    pub candidate_id: String,
    #[serde(default)]
    pub key_strengths: Vec<String>,
    #[serde(default)]
    pub areas_to_improve: Vec<String>,
    pub summary: String,
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}
