//! REST client for the hiring backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::core::mcq::RoundScore;
use crate::core::rounds::{RoundKind, ScoreReporter};
use crate::core::voice::InterviewSummary;

use super::types::{
    Ack, Analysis, AttemptRecord, AuthResponse, InterviewResults, LoginRequest, QuizAnswer,
    QuizStatus, QuizSubmission, QuizSubmitResponse, SignupRequest, UserInfo, WhoAmI,
};
use super::{BackendError, BackendResult};

/// HTTP client for the hiring backend.
///
/// Holds the bearer token and candidate identity after login; all candidate
/// endpoints require authentication.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
    candidate_email: RwLock<Option<String>>,
}

impl BackendClient {
    /// Create a client for the given API base URL.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
            candidate_email: RwLock::new(None),
        })
    }

    /// Whether a bearer token is held.
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Register a new candidate and store the returned session.
    pub async fn signup(&self, request: &SignupRequest) -> BackendResult<AuthResponse> {
        let response = self
            .http
            .post(self.url("/auth/signup"))
            .json(request)
            .send()
            .await?;
        let auth: AuthResponse = Self::handle_response(response).await?;
        self.store_session(&auth).await;
        Ok(auth)
    }

    /// Log in and store the returned session.
    pub async fn login(&self, request: &LoginRequest) -> BackendResult<AuthResponse> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(request)
            .send()
            .await?;
        let auth: AuthResponse = Self::handle_response(response).await?;
        self.store_session(&auth).await;
        Ok(auth)
    }

    /// Fetch the authenticated user's profile.
    pub async fn whoami(&self) -> BackendResult<UserInfo> {
        let response = self
            .authed(self.http.get(self.url("/auth/me")))
            .await?
            .send()
            .await?;
        let me: WhoAmI = Self::handle_response(response).await?;
        Ok(me.user)
    }

    /// Submit a scored MCQ round.
    pub async fn submit_quiz(
        &self,
        submission: &QuizSubmission,
    ) -> BackendResult<QuizSubmitResponse> {
        let response = self
            .authed(self.http.post(self.url("/quiz/submit")))
            .await?
            .json(submission)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Fetch the candidate's live progress record.
    pub async fn quiz_status(&self) -> BackendResult<QuizStatus> {
        let response = self
            .authed(self.http.get(self.url("/quiz/status")))
            .await?
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Mark the voice round complete for the logged-in candidate.
    pub async fn complete_round(&self) -> BackendResult<Ack> {
        let email = self
            .candidate_email
            .read()
            .await
            .clone()
            .ok_or(BackendError::MissingAuth)?;
        let response = self
            .authed(self.http.post(self.url("/candidates/complete-round")))
            .await?
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Fetch final results for a finished interview session.
    pub async fn interview_results(&self, session_id: &str) -> BackendResult<InterviewResults> {
        let response = self
            .authed(
                self.http
                    .get(self.url(&format!("/interview/{session_id}/results"))),
            )
            .await?
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Fetch the candidate's archived attempt history.
    pub async fn attempt_history(&self) -> BackendResult<Vec<AttemptRecord>> {
        let response = self
            .authed(self.http.get(self.url("/quiz/attempts")))
            .await?
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Admin: fetch the agent's qualitative evaluation for a candidate.
    pub async fn candidate_analysis(&self, candidate_id: &str) -> BackendResult<Analysis> {
        let response = self
            .authed(
                self.http
                    .get(self.url(&format!("/admin/candidate/{candidate_id}/analysis"))),
            )
            .await?
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Admin: archive a candidate's attempt and unlock a fresh one.
    pub async fn grant_reattempt(&self, candidate_id: &str) -> BackendResult<Ack> {
        let response = self
            .authed(
                self.http
                    .post(self.url(&format!("/admin/candidate/{candidate_id}/grant-reattempt"))),
            )
            .await?
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Admin: withdraw a granted re-attempt that has not been started yet.
    pub async fn revoke_reattempt(&self, candidate_id: &str) -> BackendResult<Ack> {
        let response = self
            .authed(
                self.http
                    .delete(self.url(&format!("/admin/candidate/{candidate_id}/revoke-reattempt"))),
            )
            .await?
            .send()
            .await?;
        Self::handle_response(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn store_session(&self, auth: &AuthResponse) {
        *self.token.write().await = Some(auth.token.clone());
        *self.candidate_email.write().await = Some(auth.user.email.clone());
    }

    async fn authed(&self, builder: reqwest::RequestBuilder) -> BackendResult<reqwest::RequestBuilder> {
        let token = self
            .token
            .read()
            .await
            .clone()
            .ok_or(BackendError::MissingAuth)?;
        Ok(builder.bearer_auth(token))
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> BackendResult<T> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body)
                .map_err(|e| BackendError::InvalidResponse(format!("{e}: {body}")));
        }

        let message = Self::error_message(status, response).await;
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn error_message(status: StatusCode, response: reqwest::Response) -> String {
        let body = response.text().await.unwrap_or_default();
        // Error bodies are usually {"detail": "..."} or {"message": "..."}
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
            for key in ["detail", "message"] {
                if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                    return text.to_string();
                }
            }
        }
        if body.is_empty() {
            status.to_string()
        } else {
            body
        }
    }
}

#[async_trait]
impl ScoreReporter for BackendClient {
    async fn report_quiz(&self, round: RoundKind, score: &RoundScore) -> Result<(), BackendError> {
        let answers = score
            .answers
            .iter()
            .enumerate()
            .map(|(i, a)| QuizAnswer {
                question_id: i as u32 + 1,
                answer: a.selected_option_id.clone().unwrap_or_default(),
                is_correct: a.is_correct,
            })
            .collect();

        let submission = QuizSubmission {
            round_number: round.ordinal(),
            answers,
            total_questions: score.total,
        };
        self.submit_quiz(&submission).await?;
        Ok(())
    }

    async fn report_interview_complete(
        &self,
        summary: &InterviewSummary,
    ) -> Result<(), BackendError> {
        tracing::info!(
            session_id = %summary.session_id,
            score = summary.scores.total_score,
            "Reporting interview completion"
        );
        self.complete_round().await?;
        Ok(())
    }
}
