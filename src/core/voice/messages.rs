//! Wire messages exchanged with the interview agent.
//!
//! Control messages travel as JSON text frames tagged by a `type` field;
//! candidate audio travels as binary frames and agent audio comes back
//! base64-encoded inside `interviewer_response`.

use serde::{Deserialize, Serialize};

/// Client-to-agent control messages.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Session handshake, sent once immediately after connecting
    Init {
        session_id: String,
        job_role: String,
        candidate_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    /// Candidate requests the interview wind down early
    EndInterview,
}

/// Transcript of a completed candidate utterance.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CandidateTranscriptMessage {
    pub transcript: String,
    #[serde(default)]
    pub stage: Option<String>,
}

/// The agent's next utterance: text plus base64-encoded audio.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InterviewerResponseMessage {
    pub text: String,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
}

/// Non-fatal progress notice while the agent is thinking.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StatusMessage {
    pub message: String,
}

/// Aggregate scores from the agent's final evaluation, as percentages.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct FinalScores {
    pub total_score: f32,
    pub average_score: f32,
    pub technical_avg: f32,
    pub behavioral_avg: f32,
}

/// One logged exchange in the agent's conversation record.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ConversationTurn {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub stage: Option<String>,
}

/// Final interview summary delivered exactly once per session.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct InterviewSummary {
    pub session_id: String,
    #[serde(default)]
    pub candidate_name: Option<String>,
    pub job_role: String,
    pub scores: FinalScores,
    pub total_questions: u32,
    #[serde(default)]
    pub conversation_log: Vec<ConversationTurn>,
    #[serde(default)]
    pub stage: Option<String>,
}

#[cfg(test)]
impl InterviewSummary {
    /// Minimal summary for state-machine tests.
    pub fn stub_with_score(total: f32) -> Self {
        Self {
            session_id: "test-session".to_string(),
            candidate_name: Some("Test Candidate".to_string()),
            job_role: "Backend Engineer".to_string(),
            scores: FinalScores {
                total_score: total,
                average_score: total,
                technical_avg: total,
                behavioral_avg: total,
            },
            total_questions: 6,
            conversation_log: Vec::new(),
            stage: Some("complete".to_string()),
        }
    }
}

/// Agent-to-client messages, discriminated by the `type` field.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    CandidateTranscript(CandidateTranscriptMessage),
    InterviewerResponse(InterviewerResponseMessage),
    Status(StatusMessage),
    InterviewComplete { summary: InterviewSummary },
    Error { message: String },
    /// Unrecognized message type, carried for logging
    Unknown(String),
}

/// Parse an agent text frame.
///
/// Unknown `type` values parse into [`ServerMessage::Unknown`] so new agent
/// message kinds never break the session.
pub fn parse_server_message(raw: &str) -> Result<ServerMessage, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string();

    let message = match kind.as_str() {
        "candidate_transcript" => {
            ServerMessage::CandidateTranscript(serde_json::from_value(value)?)
        }
        "interviewer_response" => {
            ServerMessage::InterviewerResponse(serde_json::from_value(value)?)
        }
        "status" => ServerMessage::Status(serde_json::from_value(value)?),
        "interview_complete" => {
            #[derive(Deserialize)]
            struct Envelope {
                summary: InterviewSummary,
            }
            let envelope: Envelope = serde_json::from_value(value)?;
            ServerMessage::InterviewComplete {
                summary: envelope.summary,
            }
        }
        "error" => {
            #[derive(Deserialize)]
            struct Envelope {
                message: String,
            }
            let envelope: Envelope = serde_json::from_value(value)?;
            ServerMessage::Error {
                message: envelope.message,
            }
        }
        _ => ServerMessage::Unknown(kind),
    };

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_serializes_with_type_tag() {
        let message = ClientMessage::Init {
            session_id: "abc-123".to_string(),
            job_role: "Backend Engineer".to_string(),
            candidate_name: "Ada".to_string(),
            token: Some("jwt".to_string()),
        };

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&message).unwrap()).unwrap();
        assert_eq!(json["type"], "init");
        assert_eq!(json["session_id"], "abc-123");
        assert_eq!(json["token"], "jwt");
    }

    #[test]
    fn test_init_omits_absent_token() {
        let message = ClientMessage::Init {
            session_id: "abc".to_string(),
            job_role: "QA".to_string(),
            candidate_name: "Ada".to_string(),
            token: None,
        };

        let raw = serde_json::to_string(&message).unwrap();
        assert!(!raw.contains("token"));
    }

    #[test]
    fn test_end_interview_serialization() {
        let raw = serde_json::to_string(&ClientMessage::EndInterview).unwrap();
        assert_eq!(raw, r#"{"type":"end_interview"}"#);
    }

    #[test]
    fn test_parse_interviewer_response() {
        let raw = r#"{"type":"interviewer_response","text":"Tell me about yourself.","audio":"UklGRg==","stage":"introduction"}"#;
        match parse_server_message(raw).unwrap() {
            ServerMessage::InterviewerResponse(m) => {
                assert_eq!(m.text, "Tell me about yourself.");
                assert_eq!(m.audio.as_deref(), Some("UklGRg=="));
                assert_eq!(m.stage.as_deref(), Some("introduction"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_parse_candidate_transcript() {
        let raw = r#"{"type":"candidate_transcript","transcript":"I have five years of experience.","stage":"technical"}"#;
        match parse_server_message(raw).unwrap() {
            ServerMessage::CandidateTranscript(m) => {
                assert_eq!(m.transcript, "I have five years of experience.");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_parse_interview_complete() {
        let raw = r#"{
            "type": "interview_complete",
            "summary": {
                "session_id": "s1",
                "candidate_name": "Ada",
                "job_role": "Backend Engineer",
                "scores": {
                    "total_score": 78.5,
                    "average_score": 78.5,
                    "technical_avg": 80.0,
                    "behavioral_avg": 77.0
                },
                "total_questions": 6,
                "conversation_log": [
                    {"role": "interviewer", "content": "Hello", "stage": "introduction"}
                ],
                "stage": "complete"
            }
        }"#;

        match parse_server_message(raw).unwrap() {
            ServerMessage::InterviewComplete { summary } => {
                assert_eq!(summary.session_id, "s1");
                assert!((summary.scores.total_score - 78.5).abs() < f32::EPSILON);
                assert_eq!(summary.conversation_log.len(), 1);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_message() {
        let raw = r#"{"type":"error","message":"session expired"}"#;
        match parse_server_message(raw).unwrap() {
            ServerMessage::Error { message } => assert_eq!(message, "session expired"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_is_preserved() {
        let raw = r#"{"type":"heartbeat","ts":12345}"#;
        match parse_server_message(raw).unwrap() {
            ServerMessage::Unknown(kind) => assert_eq!(kind, "heartbeat"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(parse_server_message("{not json").is_err());
    }
}
