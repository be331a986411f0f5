//! Append-only session transcript.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Who spoke a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    Interviewer,
    Candidate,
}

/// One spoken line with its interview stage and arrival time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: SpeakerRole,
    pub text: String,
    pub stage: Option<String>,
    /// Milliseconds since the Unix epoch at append time
    pub timestamp_ms: u64,
}

/// The session transcript. Entries are only ever appended in arrival order;
/// once frozen (on interview completion) further appends are dropped.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    frozen: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, returning the stored entry. Ignored after freezing.
    pub fn append(
        &mut self,
        role: SpeakerRole,
        text: impl Into<String>,
        stage: Option<String>,
    ) -> Option<TranscriptEntry> {
        if self.frozen {
            tracing::warn!("Dropping transcript line after completion");
            return None;
        }
        let entry = TranscriptEntry {
            role,
            text: text.into(),
            stage,
            timestamp_ms: now_millis(),
        };
        self.entries.push(entry.clone());
        Some(entry)
    }

    /// Make the transcript immutable. Called when the final summary arrives.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.append(SpeakerRole::Interviewer, "Hello", None);
        transcript.append(SpeakerRole::Candidate, "Hi", Some("introduction".into()));

        let entries = transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, SpeakerRole::Interviewer);
        assert_eq!(entries[1].text, "Hi");
        assert_eq!(entries[1].stage.as_deref(), Some("introduction"));
    }

    #[test]
    fn test_frozen_transcript_drops_appends() {
        let mut transcript = Transcript::new();
        transcript.append(SpeakerRole::Interviewer, "Goodbye", None);
        transcript.freeze();

        assert!(transcript.is_frozen());
        assert!(transcript.append(SpeakerRole::Candidate, "Wait", None).is_none());
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(
            serde_json::to_string(&SpeakerRole::Candidate).unwrap(),
            r#""candidate""#
        );
    }
}
