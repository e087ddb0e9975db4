//! Chat entry point for callers
//!
//! Seeds the transcript (system prompt, replayed history, new user message)
//! and hands it to the orchestrator. One [`ChatService`] is shared across
//! requests; each call builds its own transcript.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::tools::ToolRegistry;

use super::orchestrator::Orchestrator;
use super::provider::ChatCompletion;
use super::system_prompt::SYSTEM_PROMPT;
use super::transcript::{Message, Transcript};

/// A prior conversation turn as supplied by the caller
///
/// Roles are free-form strings on the wire; anything other than `user` or
/// `assistant` is dropped when the transcript is rebuilt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

/// Stateless chat facade over the orchestration loop
pub struct ChatService {
    orchestrator: Orchestrator,
}

impl ChatService {
    pub fn new(completion: Option<Arc<dyn ChatCompletion>>, registry: ToolRegistry) -> Self {
        Self {
            orchestrator: Orchestrator::new(completion, registry),
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.orchestrator = self.orchestrator.with_max_rounds(max_rounds);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.orchestrator.is_configured()
    }

    /// Answer one user message given the caller-replayed history
    pub async fn chat(&self, message: &str, history: &[HistoryEntry]) -> Result<String> {
        let run_id = Uuid::new_v4();
        tracing::info!(
            %run_id,
            history_len = history.len(),
            message_len = message.len(),
            "Chat run started"
        );

        let transcript = Self::build_transcript(message, history);
        let answer = self.orchestrator.run(transcript).await?;

        tracing::info!(%run_id, answer_len = answer.len(), "Chat run finished");
        Ok(answer)
    }

    fn build_transcript(message: &str, history: &[HistoryEntry]) -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(Message::system(SYSTEM_PROMPT));

        for entry in history {
            match entry.role.as_str() {
                "user" => transcript.push(Message::user(&entry.content)),
                "assistant" => transcript.push(Message::assistant(&entry.content)),
                other => {
                    tracing::debug!(role = other, "Dropping history entry with unknown role");
                }
            }
        }

        transcript.push(Message::user(message));
        transcript
    }
}
