//! Conversational layer: transcript types, the completion-provider boundary,
//! the tool-call orchestration loop, and the caller-facing service.

mod genai;
mod orchestrator;
mod provider;
mod service;
mod system_prompt;
mod transcript;

pub use self::genai::GenAiChat;
pub use orchestrator::{Orchestrator, DEFAULT_MAX_ROUNDS, UNCONFIGURED_MESSAGE};
pub use provider::{ChatCompletion, CompletionResult, FinishReason};
pub use service::{ChatService, HistoryEntry};
pub use system_prompt::SYSTEM_PROMPT;
pub use transcript::{Message, ToolCallRequest, Transcript};
