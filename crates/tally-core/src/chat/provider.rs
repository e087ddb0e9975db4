//! Chat-completion provider boundary

use async_trait::async_trait;

use crate::error::Result;
use crate::tools::ToolSpec;

use super::transcript::{ToolCallRequest, Transcript};

/// Why the model stopped producing output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Normal completion: the content is the final answer
    Stop,
    /// The model is requesting tool invocations before it can answer
    ToolCalls,
}

/// One model response: text content, tool-call requests, or both
#[derive(Debug, Clone, Default)]
pub struct CompletionResult {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl CompletionResult {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn finish_reason(&self) -> FinishReason {
        if self.has_tool_calls() {
            FinishReason::ToolCalls
        } else {
            FinishReason::Stop
        }
    }
}

/// A chat-completion service that accepts a transcript plus tool specs and
/// returns zero-or-more tool-call requests per response
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(
        &self,
        transcript: &Transcript,
        tools: &[ToolSpec],
    ) -> Result<CompletionResult>;
}
