//! Conversation orchestration loop
//!
//! Drives rounds against the chat-completion service: send the transcript
//! plus tool specs, then either return the model's final text or execute the
//! requested tool calls, append their results, and go again. The loop is
//! bounded by a round cap so a model that never stops requesting tools
//! cannot spin forever.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::tools::ToolRegistry;

use super::provider::{ChatCompletion, FinishReason};
use super::transcript::{Message, Transcript};

/// Default cap on tool-call rounds per run
pub const DEFAULT_MAX_ROUNDS: usize = 8;

/// Fixed degraded-mode reply when no completion backend is configured
pub const UNCONFIGURED_MESSAGE: &str = "AI chat is not configured. Set a model and \
API key in the [chat] section of the configuration to enable the assistant.";

/// Fallback when the model finishes without any text content
const EMPTY_RESPONSE_FALLBACK: &str = "I apologize, but I couldn't generate a response.";

/// The conversation loop over one transcript
pub struct Orchestrator {
    completion: Option<Arc<dyn ChatCompletion>>,
    registry: ToolRegistry,
    max_rounds: usize,
}

impl Orchestrator {
    /// Create an orchestrator. `completion: None` puts every run in
    /// degraded mode.
    pub fn new(completion: Option<Arc<dyn ChatCompletion>>, registry: ToolRegistry) -> Self {
        Self {
            completion,
            registry,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Override the tool-call round cap
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.completion.is_some()
    }

    /// Run the loop to a final answer.
    ///
    /// The transcript must already be seeded (system prompt, prior history,
    /// new user message); this method only appends assistant and tool-result
    /// turns.
    pub async fn run(&self, mut transcript: Transcript) -> Result<String> {
        let Some(completion) = &self.completion else {
            tracing::warn!("Chat completion backend not configured; returning degraded-mode reply");
            return Ok(UNCONFIGURED_MESSAGE.to_string());
        };

        let specs = self.registry.specs();

        for round in 1..=self.max_rounds {
            let response = completion.complete(&transcript, &specs).await?;

            match response.finish_reason() {
                FinishReason::Stop => {
                    tracing::debug!(round, "Model produced final answer");
                    return Ok(response
                        .content
                        .unwrap_or_else(|| EMPTY_RESPONSE_FALLBACK.to_string()));
                }
                FinishReason::ToolCalls => {}
            }

            let tool_calls = response.tool_calls;
            tracing::debug!(round, requested = tool_calls.len(), "Executing tool calls");

            transcript.push(Message::assistant_with_tool_calls(
                response.content.unwrap_or_default(),
                tool_calls.clone(),
            ));

            // One result per call, appended in the order the model emitted
            // them, so every result pairs unambiguously with its call id.
            for call in tool_calls {
                let result = self.registry.invoke(&call.name, call.arguments).await;
                transcript.push(Message::tool_result(call.id, result.to_string()));
            }
        }

        tracing::warn!(max_rounds = self.max_rounds, "Tool-call round cap exceeded");
        Err(Error::RoundBudget(self.max_rounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::provider::CompletionResult;
    use crate::chat::transcript::ToolCallRequest;
    use crate::error::ToolError;
    use crate::tools::{BoxFuture, Tool, ToolSpec};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Completion fake that replays scripted responses and records every
    /// transcript it is sent. Once the script runs dry it keeps requesting
    /// tools, which is how the round-cap tests force an endless model.
    struct Scripted {
        responses: Mutex<VecDeque<CompletionResult>>,
        seen: Mutex<Vec<Transcript>>,
    }

    impl Scripted {
        fn new(responses: Vec<CompletionResult>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn rounds_seen(&self) -> usize {
            self.seen.lock().len()
        }
    }

    #[async_trait]
    impl ChatCompletion for Scripted {
        async fn complete(
            &self,
            transcript: &Transcript,
            _tools: &[ToolSpec],
        ) -> crate::error::Result<CompletionResult> {
            self.seen.lock().push(transcript.clone());
            Ok(self.responses.lock().pop_front().unwrap_or_else(|| {
                CompletionResult {
                    content: None,
                    tool_calls: vec![call("again", "counter", json!({}))],
                }
            }))
        }
    }

    struct Counter {
        hits: Arc<AtomicUsize>,
    }

    impl Tool for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn description(&self) -> &str {
            "Counts invocations"
        }

        fn parameters_schema(&self) -> Value {
            json!({ "type": "object", "properties": {} })
        }

        fn call(&self, _args: Value) -> BoxFuture<'_, std::result::Result<Value, ToolError>> {
            let hits = self.hits.fetch_add(1, Ordering::SeqCst) + 1;
            Box::pin(async move { Ok(json!({ "hits": hits })) })
        }
    }

    fn call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
        ToolCallRequest {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    fn counting_registry() -> (ToolRegistry, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Counter { hits: hits.clone() }));
        (registry, hits)
    }

    fn final_answer(text: &str) -> CompletionResult {
        CompletionResult {
            content: Some(text.to_string()),
            tool_calls: Vec::new(),
        }
    }

    fn seeded() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(Message::system("prompt"));
        transcript.push(Message::user("hello"));
        transcript
    }

    #[tokio::test]
    async fn test_no_tool_calls_finishes_in_one_round() {
        let scripted = Arc::new(Scripted::new(vec![final_answer("All done.")]));
        let (registry, hits) = counting_registry();
        let orchestrator = Orchestrator::new(Some(scripted.clone()), registry);

        let answer = orchestrator.run(seeded()).await.unwrap();
        assert_eq!(answer, "All done.");
        assert_eq!(scripted.rounds_seen(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tool_round_then_final_answer() {
        let scripted = Arc::new(Scripted::new(vec![
            CompletionResult {
                content: None,
                tool_calls: vec![call("call_1", "counter", json!({}))],
            },
            final_answer("Counted."),
        ]));
        let (registry, hits) = counting_registry();
        let orchestrator = Orchestrator::new(Some(scripted.clone()), registry);

        let answer = orchestrator.run(seeded()).await.unwrap();
        assert_eq!(answer, "Counted.");
        assert_eq!(scripted.rounds_seen(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_results_paired_with_calls_in_emitted_order() {
        let scripted = Arc::new(Scripted::new(vec![
            CompletionResult {
                content: Some("Checking.".to_string()),
                tool_calls: vec![
                    call("call_a", "counter", json!({})),
                    call("call_b", "bogus", json!({})),
                    call("call_c", "counter", json!({})),
                ],
            },
            final_answer("Done."),
        ]));
        let (registry, _hits) = counting_registry();
        let orchestrator = Orchestrator::new(Some(scripted.clone()), registry);

        orchestrator.run(seeded()).await.unwrap();

        // The transcript sent on round two carries the assistant turn plus
        // one result per call, in the original order.
        let seen = scripted.seen.lock();
        let second = &seen[1];
        let tail = &second.messages()[2..];
        assert_eq!(tail.len(), 4);

        match &tail[0] {
            Message::Assistant { tool_calls, .. } => {
                let ids: Vec<_> = tool_calls.iter().map(|c| c.id.as_str()).collect();
                assert_eq!(ids, vec!["call_a", "call_b", "call_c"]);
            }
            other => panic!("Expected assistant message, got {:?}", other),
        }

        let result_ids: Vec<_> = tail[1..]
            .iter()
            .map(|m| match m {
                Message::ToolResult { call_id, .. } => call_id.as_str(),
                other => panic!("Expected tool result, got {:?}", other),
            })
            .collect();
        assert_eq!(result_ids, vec!["call_a", "call_b", "call_c"]);

        // The unregistered name produced a structured error, and the run
        // still reached a final answer.
        match &tail[2] {
            Message::ToolResult { content, .. } => {
                assert_eq!(content, &json!({ "error": "Unknown function" }).to_string());
            }
            other => panic!("Expected tool result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_round_cap_bounds_an_endless_model() {
        // Empty script: every round requests another tool call
        let scripted = Arc::new(Scripted::new(Vec::new()));
        let (registry, hits) = counting_registry();
        let orchestrator = Orchestrator::new(Some(scripted.clone()), registry).with_max_rounds(3);

        let err = orchestrator.run(seeded()).await.unwrap_err();
        assert!(matches!(err, Error::RoundBudget(3)));
        assert_eq!(scripted.rounds_seen(), 3);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_empty_final_content_falls_back_to_apology() {
        let scripted = Arc::new(Scripted::new(vec![CompletionResult {
            content: None,
            tool_calls: Vec::new(),
        }]));
        let orchestrator = Orchestrator::new(Some(scripted), ToolRegistry::new());

        let answer = orchestrator.run(seeded()).await.unwrap();
        assert_eq!(answer, EMPTY_RESPONSE_FALLBACK);
    }

    #[tokio::test]
    async fn test_unconfigured_backend_degrades_without_tool_calls() {
        let (registry, hits) = counting_registry();
        let orchestrator = Orchestrator::new(None, registry);

        let answer = orchestrator.run(seeded()).await.unwrap();
        assert_eq!(answer, UNCONFIGURED_MESSAGE);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        struct Failing;

        #[async_trait]
        impl ChatCompletion for Failing {
            async fn complete(
                &self,
                _transcript: &Transcript,
                _tools: &[ToolSpec],
            ) -> crate::error::Result<CompletionResult> {
                Err(Error::Provider("connection refused".to_string()))
            }
        }

        let orchestrator = Orchestrator::new(Some(Arc::new(Failing)), ToolRegistry::new());
        let err = orchestrator.run(seeded()).await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }
}
