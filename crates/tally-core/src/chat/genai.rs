//! genai-backed chat-completion provider
//!
//! Talks to the configured model through the genai client with manual tool
//! control, so tool execution stays in the orchestrator.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use genai::chat::{ChatMessage, ChatRequest, ChatStreamEvent, Tool, ToolCall, ToolResponse};
use genai::resolver::{AuthData, AuthResolver};
use genai::Client;
use genai::WebConfig;

use crate::error::{Error, Result};
use crate::tools::ToolSpec;

use super::provider::{ChatCompletion, CompletionResult};
use super::transcript::{Message, ToolCallRequest, Transcript};

/// Provider implementation over the genai client
pub struct GenAiChat {
    client: Client,
    model: String,
}

impl GenAiChat {
    /// Default timeout for model API requests
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    fn default_web_config() -> WebConfig {
        WebConfig::default()
            .with_timeout(Self::DEFAULT_TIMEOUT)
            .with_connect_timeout(Duration::from_secs(30))
    }

    /// Create a provider resolving credentials from the environment
    pub fn new(model: impl Into<String>) -> Self {
        let client = Client::builder()
            .with_web_config(Self::default_web_config())
            .build();
        Self {
            client,
            model: model.into(),
        }
    }

    /// Create a provider with an explicit API key
    pub fn with_api_key(model: impl Into<String>, api_key: &str) -> Self {
        let api_key = api_key.to_string();
        let auth_resolver = AuthResolver::from_resolver_fn(
            move |_model_iden| -> std::result::Result<Option<AuthData>, genai::resolver::Error> {
                Ok(Some(AuthData::from_single(api_key.clone())))
            },
        );

        let client = Client::builder()
            .with_web_config(Self::default_web_config())
            .with_auth_resolver(auth_resolver)
            .build();

        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert a transcript into a genai chat request
    fn build_request(transcript: &Transcript, tools: &[ToolSpec]) -> ChatRequest {
        let mut chat_req = ChatRequest::default();

        for message in transcript.messages() {
            match message {
                Message::System { content } => {
                    chat_req = chat_req.append_message(ChatMessage::system(content));
                }
                Message::User { content } => {
                    chat_req = chat_req.append_message(ChatMessage::user(content));
                }
                Message::Assistant {
                    content,
                    tool_calls,
                } => {
                    if tool_calls.is_empty() {
                        chat_req = chat_req.append_message(ChatMessage::assistant(content));
                    } else {
                        // Tool calls must travel as a single assistant message
                        let genai_tool_calls: Vec<ToolCall> = tool_calls
                            .iter()
                            .map(|tc| ToolCall {
                                call_id: tc.id.clone(),
                                fn_name: tc.name.clone(),
                                fn_arguments: tc.arguments.clone(),
                                thought_signatures: None,
                            })
                            .collect();
                        chat_req = chat_req.append_message(genai_tool_calls);
                    }
                }
                Message::ToolResult { call_id, content } => {
                    chat_req = chat_req
                        .append_message(ToolResponse::new(call_id.clone(), content.clone()));
                }
            }
        }

        if !tools.is_empty() {
            let genai_tools: Vec<Tool> = tools
                .iter()
                .map(|t| {
                    Tool::new(&t.name)
                        .with_description(&t.description)
                        .with_schema(t.parameters.clone())
                })
                .collect();
            chat_req = chat_req.with_tools(genai_tools);
        }

        chat_req
    }
}

#[async_trait]
impl ChatCompletion for GenAiChat {
    async fn complete(
        &self,
        transcript: &Transcript,
        tools: &[ToolSpec],
    ) -> Result<CompletionResult> {
        let chat_req = Self::build_request(transcript, tools);

        let stream_res = self
            .client
            .exec_chat_stream(&self.model, chat_req, None)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, model = %self.model, "Model request failed");
                Error::Provider(format!("genai error: {:?}", e))
            })?;

        let mut content = String::new();
        let mut tool_calls: Vec<ToolCallRequest> = Vec::new();
        let mut stream = stream_res.stream;

        while let Some(event) = stream.next().await {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => {
                    content.push_str(&chunk.content);
                }
                Ok(ChatStreamEvent::ToolCallChunk(tc)) => {
                    let tool_call = tc.tool_call;
                    tool_calls.push(ToolCallRequest {
                        id: tool_call.call_id,
                        name: tool_call.fn_name,
                        arguments: tool_call.fn_arguments,
                    });
                }
                Ok(ChatStreamEvent::End(_)) => {
                    break;
                }
                Ok(_) => {
                    // Start, reasoning, and thought-signature events carry
                    // nothing the transcript needs
                }
                Err(e) => {
                    tracing::error!(error = ?e, model = %self.model, "Model stream error");
                    return Err(Error::Provider(format!("genai stream error: {:?}", e)));
                }
            }
        }

        tracing::debug!(
            model = %self.model,
            content_len = content.len(),
            tool_calls = tool_calls.len(),
            "Model response received"
        );

        Ok(CompletionResult {
            content: if content.is_empty() { None } else { Some(content) },
            tool_calls,
        })
    }
}
