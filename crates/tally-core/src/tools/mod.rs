//! Tool system for the chat assistant
//!
//! Tools are the functions the model can call. Each tool has:
//! - A name and description for the model
//! - A JSON schema for parameters
//! - A call method
//!
//! Invocation never fails the conversation: handler errors and unknown
//! names become structured `{"error": ...}` results the model can react to.

pub mod expense;

pub use expense::expense_tool_registry;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::ToolError;

/// Boxed future type for object-safe async trait methods
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Tool declaration advertised to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Core trait for all tools
pub trait Tool: Send + Sync {
    /// Tool name (used by the model to invoke)
    fn name(&self) -> &str;

    /// Description of what the tool does
    fn description(&self) -> &str;

    /// JSON schema for parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given arguments
    fn call(&self, args: Value) -> BoxFuture<'_, Result<Value, ToolError>>;

    /// Convert to a spec for the model
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Registry of available tools
///
/// Registration order is preserved: the spec list sent to the model is
/// stable and deterministic.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A re-registered name replaces the original handler
    /// but keeps its position.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        match self.index.get(tool.name()) {
            Some(&pos) => self.tools[pos] = tool,
            None => {
                self.index.insert(tool.name().to_string(), self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&pos| self.tools[pos].clone())
    }

    /// Tool specs in registration order
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name, always yielding a structured result.
    ///
    /// An unregistered name or a handler failure is data for the model,
    /// not a failure of the conversation.
    pub async fn invoke(&self, name: &str, args: Value) -> Value {
        let Some(tool) = self.get(name) else {
            tracing::warn!(tool = name, "Model requested an unregistered tool");
            return json!({ "error": "Unknown function" });
        };
        match tool.call(args).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "Tool invocation failed");
                json!({ "error": e.to_string() })
            }
        }
    }
}
