//! Tally Core - Expense management with a conversational assistant
//!
//! This crate provides the core functionality for the Tally application:
//! - Expense domain model and approval workflow
//! - Pluggable expense store with an in-memory implementation
//! - Tool system exposing expense operations to a language model
//! - Conversation orchestration loop over a chat-completion provider
//! - Application configuration

pub mod chat;
pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod tools;

pub use chat::{
    ChatCompletion, ChatService, CompletionResult, GenAiChat, HistoryEntry, Message, Orchestrator,
    ToolCallRequest, Transcript, DEFAULT_MAX_ROUNDS, SYSTEM_PROMPT, UNCONFIGURED_MESSAGE,
};
pub use config::{ChatConfig, Config, ServerConfig};
pub use error::{Error, Result, ToolError};
pub use model::{
    to_major_units, to_minor_units, Expense, ExpenseCategory, ExpenseStatus, ExpenseUpdate,
    NewExpense, StatusRecord, User, MINOR_UNITS_PER_MAJOR,
};
pub use store::{ExpenseStore, MemoryStore};
pub use tools::{expense_tool_registry, Tool, ToolRegistry, ToolSpec};
