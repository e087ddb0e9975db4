//! HTTP API for the Tally server

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use std::sync::Arc;
use tally_core::{ChatService, ExpenseStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ExpenseStore>,
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(store: Arc<dyn ExpenseStore>, chat: Arc<ChatService>) -> Self {
        Self { store, chat }
    }
}
