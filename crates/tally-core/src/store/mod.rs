//! Expense persistence boundary
//!
//! The relational layer behind this trait is an external collaborator; the
//! core only depends on the operations below. Mutations return the number of
//! affected rows — zero means "not found" (or an invalid workflow
//! transition) and is never an error.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    Expense, ExpenseCategory, ExpenseStatus, ExpenseUpdate, NewExpense, StatusRecord, User,
};

/// Storage operations for the expense workflow
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Expense>>;

    async fn list_by_status(&self, status: ExpenseStatus) -> Result<Vec<Expense>>;

    async fn get_by_id(&self, expense_id: i64) -> Result<Option<Expense>>;

    /// Create a new Draft expense, returning its id
    async fn create(&self, expense: NewExpense) -> Result<i64>;

    async fn update(&self, expense_id: i64, update: ExpenseUpdate) -> Result<u64>;

    /// Move a Draft expense to Submitted
    async fn submit(&self, expense_id: i64) -> Result<u64>;

    /// Move a Submitted expense to Approved, recording the reviewer
    async fn approve(&self, expense_id: i64, reviewer_id: i64) -> Result<u64>;

    /// Move a Submitted expense to Rejected, recording the reviewer
    async fn reject(&self, expense_id: i64, reviewer_id: i64) -> Result<u64>;

    async fn delete(&self, expense_id: i64) -> Result<u64>;

    async fn list_categories(&self) -> Result<Vec<ExpenseCategory>>;

    async fn list_statuses(&self) -> Result<Vec<StatusRecord>>;

    async fn list_users(&self) -> Result<Vec<User>>;
}
