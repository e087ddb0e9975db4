//! Request and response bodies for the HTTP API
//!
//! Amounts cross this boundary as decimal major units; the core keeps them
//! in minor units internally.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_core::{to_minor_units, Expense, ExpenseUpdate, HistoryEntry, NewExpense};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// An expense as presented over the API
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub expense_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub category_id: i64,
    pub category_name: String,
    pub status: String,
    pub amount: f64,
    pub currency: String,
    pub expense_date: NaiveDate,
    pub description: Option<String>,
    pub receipt_file: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Expense> for ExpenseResponse {
    fn from(e: Expense) -> Self {
        Self {
            expense_id: e.expense_id,
            user_id: e.user_id,
            user_name: e.user_name.clone(),
            category_id: e.category_id,
            category_name: e.category_name.clone(),
            status: e.status.to_string(),
            amount: e.amount_major(),
            currency: e.currency.clone(),
            expense_date: e.expense_date,
            description: e.description,
            receipt_file: e.receipt_file,
            submitted_at: e.submitted_at,
            reviewed_by: e.reviewed_by,
            reviewed_at: e.reviewed_at,
            created_at: e.created_at,
        }
    }
}

fn default_currency() -> String {
    "GBP".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub user_id: i64,
    pub category_id: i64,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub expense_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub receipt_file: Option<String>,
}

impl From<CreateExpenseRequest> for NewExpense {
    fn from(req: CreateExpenseRequest) -> Self {
        Self {
            user_id: req.user_id,
            category_id: req.category_id,
            amount_minor: to_minor_units(req.amount),
            currency: req.currency,
            expense_date: req.expense_date,
            description: req.description,
            receipt_file: req.receipt_file,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub category_id: i64,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub expense_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub receipt_file: Option<String>,
}

impl From<UpdateExpenseRequest> for ExpenseUpdate {
    fn from(req: UpdateExpenseRequest) -> Self {
        Self {
            category_id: req.category_id,
            amount_minor: to_minor_units(req.amount),
            currency: req.currency,
            expense_date: req.expense_date,
            description: req.description,
            receipt_file: req.receipt_file,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub reviewer_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub expense_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}
