//! Expense domain tools
//!
//! One tool per operation the assistant may perform against the expense
//! store. Tool names, schemas, and result shapes are part of the model
//! contract: amounts cross this boundary in decimal major units (GBP),
//! while the store works in minor units.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::error::{Error, ToolError};
use crate::model::{to_minor_units, Expense, ExpenseStatus, NewExpense};
use crate::store::ExpenseStore;

use super::{BoxFuture, Tool, ToolRegistry};

/// Build the registry of expense tools, in the order advertised to the model
pub fn expense_tool_registry(store: Arc<dyn ExpenseStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(GetAllExpenses { store: store.clone() }));
    registry.register(Arc::new(GetExpensesByStatus { store: store.clone() }));
    registry.register(Arc::new(GetExpenseById { store: store.clone() }));
    registry.register(Arc::new(CreateExpense { store: store.clone() }));
    registry.register(Arc::new(SubmitExpense { store: store.clone() }));
    registry.register(Arc::new(ApproveExpense { store: store.clone() }));
    registry.register(Arc::new(RejectExpense { store: store.clone() }));
    registry.register(Arc::new(DeleteExpense { store: store.clone() }));
    registry.register(Arc::new(GetCategories { store: store.clone() }));
    registry.register(Arc::new(GetUsers { store }));
    registry
}

/// Serialize an expense for the model, converting to major units
fn expense_json(expense: &Expense) -> Value {
    json!({
        "expense_id": expense.expense_id,
        "user_id": expense.user_id,
        "user_name": expense.user_name,
        "category_id": expense.category_id,
        "category_name": expense.category_name,
        "status": expense.status.as_str(),
        "amount": expense.amount_major(),
        "currency": expense.currency,
        "expense_date": expense.expense_date.to_string(),
        "description": expense.description,
        "submitted_at": expense.submitted_at,
        "reviewed_by": expense.reviewed_by,
        "reviewed_at": expense.reviewed_at,
    })
}

fn expenses_json(expenses: &[Expense]) -> Value {
    Value::Array(expenses.iter().map(expense_json).collect())
}

fn store_err(e: Error) -> ToolError {
    ToolError::ExecutionFailed(e.to_string())
}

fn require_i64(args: &Value, key: &str) -> Result<i64, ToolError> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| ToolError::InvalidParams(format!("{} is required", key)))
}

fn require_f64(args: &Value, key: &str) -> Result<f64, ToolError> {
    args.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::InvalidParams(format!("{} is required", key)))
}

fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidParams(format!("{} is required", key)))
}

fn optional_str(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(str::to_string)
}

fn require_date(args: &Value, key: &str) -> Result<NaiveDate, ToolError> {
    let raw = require_str(args, key)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ToolError::InvalidParams(format!("{} must be a YYYY-MM-DD date", key)))
}

struct GetAllExpenses {
    store: Arc<dyn ExpenseStore>,
}

impl Tool for GetAllExpenses {
    fn name(&self) -> &str {
        "get_all_expenses"
    }

    fn description(&self) -> &str {
        "Retrieves all expenses from the database"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn call(&self, _args: Value) -> BoxFuture<'_, Result<Value, ToolError>> {
        Box::pin(async move {
            let expenses = self.store.list_all().await.map_err(store_err)?;
            Ok(expenses_json(&expenses))
        })
    }
}

struct GetExpensesByStatus {
    store: Arc<dyn ExpenseStore>,
}

impl Tool for GetExpensesByStatus {
    fn name(&self) -> &str {
        "get_expenses_by_status"
    }

    fn description(&self) -> &str {
        "Get expenses filtered by status"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "description": "The status to filter by",
                    "enum": ["Draft", "Submitted", "Approved", "Rejected"]
                }
            },
            "required": ["status"]
        })
    }

    fn call(&self, args: Value) -> BoxFuture<'_, Result<Value, ToolError>> {
        Box::pin(async move {
            let status: ExpenseStatus = require_str(&args, "status")?
                .parse()
                .map_err(ToolError::InvalidParams)?;
            let expenses = self.store.list_by_status(status).await.map_err(store_err)?;
            Ok(expenses_json(&expenses))
        })
    }
}

struct GetExpenseById {
    store: Arc<dyn ExpenseStore>,
}

impl Tool for GetExpenseById {
    fn name(&self) -> &str {
        "get_expense_by_id"
    }

    fn description(&self) -> &str {
        "Get details of a specific expense"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expense_id": { "type": "integer", "description": "The ID of the expense" }
            },
            "required": ["expense_id"]
        })
    }

    fn call(&self, args: Value) -> BoxFuture<'_, Result<Value, ToolError>> {
        Box::pin(async move {
            let id = require_i64(&args, "expense_id")?;
            let expense = self.store.get_by_id(id).await.map_err(store_err)?;
            Ok(match expense {
                Some(e) => expense_json(&e),
                None => Value::Null,
            })
        })
    }
}

struct CreateExpense {
    store: Arc<dyn ExpenseStore>,
}

impl Tool for CreateExpense {
    fn name(&self) -> &str {
        "create_expense"
    }

    fn description(&self) -> &str {
        "Create a new expense in the database"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": { "type": "integer", "description": "User ID who created the expense" },
                "category_id": { "type": "integer", "description": "Category ID for the expense" },
                "amount": { "type": "number", "description": "Amount in GBP" },
                "expense_date": { "type": "string", "description": "Date of expense (YYYY-MM-DD)" },
                "description": { "type": "string", "description": "Description of the expense" }
            },
            "required": ["user_id", "category_id", "amount", "expense_date"]
        })
    }

    fn call(&self, args: Value) -> BoxFuture<'_, Result<Value, ToolError>> {
        Box::pin(async move {
            let expense = NewExpense {
                user_id: require_i64(&args, "user_id")?,
                category_id: require_i64(&args, "category_id")?,
                amount_minor: to_minor_units(require_f64(&args, "amount")?),
                currency: "GBP".to_string(),
                expense_date: require_date(&args, "expense_date")?,
                description: optional_str(&args, "description"),
                receipt_file: None,
            };
            let expense_id = self.store.create(expense).await.map_err(store_err)?;
            Ok(json!({ "success": true, "expense_id": expense_id }))
        })
    }
}

struct SubmitExpense {
    store: Arc<dyn ExpenseStore>,
}

impl Tool for SubmitExpense {
    fn name(&self) -> &str {
        "submit_expense"
    }

    fn description(&self) -> &str {
        "Submit a draft expense for approval"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expense_id": { "type": "integer", "description": "The ID of the expense to submit" }
            },
            "required": ["expense_id"]
        })
    }

    fn call(&self, args: Value) -> BoxFuture<'_, Result<Value, ToolError>> {
        Box::pin(async move {
            let id = require_i64(&args, "expense_id")?;
            let affected = self.store.submit(id).await.map_err(store_err)?;
            Ok(json!({ "success": affected > 0 }))
        })
    }
}

struct ApproveExpense {
    store: Arc<dyn ExpenseStore>,
}

impl Tool for ApproveExpense {
    fn name(&self) -> &str {
        "approve_expense"
    }

    fn description(&self) -> &str {
        "Approve a submitted expense"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expense_id": { "type": "integer", "description": "The ID of the expense to approve" },
                "reviewer_id": { "type": "integer", "description": "The ID of the user approving" }
            },
            "required": ["expense_id", "reviewer_id"]
        })
    }

    fn call(&self, args: Value) -> BoxFuture<'_, Result<Value, ToolError>> {
        Box::pin(async move {
            let id = require_i64(&args, "expense_id")?;
            let reviewer = require_i64(&args, "reviewer_id")?;
            let affected = self.store.approve(id, reviewer).await.map_err(store_err)?;
            Ok(json!({ "success": affected > 0 }))
        })
    }
}

struct RejectExpense {
    store: Arc<dyn ExpenseStore>,
}

impl Tool for RejectExpense {
    fn name(&self) -> &str {
        "reject_expense"
    }

    fn description(&self) -> &str {
        "Reject a submitted expense"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expense_id": { "type": "integer", "description": "The ID of the expense to reject" },
                "reviewer_id": { "type": "integer", "description": "The ID of the user rejecting" }
            },
            "required": ["expense_id", "reviewer_id"]
        })
    }

    fn call(&self, args: Value) -> BoxFuture<'_, Result<Value, ToolError>> {
        Box::pin(async move {
            let id = require_i64(&args, "expense_id")?;
            let reviewer = require_i64(&args, "reviewer_id")?;
            let affected = self.store.reject(id, reviewer).await.map_err(store_err)?;
            Ok(json!({ "success": affected > 0 }))
        })
    }
}

struct DeleteExpense {
    store: Arc<dyn ExpenseStore>,
}

impl Tool for DeleteExpense {
    fn name(&self) -> &str {
        "delete_expense"
    }

    fn description(&self) -> &str {
        "Delete an expense from the database"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expense_id": { "type": "integer", "description": "The ID of the expense to delete" }
            },
            "required": ["expense_id"]
        })
    }

    fn call(&self, args: Value) -> BoxFuture<'_, Result<Value, ToolError>> {
        Box::pin(async move {
            let id = require_i64(&args, "expense_id")?;
            let affected = self.store.delete(id).await.map_err(store_err)?;
            Ok(json!({ "success": affected > 0 }))
        })
    }
}

struct GetCategories {
    store: Arc<dyn ExpenseStore>,
}

impl Tool for GetCategories {
    fn name(&self) -> &str {
        "get_categories"
    }

    fn description(&self) -> &str {
        "List all expense categories"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn call(&self, _args: Value) -> BoxFuture<'_, Result<Value, ToolError>> {
        Box::pin(async move {
            let categories = self.store.list_categories().await.map_err(store_err)?;
            serde_json::to_value(categories)
                .map_err(|e| ToolError::ExecutionFailed(e.to_string()))
        })
    }
}

struct GetUsers {
    store: Arc<dyn ExpenseStore>,
}

impl Tool for GetUsers {
    fn name(&self) -> &str {
        "get_users"
    }

    fn description(&self) -> &str {
        "List all users in the system"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn call(&self, _args: Value) -> BoxFuture<'_, Result<Value, ToolError>> {
        Box::pin(async move {
            let users = self.store.list_users().await.map_err(store_err)?;
            serde_json::to_value(users).map_err(|e| ToolError::ExecutionFailed(e.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::model::{ExpenseCategory, ExpenseUpdate, StatusRecord, User};
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    fn registry() -> ToolRegistry {
        expense_tool_registry(Arc::new(MemoryStore::seeded()))
    }

    /// Store whose every operation fails, standing in for an unreachable
    /// persistence layer.
    struct UnavailableStore;

    impl UnavailableStore {
        fn down<T>() -> Result<T> {
            Err(Error::Store("database unavailable".to_string()))
        }
    }

    #[async_trait]
    impl ExpenseStore for UnavailableStore {
        async fn list_all(&self) -> Result<Vec<Expense>> {
            Self::down()
        }
        async fn list_by_status(&self, _status: ExpenseStatus) -> Result<Vec<Expense>> {
            Self::down()
        }
        async fn get_by_id(&self, _expense_id: i64) -> Result<Option<Expense>> {
            Self::down()
        }
        async fn create(&self, _expense: NewExpense) -> Result<i64> {
            Self::down()
        }
        async fn update(&self, _expense_id: i64, _update: ExpenseUpdate) -> Result<u64> {
            Self::down()
        }
        async fn submit(&self, _expense_id: i64) -> Result<u64> {
            Self::down()
        }
        async fn approve(&self, _expense_id: i64, _reviewer_id: i64) -> Result<u64> {
            Self::down()
        }
        async fn reject(&self, _expense_id: i64, _reviewer_id: i64) -> Result<u64> {
            Self::down()
        }
        async fn delete(&self, _expense_id: i64) -> Result<u64> {
            Self::down()
        }
        async fn list_categories(&self) -> Result<Vec<ExpenseCategory>> {
            Self::down()
        }
        async fn list_statuses(&self) -> Result<Vec<StatusRecord>> {
            Self::down()
        }
        async fn list_users(&self) -> Result<Vec<User>> {
            Self::down()
        }
    }

    #[test]
    fn test_registry_order_is_fixed() {
        let names: Vec<_> = registry().specs().into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "get_all_expenses",
                "get_expenses_by_status",
                "get_expense_by_id",
                "create_expense",
                "submit_expense",
                "approve_expense",
                "reject_expense",
                "delete_expense",
                "get_categories",
                "get_users",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_stores_minor_units_and_reads_back_major() {
        let store = Arc::new(MemoryStore::seeded());
        let registry = expense_tool_registry(store.clone());

        let created = registry
            .invoke(
                "create_expense",
                json!({
                    "user_id": 1,
                    "category_id": 1,
                    "amount": 25.40,
                    "expense_date": "2026-08-20",
                    "description": "Client lunch"
                }),
            )
            .await;
        assert_eq!(created["success"], true);
        let id = created["expense_id"].as_i64().unwrap();

        // Persisted in minor units
        let stored = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.amount_minor, 2540);

        // Exchanged with the model in major units
        let fetched = registry
            .invoke("get_expense_by_id", json!({ "expense_id": id }))
            .await;
        assert_eq!(fetched["amount"], 25.40);
        assert_eq!(fetched["currency"], "GBP");
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_a_tool_error() {
        let result = registry()
            .invoke("create_expense", json!({ "user_id": 1 }))
            .await;
        assert!(result["error"]
            .as_str()
            .unwrap()
            .contains("category_id is required"));
    }

    #[tokio::test]
    async fn test_bad_status_is_a_tool_error() {
        let result = registry()
            .invoke("get_expenses_by_status", json!({ "status": "Pending" }))
            .await;
        assert!(result["error"].as_str().unwrap().contains("Unknown status"));
    }

    #[tokio::test]
    async fn test_approve_on_missing_id_reports_failure_not_error() {
        let result = registry()
            .invoke(
                "approve_expense",
                json!({ "expense_id": 999, "reviewer_id": 2 }),
            )
            .await;
        assert_eq!(result, json!({ "success": false }));
    }

    #[tokio::test]
    async fn test_get_by_id_on_missing_expense_is_null() {
        let result = registry()
            .invoke("get_expense_by_id", json!({ "expense_id": 999 }))
            .await;
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_store_failure_is_a_structured_error() {
        let registry = expense_tool_registry(Arc::new(UnavailableStore));

        let listed = registry.invoke("get_all_expenses", json!({})).await;
        assert_eq!(
            listed["error"],
            "Execution failed: Store error: database unavailable"
        );

        // Mutations fail the same contained way
        let submitted = registry
            .invoke("submit_expense", json!({ "expense_id": 1 }))
            .await;
        assert!(submitted["error"]
            .as_str()
            .unwrap()
            .contains("database unavailable"));
    }

    #[tokio::test]
    async fn test_lookup_tools() {
        let registry = registry();
        let categories = registry.invoke("get_categories", json!({})).await;
        assert_eq!(categories.as_array().unwrap().len(), 3);

        let users = registry.invoke("get_users", json!({})).await;
        assert_eq!(users[0]["user_name"], "Alice Hartley");
    }
}
