//! HTTP request handlers

use super::types::{
    ChatRequest, ChatResponse, CreateExpenseRequest, CreatedResponse, ErrorResponse,
    ExpenseResponse, ReviewRequest, SuccessResponse, UpdateExpenseRequest,
};
use super::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tally_core::ExpenseStatus;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/expenses", get(list_expenses).post(create_expense))
        .route(
            "/api/expenses/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route("/api/expenses/status/:status", get(list_by_status))
        .route("/api/expenses/:id/submit", post(submit_expense))
        .route("/api/expenses/:id/approve", post(approve_expense))
        .route("/api/expenses/:id/reject", post(reject_expense))
        .route("/api/categories", get(list_categories))
        .route("/api/statuses", get(list_statuses))
        .route("/api/users", get(list_users))
        .route("/api/chat", post(chat))
        .with_state(state)
}

// ============================================================
// Expenses
// ============================================================

async fn list_expenses(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExpenseResponse>>, AppError> {
    let expenses = state
        .store
        .list_all()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(expenses.into_iter().map(Into::into).collect()))
}

async fn list_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<ExpenseResponse>>, AppError> {
    let status: ExpenseStatus = status.parse().map_err(AppError::BadRequest)?;

    let expenses = state
        .store
        .list_by_status(status)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(expenses.into_iter().map(Into::into).collect()))
}

async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ExpenseResponse>, AppError> {
    let expense = state
        .store
        .get_by_id(id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("Expense {} not found", id)))?;

    Ok(Json(expense.into()))
}

async fn create_expense(
    State(state): State<AppState>,
    Json(req): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    if req.amount <= 0.0 {
        return Err(AppError::BadRequest("Amount must be positive".to_string()));
    }

    let expense_id = state
        .store
        .create(req.into())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(expense_id, "Expense created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { expense_id })))
}

async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateExpenseRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    if req.amount <= 0.0 {
        return Err(AppError::BadRequest("Amount must be positive".to_string()));
    }

    let affected = state
        .store
        .update(id, req.into())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    require_affected(affected, id)
}

async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    let affected = state
        .store
        .delete(id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    require_affected(affected, id)
}

// ============================================================
// Workflow transitions
// ============================================================

async fn submit_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    let affected = state
        .store
        .submit(id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    require_affected(affected, id)
}

async fn approve_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let affected = state
        .store
        .approve(id, req.reviewer_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    require_affected(affected, id)
}

async fn reject_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let affected = state
        .store
        .reject(id, req.reviewer_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    require_affected(affected, id)
}

/// Zero affected rows means the expense was missing or not in a state the
/// operation accepts; both surface as 404 so callers cannot probe which.
fn require_affected(affected: u64, id: i64) -> Result<Json<SuccessResponse>, AppError> {
    if affected > 0 {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!(
            "Expense {} not found or not eligible",
            id
        )))
    }
}

// ============================================================
// Lookups
// ============================================================

async fn list_categories(State(state): State<AppState>) -> Result<Response, AppError> {
    let categories = state
        .store
        .list_categories()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(categories).into_response())
}

async fn list_statuses(State(state): State<AppState>) -> Result<Response, AppError> {
    let statuses = state
        .store
        .list_statuses()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(statuses).into_response())
}

async fn list_users(State(state): State<AppState>) -> Result<Response, AppError> {
    let users = state
        .store
        .list_users()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(users).into_response())
}

// ============================================================
// Chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".to_string()));
    }

    let response = state
        .chat
        .chat(&req.message, &req.history)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(ChatResponse { response }))
}

// ============================================================
// Errors
// ============================================================

pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(detail) => {
                // Full detail stays in the server log; the client gets a
                // generic message so upstream/auth specifics never leak.
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
