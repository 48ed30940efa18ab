//! Expense API endpoints

use api_types::expense::{Expense, ExpenseDeleted, ExpenseNew};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::NewExpense;

use crate::{
    ServerError,
    server::{Caller, ServerState},
};

fn expense_view(expense: engine::Expense) -> Expense {
    Expense {
        id: expense.id,
        group_id: expense.group_id,
        description: expense.description,
        amount: expense.amount,
        paid_by: expense.paid_by,
        participants: expense.participants,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}

/// Handle requests for recording a new expense
pub async fn create(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    payload: Result<Json<ExpenseNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), ServerError> {
    let Json(payload) = payload?;
    tracing::debug!(caller = %caller.0, "new expense request");

    let expense = state
        .engine
        .record_expense(NewExpense {
            group_id: payload.group_id,
            description: payload.description,
            amount: payload.amount,
            paid_by: payload.paid_by,
            participants: payload.participants,
        })
        .await
        .map_err(ServerError::rejected_write)?;

    Ok((StatusCode::CREATED, Json(expense_view(expense))))
}

/// Handle requests for a single expense
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Expense>, ServerError> {
    Ok(Json(expense_view(state.engine.expense(&id).await?)))
}

/// Handle requests for listing the expenses of a group, oldest first
pub async fn list_by_group(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<Expense>>, ServerError> {
    let expenses = state.engine.list_group_expenses(&group_id).await?;
    Ok(Json(expenses.into_iter().map(expense_view).collect()))
}

/// Handle requests for deleting an expense
pub async fn delete(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ExpenseDeleted>, ServerError> {
    tracing::debug!(caller = %caller.0, expense_id = %id, "delete expense request");
    state.engine.delete_expense(&id).await?;

    Ok(Json(ExpenseDeleted {
        message: "Expense deleted".to_string(),
    }))
}
