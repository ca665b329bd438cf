//! Report API endpoints

use api_types::{
    ledger::PeriodQuery,
    transaction::{FilterQuery, TransactionsResponse},
};
use axum::{Extension, Json, extract::State};
use engine::Period;

use crate::{Principal, ServerError, server::ServerState};

pub async fn by_month(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<PeriodQuery>,
) -> Result<Json<TransactionsResponse>, ServerError> {
    let period = Period::parse(&payload.year_month)?;
    let ledger = state.ledger.read().await;
    Ok(Json(TransactionsResponse {
        transactions: ledger.report(&principal.0, period),
    }))
}

pub async fn income(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<PeriodQuery>,
) -> Result<Json<TransactionsResponse>, ServerError> {
    let period = Period::parse(&payload.year_month)?;
    let ledger = state.ledger.read().await;
    Ok(Json(TransactionsResponse {
        transactions: ledger.income_report(&principal.0, period),
    }))
}

pub async fn expense(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<PeriodQuery>,
) -> Result<Json<TransactionsResponse>, ServerError> {
    let period = Period::parse(&payload.year_month)?;
    let ledger = state.ledger.read().await;
    Ok(Json(TransactionsResponse {
        transactions: ledger.expense_report(&principal.0, period),
    }))
}

/// Transaction history filtered by type, category and month
pub async fn filtered(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<FilterQuery>,
) -> Result<Json<TransactionsResponse>, ServerError> {
    let ledger = state.ledger.read().await;
    let transactions = ledger.filtered(&principal.0, &payload)?;
    Ok(Json(TransactionsResponse { transactions }))
}
