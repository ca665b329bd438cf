//! Aggregate API endpoints (balance, income, expense)

use api_types::ledger::{Aggregate, PeriodQuery};
use axum::{Extension, Json, extract::State};
use engine::Period;

use crate::{Principal, ServerError, server::ServerState};

/// Handle requests for the balance of a period
pub async fn balance(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<PeriodQuery>,
) -> Result<Json<Aggregate>, ServerError> {
    let period = Period::parse(&payload.year_month)?;
    let ledger = state.ledger.read().await;
    Ok(Json(Aggregate {
        value: ledger.balance(&principal.0, period),
    }))
}

/// Handle requests for the total income of a period
pub async fn income(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<PeriodQuery>,
) -> Result<Json<Aggregate>, ServerError> {
    let period = Period::parse(&payload.year_month)?;
    let ledger = state.ledger.read().await;
    Ok(Json(Aggregate {
        value: ledger.income(&principal.0, period),
    }))
}

/// Handle requests for the total expense of a period
pub async fn expense(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<PeriodQuery>,
) -> Result<Json<Aggregate>, ServerError> {
    let period = Period::parse(&payload.year_month)?;
    let ledger = state.ledger.read().await;
    Ok(Json(Aggregate {
        value: ledger.expense(&principal.0, period),
    }))
}
