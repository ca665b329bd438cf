//! Transactions API endpoints

use api_types::transaction::{BatchAccepted, TransactionBatch};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{Principal, ServerError, server::ServerState};

/// Store a batch of transactions for the caller
pub async fn add(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionBatch>,
) -> Result<(StatusCode, Json<BatchAccepted>), ServerError> {
    let mut ledger = state.ledger.write().await;
    let accepted = ledger.add_transactions(&principal.0, payload)?;
    tracing::info!("{} for {}", accepted.message, principal.0);
    Ok((StatusCode::CREATED, Json(accepted)))
}
