use api_types::ledger::ExchangeRateResponse;
use axum::{Json, extract::State};

use crate::server::ServerState;

/// Rupiah for one US dollar
pub async fn rate(State(state): State<ServerState>) -> Json<ExchangeRateResponse> {
    let ledger = state.ledger.read().await;
    Json(ExchangeRateResponse {
        rate: ledger.exchange_rate(),
    })
}
