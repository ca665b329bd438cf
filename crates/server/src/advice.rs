//! AI advice endpoint

use api_types::ledger::{AdviceRequest, AdviceResponse};
use axum::{Extension, Json};

use crate::{Principal, ServerError};

pub async fn get(
    Extension(principal): Extension<Principal>,
    Json(payload): Json<AdviceRequest>,
) -> Result<Json<AdviceResponse>, ServerError> {
    tracing::debug!(
        "advice requested by {}: income {}, expenses {}, balance {}",
        principal.0,
        payload.total_income,
        payload.total_expenses,
        payload.balance
    );
    let advice = engine::advice::compose(&payload)?;
    Ok(Json(AdviceResponse { advice }))
}
