use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::{AppState, AuthUser};
use crate::domain::ShippingDetails;
use crate::engine::TaxBreakdown;
use crate::error::AppError;
use crate::orchestration::{CheckoutState, Settlement};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStateResponse {
    pub state: CheckoutState,
}

pub async fn get_checkout_state(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Json<CheckoutStateResponse> {
    Json(CheckoutStateResponse {
        state: state.orchestrator.checkout_state(&user).await,
    })
}

pub async fn put_shipping(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(details): Json<ShippingDetails>,
) -> Result<Json<CheckoutStateResponse>, AppError> {
    let checkout_state = state.orchestrator.collect_shipping(&user, details).await?;
    Ok(Json(CheckoutStateResponse {
        state: checkout_state,
    }))
}

pub async fn get_quote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<TaxBreakdown>, AppError> {
    let breakdown = state.orchestrator.quote(&user).await?;
    Ok(Json(breakdown))
}

/// Settle the caller's cart.
///
/// A JSON body carries shipping details; an empty body uses the details
/// stored by `PUT /v1/checkout/shipping`.
pub async fn submit_checkout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Settlement>), AppError> {
    let settlement = if body.iter().all(u8::is_ascii_whitespace) {
        state.orchestrator.checkout_collected(&user).await?
    } else {
        let details: ShippingDetails = serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("invalid shipping details: {}", e)))?;
        state.orchestrator.checkout(&user, details).await?
    };
    Ok((StatusCode::CREATED, Json(settlement)))
}
