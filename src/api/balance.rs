use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::{AppState, AuthUser};
use crate::domain::Money;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub user_id: String,
    pub balance: Money,
}

/// First sight of a user opens their account with the initial balance.
pub async fn get_balance(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<BalanceResponse>, AppError> {
    let balance = state.orchestrator.ensure_account(&user).await?;
    Ok(Json(BalanceResponse {
        user_id: user.to_string(),
        balance,
    }))
}
