use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::catalog::ItemFilter;
use crate::error::AppError;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready once the catalog answers.
pub async fn ready(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let items = state.catalog.list_items(&ItemFilter::default()).await?;
    Ok(Json(serde_json::json!({
        "status": "ready",
        "catalogItems": items.len(),
    })))
}
