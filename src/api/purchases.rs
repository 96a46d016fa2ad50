use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{AppState, AuthUser};
use crate::domain::{Purchase, PurchaseId};
use crate::error::AppError;
use crate::recorder::PurchasePage;

#[derive(Debug, Deserialize)]
pub struct PurchasesQuery {
    pub limit: Option<u32>,
    /// Id of the last purchase on the previous page.
    pub before: Option<String>,
}

impl PurchasesQuery {
    fn into_page(self) -> Result<PurchasePage, AppError> {
        let limit = self.limit.unwrap_or(PurchasePage::DEFAULT_LIMIT);
        if limit == 0 || limit > PurchasePage::MAX_LIMIT {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {}",
                PurchasePage::MAX_LIMIT
            )));
        }
        let mut page = PurchasePage::first(limit);
        if let Some(raw) = self.before.as_deref().filter(|s| !s.trim().is_empty()) {
            let id = PurchaseId::from_str(raw.trim())
                .map_err(|_| AppError::BadRequest(format!("invalid cursor: {}", raw)))?;
            page = page.before(id);
        }
        Ok(page)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasesResponse {
    pub purchases: Vec<Purchase>,
    /// Pass as `before` to fetch the next page; absent on the last page.
    pub next_before: Option<PurchaseId>,
}

/// The caller's purchases, newest first, a page at a time.
pub async fn list_purchases(
    AuthUser(user): AuthUser,
    Query(params): Query<PurchasesQuery>,
    State(state): State<AppState>,
) -> Result<Json<PurchasesResponse>, AppError> {
    let page = params.into_page()?;
    let purchases = state
        .orchestrator
        .recorder()
        .list_by_user(&user, page)
        .await?;

    let next_before = if purchases.len() == page.limit as usize {
        purchases.last().map(|p| p.id)
    } else {
        None
    };
    Ok(Json(PurchasesResponse {
        purchases,
        next_before,
    }))
}
