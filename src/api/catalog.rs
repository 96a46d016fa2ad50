use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::str::FromStr;

use super::AppState;
use crate::catalog::ItemFilter;
use crate::domain::{Category, Item, ItemId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl CatalogQuery {
    fn into_filter(self) -> Result<ItemFilter, AppError> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                Some(Category::from_str(raw).map_err(|e| AppError::BadRequest(e.to_string()))?)
            }
        };
        Ok(ItemFilter {
            category,
            search: self.search,
        })
    }
}

pub async fn list_catalog(
    Query(params): Query<CatalogQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Item>>, AppError> {
    let filter = params.into_filter()?;
    let items = state.catalog.list_items(&filter).await?;
    Ok(Json(items))
}

pub async fn get_catalog_item(
    Path(item_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Item>, AppError> {
    let id = ItemId::new(item_id);
    state
        .catalog
        .get_item(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("item {} not found", id)))
}
