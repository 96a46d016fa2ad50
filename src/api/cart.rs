use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{AppState, AuthUser};
use crate::domain::{Cart, CartError, CartLine, ItemId, Money};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub line_total: Money,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u64,
    pub subtotal: Money,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart
                .lines()
                .iter()
                .map(|line| CartLineView {
                    line_total: line.extended_price(),
                    line: line.clone(),
                })
                .collect(),
            item_count: cart.item_count(),
            subtotal: cart.subtotal(),
        }
    }
}

/// A user without a session sees an empty cart; nothing is created.
pub async fn get_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<CartView>, AppError> {
    let view = match state.orchestrator.existing_session(&user).await {
        Some(session) => CartView::from(&*session.cart().await),
        None => CartView::from(&Cart::new()),
    };
    Ok(Json(view))
}

/// Prices come from the catalog at add time, never from the request.
pub async fn add_item(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartView>), AppError> {
    let item_id = ItemId::new(req.item_id);
    let item = state
        .catalog
        .get_item(&item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {} not found", item_id)))?;

    let session = state.orchestrator.session(&user).await;
    let mut cart = session.cart().await;
    cart.add(&item, req.quantity)?;
    tracing::debug!(user = %user, item = %item_id, quantity = req.quantity, "Added to cart");
    Ok((StatusCode::CREATED, Json(CartView::from(&*cart))))
}

pub async fn update_item(
    AuthUser(user): AuthUser,
    Path(item_id): Path<String>,
    State(state): State<AppState>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>, AppError> {
    let item_id = ItemId::new(item_id);
    let session = state
        .orchestrator
        .existing_session(&user)
        .await
        .ok_or_else(|| CartError::NotInCart(item_id.clone()))?;
    let mut cart = session.cart().await;
    cart.set_quantity(&item_id, req.quantity)?;
    Ok(Json(CartView::from(&*cart)))
}

pub async fn remove_item(
    AuthUser(user): AuthUser,
    Path(item_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CartView>, AppError> {
    let item_id = ItemId::new(item_id);
    let session = state
        .orchestrator
        .existing_session(&user)
        .await
        .ok_or_else(|| CartError::NotInCart(item_id.clone()))?;
    let mut cart = session.cart().await;
    cart.remove(&item_id)?;
    Ok(Json(CartView::from(&*cart)))
}

pub async fn clear_cart(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    if let Some(session) = state.orchestrator.existing_session(&user).await {
        session.cart().await.clear();
    }
    Ok(StatusCode::NO_CONTENT)
}
