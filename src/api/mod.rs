pub mod auth;
pub mod balance;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod purchases;

use crate::catalog::CatalogSource;
use crate::orchestration::SettlementOrchestrator;
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub use auth::AuthUser;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogSource>,
    pub orchestrator: Arc<SettlementOrchestrator>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogSource>, orchestrator: Arc<SettlementOrchestrator>) -> Self {
        Self {
            catalog,
            orchestrator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/catalog", get(catalog::list_catalog))
        .route("/v1/catalog/:item_id", get(catalog::get_catalog_item))
        .route("/v1/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/v1/cart/items", post(cart::add_item))
        .route(
            "/v1/cart/items/:item_id",
            patch(cart::update_item).delete(cart::remove_item),
        )
        .route("/v1/balance", get(balance::get_balance))
        .route(
            "/v1/checkout",
            get(checkout::get_checkout_state).post(checkout::submit_checkout),
        )
        .route("/v1/checkout/shipping", put(checkout::put_shipping))
        .route("/v1/checkout/quote", get(checkout::get_quote))
        .route("/v1/purchases", get(purchases::list_purchases))
        .layer(cors)
        .with_state(state)
}
