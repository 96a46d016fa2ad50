#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use luxe_checkout::api::{self, AppState};
use luxe_checkout::catalog::MockCatalogSource;
use luxe_checkout::config::Config;
use luxe_checkout::db::init_db;
use luxe_checkout::domain::{Category, Item, Money, ShippingDetails};
use luxe_checkout::{BalanceLedger, PurchaseRecorder, Repository, SettlementOrchestrator};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const USER: &str = "user-1";

pub struct TestApp {
    pub app: axum::Router,
    pub repo: Arc<Repository>,
    pub orchestrator: Arc<SettlementOrchestrator>,
    _temp: TempDir,
}

pub fn config(db_path: &str) -> Config {
    let mut env = HashMap::new();
    env.insert("DATABASE_PATH".to_string(), db_path.to_string());
    Config::from_env_map(env).unwrap()
}

pub fn catalog_items() -> Vec<Item> {
    vec![
        Item::new(
            "w1",
            "Tourbillon Watch",
            "Hand-finished movement",
            Money::from_units(1200),
            Category::Watches,
        ),
        Item::new(
            "s1",
            "Silk Scarf",
            "Hand-rolled edges",
            Money::from_units(600),
            Category::Fashion,
        ),
        Item::new(
            "c1",
            "Vintage Roadster",
            "Restored two-seater",
            Money::from_units(90_000),
            Category::Cars,
        ),
    ]
}

pub async fn setup_test_app() -> TestApp {
    setup_with_recorder(None).await
}

/// Real SQLite ledger; `recorder` replaces the SQLite purchase store when given.
pub async fn setup_with_recorder(recorder: Option<Arc<dyn PurchaseRecorder>>) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();

    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));
    let ledger: Arc<dyn BalanceLedger> = repo.clone();
    let recorder = recorder.unwrap_or_else(|| repo.clone() as Arc<dyn PurchaseRecorder>);

    let orchestrator = Arc::new(
        SettlementOrchestrator::new(ledger, recorder, &config(&db_path))
            .with_rollback_max_elapsed(Duration::from_millis(500)),
    );
    let catalog = Arc::new(MockCatalogSource::new().with_items(catalog_items()));
    let app = api::create_router(AppState::new(catalog, orchestrator.clone()));

    TestApp {
        app,
        repo,
        orchestrator,
        _temp: temp_dir,
    }
}

pub fn shipping() -> ShippingDetails {
    ShippingDetails {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        address: "1 Harbor Way".to_string(),
        city: "Arlington".to_string(),
        state: "VA".to_string(),
        zip_code: "22201-1234".to_string(),
    }
}

pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("X-User-Id", user);
    }
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Amounts travel as decimal strings.
pub fn money(value: &serde_json::Value) -> Money {
    Money::from_str(value.as_str().expect("amount is a string")).unwrap()
}
