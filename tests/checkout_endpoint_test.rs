mod common;

use axum::http::StatusCode;
use common::{money, send, setup_test_app, setup_with_recorder, shipping, TestApp, USER};
use luxe_checkout::{
    BalanceLedger, CheckoutState, Money, MockPurchaseRecorder, PurchaseRecorder, UserId,
};
use serde_json::json;
use std::sync::Arc;

async fn add_watch(test: &TestApp) {
    let (status, _) = send(
        &test.app,
        "POST",
        "/v1/cart/items",
        Some(USER),
        Some(json!({"itemId": "w1", "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn user() -> UserId {
    UserId::new(USER.to_string())
}

#[tokio::test]
async fn test_quote_matches_tax_rules() {
    let test = setup_test_app().await;
    add_watch(&test).await;

    let (status, body) = send(&test.app, "GET", "/v1/checkout/quote", Some(USER), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&body["subtotal"]), Money::from_units(1200));
    assert_eq!(money(&body["salesTax"]), Money::from_units(96));
    assert_eq!(money(&body["luxuryTax"]), Money::from_units(24));
    assert_eq!(money(&body["shipping"]), Money::zero());
    assert_eq!(money(&body["total"]), Money::from_units(1320));
}

#[tokio::test]
async fn test_quote_empty_cart_conflicts() {
    let test = setup_test_app().await;

    let (status, _) = send(&test.app, "GET", "/v1/checkout/quote", Some(USER), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_checkout_success() {
    let test = setup_test_app().await;
    add_watch(&test).await;

    let (status, body) = send(
        &test.app,
        "POST",
        "/v1/checkout",
        Some(USER),
        Some(serde_json::to_value(shipping()).unwrap()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(money(&body["breakdown"]["total"]), Money::from_units(1320));
    assert_eq!(money(&body["balance"]), Money::from_units(3680));
    assert!(body["purchaseId"].is_string());

    let (_, balance) = send(&test.app, "GET", "/v1/balance", Some(USER), None).await;
    assert_eq!(money(&balance["balance"]), Money::from_units(3680));

    let (_, cart) = send(&test.app, "GET", "/v1/cart", Some(USER), None).await;
    assert!(cart["lines"].as_array().unwrap().is_empty());

    let (_, state) = send(&test.app, "GET", "/v1/checkout", Some(USER), None).await;
    assert_eq!(state["state"], "persisted");

    let (status, history) = send(&test.app, "GET", "/v1/purchases", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(history["nextBefore"].is_null());
    let purchases = history["purchases"].as_array().unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0]["id"], body["purchaseId"]);
    assert_eq!(money(&purchases[0]["total"]), Money::from_units(1320));
    assert_eq!(purchases[0]["shippingDetails"]["zipCode"], "22201-1234");
    assert_eq!(purchases[0]["lines"][0]["itemId"], "w1");
}

#[tokio::test]
async fn test_checkout_persistence_failure_rolls_back() {
    let recorder = Arc::new(MockPurchaseRecorder::failing());
    let test = setup_with_recorder(Some(recorder.clone() as Arc<dyn PurchaseRecorder>)).await;
    add_watch(&test).await;

    let (status, body) = send(
        &test.app,
        "POST",
        "/v1/checkout",
        Some(USER),
        Some(serde_json::to_value(shipping()).unwrap()),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Failed to process purchase. Please try again.");
    assert_eq!(recorder.create_calls(), 1);

    assert_eq!(
        test.repo.balance(&user()).await.unwrap(),
        Some(Money::from_units(5000))
    );
    let (_, cart) = send(&test.app, "GET", "/v1/cart", Some(USER), None).await;
    assert_eq!(cart["lines"][0]["itemId"], "w1");
    assert_eq!(
        test.orchestrator.checkout_state(&user()).await,
        CheckoutState::ShippingCollected
    );

    // Storage recovers; the same cart goes through on retry.
    recorder.set_failing(false);
    let (status, body) = send(&test.app, "POST", "/v1/checkout", Some(USER), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(money(&body["balance"]), Money::from_units(3680));
}

#[tokio::test]
async fn test_checkout_invalid_shipping_reports_every_field() {
    let test = setup_test_app().await;
    add_watch(&test).await;

    let (status, body) = send(
        &test.app,
        "POST",
        "/v1/checkout",
        Some(USER),
        Some(json!({
            "firstName": "",
            "lastName": "Hopper",
            "address": "1 Harbor Way",
            "city": " ",
            "state": "VA",
            "zipCode": "2220"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = body["fields"].as_object().unwrap();
    assert_eq!(fields.len(), 3);
    assert!(fields.contains_key("firstName"));
    assert!(fields.contains_key("city"));
    assert_eq!(fields["zipCode"], "Invalid ZIP code format");

    let (_, balance) = send(&test.app, "GET", "/v1/balance", Some(USER), None).await;
    assert_eq!(money(&balance["balance"]), Money::from_units(5000));
    let (_, state) = send(&test.app, "GET", "/v1/checkout", Some(USER), None).await;
    assert_eq!(state["state"], "idle");
}

#[tokio::test]
async fn test_checkout_malformed_body_is_bad_request() {
    let test = setup_test_app().await;
    add_watch(&test).await;

    let (status, _) = send(
        &test.app,
        "POST",
        "/v1/checkout",
        Some(USER),
        Some(json!({"firstName": 7})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_empty_cart_conflicts() {
    let test = setup_test_app().await;

    let (status, _) = send(
        &test.app,
        "POST",
        "/v1/checkout",
        Some(USER),
        Some(serde_json::to_value(shipping()).unwrap()),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_checkout_without_collected_shipping_conflicts() {
    let test = setup_test_app().await;
    add_watch(&test).await;

    let (status, _) = send(&test.app, "POST", "/v1/checkout", Some(USER), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_checkout_insufficient_funds() {
    let test = setup_test_app().await;
    let (status, _) = send(
        &test.app,
        "POST",
        "/v1/cart/items",
        Some(USER),
        Some(json!({"itemId": "c1", "quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &test.app,
        "POST",
        "/v1/checkout",
        Some(USER),
        Some(serde_json::to_value(shipping()).unwrap()),
    )
    .await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(money(&body["available"]), Money::from_units(5000));
    // 90000 + 7200 sales + 1800 luxury
    assert_eq!(money(&body["required"]), Money::from_units(99_000));

    let (_, cart) = send(&test.app, "GET", "/v1/cart", Some(USER), None).await;
    assert_eq!(cart["lines"][0]["itemId"], "c1");
}

#[tokio::test]
async fn test_collect_shipping_then_checkout() {
    let test = setup_test_app().await;
    add_watch(&test).await;

    let (status, body) = send(
        &test.app,
        "PUT",
        "/v1/checkout/shipping",
        Some(USER),
        Some(serde_json::to_value(shipping()).unwrap()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "shippingCollected");

    let (status, body) = send(&test.app, "POST", "/v1/checkout", Some(USER), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(money(&body["breakdown"]["luxuryTax"]), Money::from_units(24));
}

#[tokio::test]
async fn test_purchases_are_private_to_user() {
    let test = setup_test_app().await;
    add_watch(&test).await;
    send(
        &test.app,
        "POST",
        "/v1/checkout",
        Some(USER),
        Some(serde_json::to_value(shipping()).unwrap()),
    )
    .await;

    let (status, body) = send(&test.app, "GET", "/v1/purchases", Some("someone-else"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["purchases"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_purchase_history_pages_with_cursor() {
    let test = setup_test_app().await;
    let mut ids = Vec::new();
    for _ in 0..3 {
        send(
            &test.app,
            "POST",
            "/v1/cart/items",
            Some(USER),
            Some(json!({"itemId": "s1", "quantity": 1})),
        )
        .await;
        let (status, body) = send(
            &test.app,
            "POST",
            "/v1/checkout",
            Some(USER),
            Some(serde_json::to_value(shipping()).unwrap()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["purchaseId"].as_str().unwrap().to_string());
    }
    ids.reverse();

    let (status, first) = send(&test.app, "GET", "/v1/purchases?limit=2", Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    let page: Vec<&str> = first["purchases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(page, vec![ids[0].as_str(), ids[1].as_str()]);
    let cursor = first["nextBefore"].as_str().unwrap().to_string();
    assert_eq!(cursor, ids[1]);

    let uri = format!("/v1/purchases?limit=2&before={}", cursor);
    let (status, second) = send(&test.app, "GET", &uri, Some(USER), None).await;
    assert_eq!(status, StatusCode::OK);
    let rest = second["purchases"].as_array().unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0]["id"], ids[2].as_str());
    assert!(second["nextBefore"].is_null());
}

#[tokio::test]
async fn test_purchase_history_rejects_bad_paging() {
    let test = setup_test_app().await;

    for uri in [
        "/v1/purchases?limit=0",
        "/v1/purchases?limit=101",
        "/v1/purchases?before=not-a-uuid",
    ] {
        let (status, _) = send(&test.app, "GET", uri, Some(USER), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_read_routes_do_not_create_sessions() {
    let test = setup_test_app().await;

    for i in 0..10 {
        let user = format!("visitor-{}", i);
        for (method, uri) in [
            ("GET", "/v1/cart"),
            ("GET", "/v1/checkout"),
            ("GET", "/v1/checkout/quote"),
            ("DELETE", "/v1/cart"),
            ("DELETE", "/v1/cart/items/w1"),
        ] {
            send(&test.app, method, uri, Some(user.as_str()), None).await;
        }
        let (status, state) = send(&test.app, "GET", "/v1/checkout", Some(user.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state["state"], "idle");
    }

    assert_eq!(test.orchestrator.session_count().await, 0);

    add_watch(&test).await;
    assert_eq!(test.orchestrator.session_count().await, 1);
}

