//! API Integration Tests
//!
//! Exercises the full request/response cycle for the finance endpoints over
//! the in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use sangha_api::{create_router, ApiConfig, AppState};
use sangha_ledger::Reconciler;
use sangha_store::MemoryStore;
use sangha_types::{Donation, DonationId};

/// Router over a fresh in-memory store seeded with one 1000 donation.
async fn test_router() -> Router {
    let store = MemoryStore::new();
    store
        .record_donation(Donation {
            id: DonationId::new(),
            name: "Asha".to_string(),
            amount: dec!(1000),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        })
        .await;

    let ledger = Reconciler::new(Arc::new(store.clone()), Arc::new(store));
    let state = Arc::new(AppState::new(ledger));
    create_router(state, ApiConfig::default())
}

/// Make a request and return the status plus parsed JSON body.
async fn json_request(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-actor", "admin@sangha.org");
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }

    let request = builder
        .body(match body {
            Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
            None => Body::empty(),
        })
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn add_kickoff(router: &Router) -> Value {
    let (status, body) = json_request(
        router,
        "POST",
        "/api/v1/finance/meetings",
        Some(json!({
            "name": "Kickoff",
            "date": "2024-01-01",
            "totalAmount": "500",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn health_is_up() {
    let router = test_router().await;
    let (status, body) = json_request(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn donations_endpoint_reports_the_total() {
    let router = test_router().await;
    let (status, body) = json_request(&router, "GET", "/api/v1/donations", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], "1000");
    assert_eq!(body["donations"][0]["name"], "Asha");
}

#[tokio::test]
async fn add_then_commit_meeting_flow() {
    let router = test_router().await;

    let meeting = add_kickoff(&router).await;
    assert_eq!(meeting["accountBalance"], "1500");
    assert_eq!(meeting["balance"], "500");
    assert_eq!(meeting["editable"], true);
    let id = meeting["id"].as_str().unwrap();

    let (status, body) = json_request(
        &router,
        "PUT",
        &format!("/api/v1/finance/meetings/{}", id),
        Some(json!({
            "food": "100",
            "preacher": "50",
            "other": "20",
            "version": 0,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalSpendings"], "170");
    assert_eq!(body["balance"], "330");
    assert_eq!(body["accountBalance"], "1330");
    assert_eq!(body["editable"], false);
    assert_eq!(body["modifiedBy"], "admin@sangha.org");
    assert_eq!(body["version"], 1);
}

#[tokio::test]
async fn meetings_list_carries_running_balances() {
    let router = test_router().await;

    let meeting = add_kickoff(&router).await;
    let id = meeting["id"].as_str().unwrap();

    let (status, _) = json_request(
        &router,
        "PUT",
        &format!("/api/v1/finance/meetings/{}", id),
        Some(json!({
            "food": "100",
            "preacher": "50",
            "other": "20",
            "version": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = json_request(&router, "GET", "/api/v1/finance/meetings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    // donations(1000) - spendings(170)
    assert_eq!(body[0]["runningBalance"], "830");
}

#[tokio::test]
async fn live_balance_previews_pending_edits() {
    let router = test_router().await;

    let meeting = add_kickoff(&router).await;
    let id = meeting["id"].as_str().unwrap();

    let (status, body) = json_request(
        &router,
        "GET",
        &format!(
            "/api/v1/finance/live-balance?meetingId={}&food=100&preacher=50&other=20",
            id
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "1330");

    let (status, body) = json_request(
        &router,
        "GET",
        &format!("/api/v1/finance/live-balance?meetingId={}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "1500");
}

#[tokio::test]
async fn stale_version_commit_is_a_conflict() {
    let router = test_router().await;

    let meeting = add_kickoff(&router).await;
    let id = meeting["id"].as_str().unwrap();

    let (status, body) = json_request(
        &router,
        "PUT",
        &format!("/api/v1/finance/meetings/{}", id),
        Some(json!({
            "food": "0",
            "preacher": "0",
            "other": "0",
            "version": 7,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn negative_spending_is_a_validation_error() {
    let router = test_router().await;

    let meeting = add_kickoff(&router).await;
    let id = meeting["id"].as_str().unwrap();

    let (status, body) = json_request(
        &router,
        "PUT",
        &format!("/api/v1/finance/meetings/{}", id),
        Some(json!({
            "food": "-5",
            "preacher": "0",
            "other": "0",
            "version": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn unknown_meeting_is_not_found() {
    let router = test_router().await;

    let (status, body) = json_request(
        &router,
        "PUT",
        "/api/v1/finance/meetings/00000000-0000-0000-0000-000000000000",
        Some(json!({
            "food": "0",
            "preacher": "0",
            "other": "0",
            "version": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn malformed_body_gets_the_uniform_error_shape() {
    let router = test_router().await;

    let (status, body) = json_request(
        &router,
        "POST",
        "/api/v1/finance/meetings",
        Some(json!({
            "name": "Kickoff",
            "date": "not-a-date",
            "totalAmount": "500",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn add_meeting_rejects_non_positive_amounts() {
    let router = test_router().await;

    let (status, _) = json_request(
        &router,
        "POST",
        "/api/v1/finance/meetings",
        Some(json!({
            "name": "Kickoff",
            "date": "2024-01-01",
            "totalAmount": "0",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
