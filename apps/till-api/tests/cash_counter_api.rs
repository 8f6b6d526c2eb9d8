//! Router-level tests against an in-memory database.

use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::{json, Value};
use tower::ServiceExt;

use till_api::collaborators::Clock;
use till_api::{router, AppState, CashCounterService};
use till_core::{DenominationSet, Money};
use till_db::{CashPayment, Database, DbConfig};

const OWNER_PASSWORD: &str = "owner-secret";

struct ManualClock(Mutex<DateTime<Utc>>);

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

impl ManualClock {
    fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

struct TestApp {
    app: Router,
    db: Database,
    clock: Arc<ManualClock>,
}

async fn test_app() -> TestApp {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.owners().create("owner", OWNER_PASSWORD).await.unwrap();

    let clock = Arc::new(ManualClock(Mutex::new(
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
    )));
    let service = CashCounterService::new(db.clone(), DenominationSet::standard(), Tz::UTC)
        .with_clock(clock.clone());

    TestApp {
        app: router(AppState::new(db.clone(), service)),
        db,
        clock,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-staff-id", "cashier-1");

    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn opening_body() -> Value {
    json!({ "denominations": { "500": 5, "200": 1, "100": 2 } })
}

fn closing_body() -> Value {
    json!({ "denominations": { "500": 8, "200": 2, "100": 1 } })
}

async fn record_cash_sale(t: &TestApp, order: &str, major: i64, at: DateTime<Utc>) {
    t.db.payments()
        .insert(&CashPayment::completed_cash(order, Money::from_major(major), at))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_full_day_worked_example() {
    let t = test_app().await;
    let opened_at = t.clock.now();

    let (status, opened) = send(&t.app, "POST", "/cash-counter/open", Some(opening_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(opened["status"], "open");
    assert_eq!(opened["opening_balance_cents"], 290_000);
    assert_eq!(opened["opened_by"], "cashier-1");
    assert_eq!(opened["cash_sales_cents"], Value::Null);
    assert_eq!(opened["variance_kind"], Value::Null);
    let id = opened["id"].as_str().unwrap().to_string();

    // One sale before the counter opened, two during the day
    record_cash_sale(&t, "ORD-0", 999, opened_at - Duration::minutes(5)).await;
    record_cash_sale(&t, "ORD-1", 1000, opened_at + Duration::hours(2)).await;
    record_cash_sale(&t, "ORD-2", 500, opened_at + Duration::hours(6)).await;

    t.clock.advance(Duration::hours(13));
    let (status, closed) = send(&t.app, "POST", "/cash-counter/close", Some(closing_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "closed_pending_verification");
    assert_eq!(closed["expected_closing_cents"], 440_000);
    assert_eq!(closed["closing_balance_cents"], 450_000);
    assert_eq!(closed["variance_cents"], 10_000);
    assert_eq!(closed["cash_sales_cents"], 150_000);
    assert_eq!(closed["variance_kind"], "surplus");

    let (status, _) = send(
        &t.app,
        "POST",
        &format!("/cash-counter/verify/{}", id),
        Some(json!({ "password": OWNER_PASSWORD, "notes": "surplus is a tip" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, counter) = send(&t.app, "GET", &format!("/cash-counter/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counter["status"], "verified");
    assert_eq!(counter["verified_by"], "cashier-1");
    assert_eq!(counter["variance_cents"], 10_000);
    assert_eq!(counter["variance_kind"], "surplus");

    let (_, page) = send(&t.app, "GET", "/cash-counter/history", None).await;
    assert_eq!(page["items"][0]["id"], id.as_str());
    assert_eq!(page["items"][0]["cash_sales_cents"], 150_000);
    assert_eq!(page["items"][0]["variance_kind"], "surplus");

    let (status, events) =
        send(&t.app, "GET", &format!("/cash-counter/{}/events", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<_> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(actions, ["opened", "closed", "verified"]);
}

#[tokio::test]
async fn test_duplicate_open_is_conflict() {
    let t = test_app().await;
    let (status, first) = send(&t.app, "POST", "/cash-counter/open", Some(opening_body())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &t.app,
        "POST",
        "/cash-counter/open",
        Some(json!({ "denominations": { "1": 1 } })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (_, today) = send(&t.app, "GET", "/cash-counter/today", None).await;
    assert_eq!(today["counter"]["opening_balance_cents"], first["opening_balance_cents"]);
}

#[tokio::test]
async fn test_wrong_owner_password_is_unauthorized() {
    let t = test_app().await;
    let (_, opened) = send(&t.app, "POST", "/cash-counter/open", Some(opening_body())).await;
    let id = opened["id"].as_str().unwrap().to_string();
    t.clock.advance(Duration::hours(1));
    let (_, closed) = send(&t.app, "POST", "/cash-counter/close", Some(closing_body())).await;

    for body in [json!({ "password": "guess" }), json!({})] {
        let (status, err) = send(
            &t.app,
            "POST",
            &format!("/cash-counter/verify/{}", id),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(err["code"], "AUTHENTICATION_FAILED");
    }

    let (_, counter) = send(&t.app, "GET", &format!("/cash-counter/{}", id), None).await;
    assert_eq!(counter, closed);
}

#[tokio::test]
async fn test_missing_staff_header_is_unauthorized() {
    let t = test_app().await;
    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cash-counter/open")
                .header("content-type", "application/json")
                .body(Body::from(opening_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (_, today) = send(&t.app, "GET", "/cash-counter/today", None).await;
    assert_eq!(today["counter"], Value::Null);
}

#[tokio::test]
async fn test_reopen_then_close_again() {
    let t = test_app().await;
    let (_, opened) = send(&t.app, "POST", "/cash-counter/open", Some(opening_body())).await;
    let id = opened["id"].as_str().unwrap().to_string();

    record_cash_sale(&t, "ORD-1", 1500, t.clock.now() + Duration::hours(1)).await;
    t.clock.advance(Duration::hours(12));
    send(&t.app, "POST", "/cash-counter/close", Some(closing_body())).await;

    t.clock.advance(Duration::minutes(5));
    let (status, reopened) = send(
        &t.app,
        "POST",
        &format!("/cash-counter/reopen/{}", id),
        Some(json!({ "password": OWNER_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reopened["status"], "open");
    assert_eq!(reopened["closing_balance_cents"], Value::Null);
    assert_eq!(reopened["variance_cents"], Value::Null);
    assert_eq!(reopened["variance_kind"], Value::Null);

    // Sales before the reopen no longer count
    t.clock.advance(Duration::minutes(30));
    let (status, closed) = send(&t.app, "POST", "/cash-counter/close", Some(closing_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["expected_closing_cents"], 290_000);
    assert_eq!(closed["variance_cents"], 160_000);
    assert_eq!(closed["cash_sales_cents"], 0);
    assert_eq!(closed["variance_kind"], "surplus");

    let (status, _) = send(
        &t.app,
        "POST",
        &format!("/cash-counter/reopen/{}", id),
        Some(json!({ "password": OWNER_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &t.app,
        "POST",
        &format!("/cash-counter/reopen/{}", id),
        Some(json!({ "password": OWNER_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_short_drawer_reports_shortage() {
    let t = test_app().await;
    send(&t.app, "POST", "/cash-counter/open", Some(opening_body())).await;
    record_cash_sale(&t, "ORD-1", 2000, t.clock.now() + Duration::hours(1)).await;
    t.clock.advance(Duration::hours(10));

    let (status, closed) = send(&t.app, "POST", "/cash-counter/close", Some(closing_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["expected_closing_cents"], 490_000);
    assert_eq!(closed["variance_cents"], -40_000);
    assert_eq!(closed["variance_kind"], "shortage");

    let (_, today) = send(&t.app, "GET", "/cash-counter/today", None).await;
    assert_eq!(today["counter"]["variance_kind"], "shortage");
    assert_eq!(today["counter"]["cash_sales_cents"], 200_000);
}

#[tokio::test]
async fn test_not_found_and_validation() {
    let t = test_app().await;

    let (status, _) = send(&t.app, "POST", "/cash-counter/close", Some(closing_body())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &t.app,
        "POST",
        "/cash-counter/verify/no-such-id",
        Some(json!({ "password": OWNER_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, err) = send(
        &t.app,
        "POST",
        "/cash-counter/open",
        Some(json!({ "denominations": { "500": -1 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &t.app,
        "POST",
        "/cash-counter/open",
        Some(json!({ "denominations": { "3": 1 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&t.app, "POST", "/cash-counter/open", Some(json!({ "notes": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_paging() {
    let t = test_app().await;
    for day in 10..=14 {
        let body = json!({
            "date": format!("2026-03-{}", day),
            "denominations": { "100": 1 },
        });
        let (status, _) = send(&t.app, "POST", "/cash-counter/open", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, page) = send(&t.app, "GET", "/cash-counter/history?limit=2&offset=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 5);
    let dates: Vec<_> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["date"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(dates, ["2026-03-13", "2026-03-12"]);

    let (status, _) = send(&t.app, "GET", "/cash-counter/history?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&t.app, "GET", "/cash-counter/history?limit=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let t = test_app().await;
    let (status, body) = send(&t.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&t.app, "GET", "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}
