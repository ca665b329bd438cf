use std::sync::Arc;

use api_types::{
    Category,
    ledger::{AdviceResponse, Aggregate, ExchangeRateResponse},
    transaction::{BatchAccepted, TransactionBatch, TransactionsResponse},
};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tower::ServiceExt;

use engine::Ledger;
use server::{ServerState, router};

const MARCH_2024: u64 = 1_709_251_200 * 1_000_000_000; // 2024-03-01T00:00:00Z

fn app() -> Router {
    let ledger = Ledger::builder().exchange_rate(15_000.0).build().unwrap();
    router(ServerState {
        ledger: Arc::new(RwLock::new(ledger)),
    })
}

fn post(path: &str, principal: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(principal) = principal {
        builder = builder.header("x-principal", principal);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body<T: serde::de::DeserializeOwned>(res: axum::response::Response) -> T {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn sample_batch() -> TransactionBatch {
    TransactionBatch {
        amounts: vec![3_000_000.0, 45_000.0],
        descriptions: vec!["March salary".to_string(), "Coffee".to_string()],
        categories: vec![Category::Salary, Category::FoodsDrinks],
        is_incomes: vec![true, false],
        timestamps: vec![MARCH_2024, MARCH_2024],
    }
}

#[tokio::test]
async fn anonymous_caller_is_rejected() {
    let res = app()
        .oneshot(post("/balance", None, json!({ "year_month": "" })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn batch_write_then_aggregates_and_reports() {
    let app = app();

    let res = app
        .clone()
        .oneshot(post(
            "/transactions",
            Some("alice"),
            serde_json::to_value(sample_batch()).unwrap(),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let accepted: BatchAccepted = json_body(res).await;
    assert_eq!(accepted.added, 2);

    let res = app
        .clone()
        .oneshot(post("/balance", Some("alice"), json!({ "year_month": "2024-03" })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let balance: Aggregate = json_body(res).await;
    assert_eq!(balance.value, 2_955_000.0);

    let res = app
        .clone()
        .oneshot(post("/expense", Some("alice"), json!({ "year_month": "2024-04" })))
        .await
        .unwrap();
    let expense: Aggregate = json_body(res).await;
    assert_eq!(expense.value, 0.0);

    let res = app
        .clone()
        .oneshot(post("/report/income", Some("alice"), json!({ "year_month": "" })))
        .await
        .unwrap();
    let report: TransactionsResponse = json_body(res).await;
    assert_eq!(report.transactions.len(), 1);
    assert_eq!(report.transactions[0].description, "March salary");

    let res = app
        .oneshot(post(
            "/transactions/filter",
            Some("alice"),
            json!({
                "transaction_type": "EXPENSE",
                "category": "foods_drinks",
                "year_month": "2024-03"
            }),
        ))
        .await
        .unwrap();
    let filtered: TransactionsResponse = json_body(res).await;
    assert_eq!(filtered.transactions.len(), 1);
    assert_eq!(filtered.transactions[0].amount, 45_000.0);
}

#[tokio::test]
async fn books_are_isolated_per_principal() {
    let app = app();
    app.clone()
        .oneshot(post(
            "/transactions",
            Some("alice"),
            serde_json::to_value(sample_batch()).unwrap(),
        ))
        .await
        .unwrap();

    let res = app
        .oneshot(post("/report", Some("bob"), json!({ "year_month": "" })))
        .await
        .unwrap();
    let report: TransactionsResponse = json_body(res).await;
    assert!(report.transactions.is_empty());
}

#[tokio::test]
async fn malformed_batch_returns_422_with_error_body() {
    let mut batch = sample_batch();
    batch.timestamps.pop();
    let res = app()
        .oneshot(post(
            "/transactions",
            Some("alice"),
            serde_json::to_value(batch).unwrap(),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = json_body(res).await;
    assert!(body["error"].as_str().unwrap().contains("same length"));
}

#[tokio::test]
async fn invalid_period_returns_422() {
    let res = app()
        .oneshot(post("/income", Some("alice"), json!({ "year_month": "2024-99" })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn exchange_rate_and_advice() {
    let app = app();
    let req = Request::builder()
        .uri("/exchange-rate")
        .header("x-principal", "alice")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let rate: ExchangeRateResponse = json_body(res).await;
    assert_eq!(rate.rate, 15_000.0);

    let res = app
        .oneshot(post(
            "/advice",
            Some("alice"),
            json!({
                "total_income": "Rp. 1.000.000",
                "total_expenses": "Rp. 1.500.000",
                "balance": "Rp. -500.000"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let advice: AdviceResponse = json_body(res).await;
    assert!(advice.advice.contains("Rp. 1.500.000"));
}
