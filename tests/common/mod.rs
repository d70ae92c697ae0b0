//! Shared utilities for end-to-end API tests.

#![allow(dead_code)]

use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use vivu_api::datetime::is_date_time_string;
use vivu_api::lifecycle::Shutdown;
use vivu_api::store::seed::seed_demo_data;
use vivu_api::{AppConfig, DocumentStore, HttpServer};

/// First day of seeded flights.
pub fn seed_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 25).unwrap()
}

/// A running server on an ephemeral port, stopped on drop.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<DocumentStore>,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a fresh user and return their bearer token.
    pub async fn register(&self, email: &str) -> String {
        let res = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "firstName": "An",
                "lastName": "Nguyen",
                "email": email,
                "phone": "0901234567",
                "password": "secret1",
                "confirmPassword": "secret1",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 201);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// Id of the first seeded SGN → HAN flight departing on the seed date.
    pub async fn first_flight_id(&self) -> String {
        let body: Value = self
            .client
            .get(self.url("/api/flights/search?departure=SGN&arrival=HAN&date=2025-10-25"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["flights"][0]["_id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_server() -> TestServer {
    start_server_with(AppConfig::default()).await
}

pub async fn start_server_with(config: AppConfig) -> TestServer {
    let store = Arc::new(DocumentStore::new());
    seed_demo_data(&store, seed_date());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_store(&config, store.clone());
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        store,
        client: reqwest::Client::new(),
        shutdown,
    }
}

static CANONICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$").unwrap());

pub fn assert_canonical(value: &Value) {
    let text = value.as_str().unwrap_or_else(|| panic!("expected a string, got {value}"));
    assert!(CANONICAL.is_match(text), "not canonical: {text}");
}

/// Every date-shaped string anywhere in `value` is in canonical form.
pub fn assert_all_dates_canonical(value: &Value) {
    match value {
        Value::String(s) if is_date_time_string(s) => assert_canonical(value),
        Value::Array(items) => items.iter().for_each(assert_all_dates_canonical),
        Value::Object(map) => map.values().for_each(assert_all_dates_canonical),
        _ => {}
    }
}
