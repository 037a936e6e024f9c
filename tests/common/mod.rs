//! Shared helpers for integration tests.

#![allow(dead_code)]

use cloudflare_api::domain::ports::RecordingLogger;
use cloudflare_api::infrastructure::api::{Client, ClientBuilder, RetryPolicy, TokenBucketRateLimiter};
use std::sync::Arc;
use std::time::Duration;

pub const API_TOKEN: &str = "test-api-token";
pub const ZONE_ID: &str = "023e105f4ecef8ad9ca31a8372d0c353";

/// Builder pointed at a mock server, with short backoff and a generous limiter.
pub fn fast_builder(server_uri: &str, max_retries: u32, logger: &RecordingLogger) -> ClientBuilder {
    Client::builder()
        .base_url(format!("{server_uri}/client/v4"))
        .retry_policy(
            RetryPolicy::new(max_retries, Duration::from_millis(10), Duration::from_millis(40))
                .unwrap(),
        )
        .rate_limiter(Arc::new(TokenBucketRateLimiter::new(1000.0, 100)))
        .logger(Arc::new(logger.clone()))
}

/// Token-authenticated client plus the logger capturing its retry lines.
pub fn fast_client(server_uri: &str, max_retries: u32) -> (Client, RecordingLogger) {
    let logger = RecordingLogger::default();
    let client = fast_builder(server_uri, max_retries, &logger)
        .api_token(API_TOKEN)
        .build()
        .unwrap();
    (client, logger)
}

pub fn zone_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "status": "active",
        "paused": false,
        "type": "full",
        "development_mode": 0,
        "name_servers": ["bob.ns.cloudflare.com", "lola.ns.cloudflare.com"],
        "original_name_servers": null,
        "created_on": "2014-01-01T05:20:00.12345Z",
        "modified_on": "2014-01-01T05:20:00.12345Z",
        "owner": {"id": "7c5dae5552338874e5053f2534d2767a", "type": "user"},
        "plan": {"id": "e592fd9519420ba7405e1307bff33214", "name": "Pro Plan", "price": 20, "currency": "USD"},
        "account": {"id": "01a7362d577a6c3019a474fd6f485823", "name": "Demo Account"},
        "meta": {"page_rule_quota": 3, "wildcard_proxiable": false, "phishing_detected": false},
        "permissions": ["#zone:read"]
    })
}

pub fn error_envelope(code: i64, message: &str) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "errors": [{"code": code, "message": message}],
        "messages": [],
        "result": null
    })
}
