//! Shared helpers for the HTTP integration tests.

use postal_client::PostalClient;
use serde_json::{Value, json};
use wiremock::MockServer;

pub const API_KEY: &str = "integration-key";

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn client_for(server: &MockServer) -> PostalClient {
    PostalClient::new(server.uri(), API_KEY).expect("client init")
}

/// Wrap `data` in a successful Postal envelope.
pub fn success(data: Value) -> Value {
    json!({
        "status": "success",
        "time": 0.03,
        "flags": {},
        "data": data,
    })
}
