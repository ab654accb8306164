//! Mock backend server for testing
//!
//! Simulates the hosted backend's table, auth and storage endpoints with
//! wiremock so the REST gateway can be exercised end to end.

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path, path_regex, query_param},
    Mock, MockServer, ResponseTemplate,
};

use BlocoCheckin::config::GatewayConfig;
use BlocoCheckin::gateway::RestGateway;

pub const TEST_ANON_KEY: &str = "test-anon-key";

/// Mock backend server
pub struct GatewayMockServer {
    pub server: MockServer,
    pub base_url: String,
}

impl GatewayMockServer {
    /// Start a new mock server
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Gateway configuration pointing at this server
    pub fn config(&self) -> GatewayConfig {
        GatewayConfig {
            url: self.base_url.clone(),
            anon_key: TEST_ANON_KEY.to_string(),
            timeout_seconds: 5,
            poll_interval_seconds: 1,
            ..Default::default()
        }
    }

    pub fn gateway(&self) -> RestGateway {
        RestGateway::new(&self.config()).expect("Failed to create gateway")
    }

    /// Answer table listings with `rows`
    pub async fn mock_select(&self, table: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{}", table)))
            .and(query_param("select", "*"))
            .and(header("apikey", TEST_ANON_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.server)
            .await;
    }

    /// Answer the first `times` listings with `rows`, ahead of any other listing mock
    pub async fn mock_select_times(&self, table: &str, rows: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{}", table)))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .up_to_n_times(times)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_insert(&self, table: &str, status: u16, body: Option<Value>) {
        let mut response = ResponseTemplate::new(status);
        if let Some(body) = body {
            response = response.set_body_json(body);
        }
        Mock::given(method("POST"))
            .and(path(format!("/rest/v1/{}", table)))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Answer PATCH requests on one row with the updated rows
    pub async fn mock_patch(&self, table: &str, id: &str, affected: Value) {
        Mock::given(method("PATCH"))
            .and(path(format!("/rest/v1/{}", table)))
            .and(query_param("id", format!("eq.{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(affected))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_delete(&self, table: &str, id: &str, affected: Value) {
        Mock::given(method("DELETE"))
            .and(path(format!("/rest/v1/{}", table)))
            .and(query_param("id", format!("eq.{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(affected))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_sign_in_success(&self, email: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-token-123",
                "refresh_token": "refresh-token-123",
                "expires_in": 3600,
                "token_type": "bearer",
                "user": { "id": "admin-user-id", "email": email }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_sign_in_rejected(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_sign_out(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_upload(&self, bucket: &str) {
        Mock::given(method("POST"))
            .and(path_regex(format!(r"^/storage/v1/object/{}/.+$", bucket)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "uploaded" })))
            .mount(&self.server)
            .await;
    }

    /// Every table request fails with `status`
    pub async fn mock_table_failure(&self, table: &str, status: u16) {
        Mock::given(path(format!("/rest/v1/{}", table)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}
