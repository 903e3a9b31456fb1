//! Shared helpers for the mock backend tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use repdash_core::{ApiUrl, MemoryTokenStore, Navigator};
use repdash_http::{ApiClient, ClientConfig, HttpClient, SessionConfig, SessionManager};
use serde_json::json;
use wiremock::MockServer;

/// Build an unsigned JWT expiring `exp_in_secs` from now.
pub fn jwt(exp_in_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + exp_in_secs;
    let header = URL_SAFE_NO_PAD.encode(json!({"alg": "HS256", "typ": "JWT"}).to_string());
    let payload = URL_SAFE_NO_PAD.encode(json!({"sub": "a@b.com", "exp": exp}).to_string());
    format!("{}.{}.signature", header, payload)
}

/// API URL pointing at a mock server.
pub fn mock_api_url(server: &MockServer) -> ApiUrl {
    ApiUrl::new(server.uri()).unwrap()
}

/// Timing that lets proactive refreshes fire within a test.
pub fn fast_refresh() -> SessionConfig {
    SessionConfig {
        refresh_leeway: Duration::from_secs(60),
        min_refresh_delay: Duration::from_millis(100),
    }
}

pub fn session_with(url: ApiUrl, store: Arc<MemoryTokenStore>, config: SessionConfig) -> SessionManager {
    let config_http = ClientConfig::new(url).with_timeout(Some(Duration::from_secs(5)));
    let http = HttpClient::new(&config_http).unwrap();
    SessionManager::new(http, store, config)
}

pub fn session(server: &MockServer, store: Arc<MemoryTokenStore>) -> SessionManager {
    session_with(mock_api_url(server), store, SessionConfig::default())
}

/// Records every forced navigation.
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

pub fn api_client(session: SessionManager) -> (ApiClient, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::default());
    (ApiClient::new(session, navigator.clone()), navigator)
}
