// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;

use crate::client::TokenClient;
use crate::config::service::ServiceEndpoints;
use crate::credentials::Credentials;
use crate::parser::jwt::encode_test_token;

pub const LOGIN: &str = "dedicated_login";
pub const PASSWORD: &str = "dedicated_password";
pub const AUTH_BASIC_PATH: &str = "/v2/authentication/token/basic";
pub const AUTH_REFRESH_PATH: &str = "/v2/authentication/token/refresh";
pub const MAPS_PATH: &str = "/maps/";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn client_for(base_url: &str) -> TokenClient {
    TokenClient::new(Credentials::new(LOGIN, PASSWORD), ServiceEndpoints::new(base_url))
        .expect("client")
}

pub fn basic_auth_header() -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", LOGIN, PASSWORD)))
}

/// Token valid for an hour, refresh window opens in 30 minutes
pub fn fresh_access_token() -> String {
    let now = Utc::now().timestamp();
    encode_test_token(now + 3600, now + 1800)
}

/// Token still valid but already inside its refresh window
pub fn refreshable_access_token() -> String {
    let now = Utc::now().timestamp();
    encode_test_token(now + 3600, now - 10)
}

pub fn token_body(access_token: &str, refresh_token: &str) -> serde_json::Value {
    json!({ "accessToken": access_token, "refreshToken": refresh_token })
}

pub fn map_json(uid: &str, name: &str, file_url: &str) -> serde_json::Value {
    json!({
        "mapUid": uid,
        "name": name,
        "fileUrl": file_url,
        "author": "d2372a08-a8a1-46cb-97fb-23a161d85ad0",
        "authorScore": 45000
    })
}
