// Authentication scenarios against a mocked NadeoServices:
//  - initial basic auth fills the cache
//  - a valid token is reused without network traffic
//  - inside the refresh window the refresh endpoint is used
//  - any failure resets the cache to the empty state

#[cfg(test)]
mod test {

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::routing::post;
use axum::Json;
use httpmock::Method::POST;
use httpmock::MockServer;

use crate::cache::token::{AuthMode, TokenState};
use crate::parser::jwt::decode_token_times;
use crate::tests::common::*;

#[tokio::test]
async fn initial_authentication_caches_token_pair() {
    let server = MockServer::start_async().await;
    let access = fresh_access_token();
    let basic = server.mock_async(|when, then| {
        when.method(POST)
            .path(AUTH_BASIC_PATH)
            .header("authorization", basic_auth_header())
            .header("content-type", "application/json")
            .json_body(json!({"audience": "NadeoServices"}));
        then.status(200).json_body(token_body(&access, "refresh-1"));
    }).await;

    let client = client_for(&server.base_url());
    assert!(!client.auth_valid().await);
    assert_eq!(client.auth_mode().await, AuthMode::Initial);

    client.authenticate().await;

    basic.assert_async().await;
    let state = client.token_state().await;
    let (expires_at, refreshable_until) = decode_token_times(&access).unwrap();
    assert_eq!(state.access_token, access);
    assert_eq!(state.refresh_token, "refresh-1");
    assert_eq!(state.expires_at, expires_at);
    assert_eq!(state.refreshable_until, refreshable_until);
    assert!(client.auth_valid().await);
}

#[tokio::test]
async fn valid_token_is_reused() {
    let server = MockServer::start_async().await;
    let basic = server.mock_async(|when, then| {
        when.method(POST).path(AUTH_BASIC_PATH);
        then.status(200).json_body(token_body(&fresh_access_token(), "refresh-1"));
    }).await;

    let client = client_for(&server.base_url());
    client.authenticate().await;
    let before = client.token_state().await;

    client.authenticate().await;

    // exactly one request
    basic.assert_async().await;
    assert_eq!(client.token_state().await, before);
    assert_eq!(client.auth_mode().await, AuthMode::Reuse);
}

#[tokio::test]
async fn refresh_window_uses_refresh_token() {
    let server = MockServer::start_async().await;
    let basic = server.mock_async(|when, then| {
        when.method(POST).path(AUTH_BASIC_PATH);
        then.status(200).json_body(token_body(&refreshable_access_token(), "refresh-1"));
    }).await;
    let renewed = fresh_access_token();
    let refresh = server.mock_async(|when, then| {
        when.method(POST)
            .path(AUTH_REFRESH_PATH)
            .header("authorization", "nadeo_v1 t=refresh-1")
            .json_body(json!({"audience": "NadeoServices"}));
        then.status(200).json_body(token_body(&renewed, "refresh-2"));
    }).await;

    let client = client_for(&server.base_url());
    client.authenticate().await;

    // usable for calls but past the refresh-window start
    assert!(!client.auth_valid().await);
    assert_eq!(client.auth_mode().await, AuthMode::Refresh);

    client.authenticate().await;

    basic.assert_async().await;
    refresh.assert_async().await;
    let state = client.token_state().await;
    assert_eq!(state.access_token, renewed);
    assert_eq!(state.refresh_token, "refresh-2");
    assert!(client.auth_valid().await);
}

#[tokio::test]
async fn rejected_refresh_resets_to_sentinel() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(AUTH_BASIC_PATH);
        then.status(200).json_body(token_body(&refreshable_access_token(), "refresh-1"));
    }).await;
    let refresh = server.mock_async(|when, then| {
        when.method(POST).path(AUTH_REFRESH_PATH);
        then.status(401).body("token expired");
    }).await;

    let client = client_for(&server.base_url());
    client.authenticate().await;
    assert!(!client.token_state().await.is_empty());

    client.authenticate().await;

    refresh.assert_async().await;
    assert_eq!(client.token_state().await, TokenState::sentinel());
    assert_eq!(client.auth_mode().await, AuthMode::Initial);
}

#[tokio::test]
async fn rejected_credentials_leave_sentinel() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(AUTH_BASIC_PATH);
        then.status(401).json_body(json!({"error": "invalid credentials"}));
    }).await;

    let client = client_for(&server.base_url());
    client.authenticate().await;

    assert!(!client.auth_valid().await);
    assert_eq!(client.token_state().await, TokenState::sentinel());
}

#[tokio::test]
async fn malformed_access_token_is_treated_as_failure() {
    let server = MockServer::start_async().await;
    server.mock_async(|when, then| {
        when.method(POST).path(AUTH_BASIC_PATH);
        then.status(200).json_body(token_body("not-a-jwt", "refresh-1"));
    }).await;

    let client = client_for(&server.base_url());
    client.authenticate().await;

    assert_eq!(client.token_state().await, TokenState::sentinel());
}

#[tokio::test]
async fn unreachable_service_leaves_sentinel() {
    let client = client_for("http://127.0.0.1:1");
    client.authenticate().await;
    assert_eq!(client.token_state().await, TokenState::sentinel());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_authentication_sends_independent_requests() {
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();
    let router = Router::new().route(AUTH_BASIC_PATH, post(move |Json(_): Json<serde_json::Value>| {
        let c = counter_clone.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            Json(token_body(&fresh_access_token(), "refresh-1"))
        }
    }));
    let (handle, addr) = spawn_axum(router).await;

    let client = client_for(&format!("http://{}", addr));
    tokio::join!(client.authenticate(), client.authenticate());

    assert_eq!(counter.load(Ordering::SeqCst), 2, "both callers saw an empty cache");
    assert!(client.auth_valid().await);

    client.close();
    handle.abort();
}

}
