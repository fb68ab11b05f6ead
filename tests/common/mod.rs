// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use nutrifit_api::config::Config;
use nutrifit_api::db::{SessionStore, UserDb};
use nutrifit_api::routes::create_router;
use nutrifit_api::services::TokenService;
use nutrifit_api::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app with in-memory store backends.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let config = Config::test_default();
    let users = UserDb::new_memory();
    let sessions = SessionStore::new_memory();
    let tokens = TokenService::new(
        config.access_token_secret.clone(),
        config.refresh_token_secret.clone(),
        sessions,
    );

    let state = Arc::new(AppState {
        config,
        users,
        tokens,
    });

    (create_router(state.clone()), state)
}

/// Send a JSON request. `auth` is an optional bearer access token; `cookie`
/// an optional raw Cookie header value.
#[allow(dead_code)]
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    auth: Option<&str>,
    cookie: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = auth {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

#[allow(dead_code)]
pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::POST, uri, Some(body), None, None).await
}

/// Parse a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Extract the `refreshToken` cookie value from a response's Set-Cookie
/// headers, if one was set.
#[allow(dead_code)]
pub fn refresh_cookie_value(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("refreshToken="))
        .map(|value| {
            value["refreshToken=".len()..]
                .split(';')
                .next()
                .unwrap()
                .to_string()
        })
}

/// Full Set-Cookie header for the refresh cookie (for attribute checks).
#[allow(dead_code)]
pub fn refresh_set_cookie_header(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("refreshToken="))
        .map(|value| value.to_string())
}

/// A signup body for the standard test user, overridable per-field.
#[allow(dead_code)]
pub fn signup_body(email: &str) -> serde_json::Value {
    serde_json::json!({
        "firstName": "Ann",
        "lastName": "Lee",
        "email": email,
        "password": "secret123",
        "passwordConfirm": "secret123",
        "height": 170.0,
        "weight": 65.0,
        "fitnessGoal": "maintain"
    })
}

/// Sign up a test user and return (access_token, refresh_cookie, user_id).
#[allow(dead_code)]
pub async fn signup_user(app: &Router, email: &str) -> (String, String, String) {
    let response = post_json(app, "/signup", signup_body(email)).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let cookie = refresh_cookie_value(&response).expect("signup should set the refresh cookie");
    let json = body_json(response).await;

    let token = json["token"]
        .as_str()
        .unwrap()
        .strip_prefix("Bearer ")
        .unwrap()
        .to_string();
    let user_id = json["data"]["user"]["id"].as_str().unwrap().to_string();

    (token, cookie, user_id)
}
