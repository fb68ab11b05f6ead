// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile read and partial-update tests.

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;

#[tokio::test]
async fn test_get_profile_returns_stored_fields() {
    let (app, _) = common::create_test_app();
    let (token, _, user_id) = common::signup_user(&app, "a@b.com").await;

    let response =
        common::send_json(&app, Method::GET, "/profile", None, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json["message"], "User profile retrieved successfully.");
    assert_eq!(json["user"]["id"], user_id);
    assert_eq!(json["user"]["email"], "a@b.com");
    assert_eq!(json["user"]["firstName"], "Ann");
    assert_eq!(json["user"]["height"], 170.0);
    assert_eq!(json["user"]["weight"], 65.0);
    assert_eq!(json["user"]["fitnessGoal"], "maintain");
    assert!(json["user"].get("password").is_none());
    assert!(json["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_get_profile_requires_auth() {
    let (app, _) = common::create_test_app();

    let response = common::send_json(&app, Method::GET, "/profile", None, None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bad = common::send_json(
        &app,
        Method::GET,
        "/profile",
        None,
        Some("not.a.valid.token"),
        None,
    )
    .await;
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_partial_update_leaves_other_fields_alone() {
    let (app, state) = common::create_test_app();
    let (token, _, _) = common::signup_user(&app, "a@b.com").await;

    let response = common::send_json(
        &app,
        Method::PUT,
        "/profile",
        Some(json!({"weight": 63.5})),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json["message"], "Profile updated successfully.");
    assert_eq!(json["user"]["weight"], 63.5);
    // Untouched fields keep their values
    assert_eq!(json["user"]["fitnessGoal"], "maintain");
    assert_eq!(json["user"]["height"], 170.0);

    let stored = state.users.find_by_email("a@b.com").await.unwrap().unwrap();
    assert_eq!(stored.weight, Some(63.5));
    assert_eq!(stored.fitness_goal.as_deref(), Some("maintain"));
}

#[tokio::test]
async fn test_zero_is_a_real_update_not_a_missing_field() {
    let (app, state) = common::create_test_app();
    let (token, _, _) = common::signup_user(&app, "a@b.com").await;

    let response = common::send_json(
        &app,
        Method::PUT,
        "/profile",
        Some(json!({"weight": 0.0})),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = state.users.find_by_email("a@b.com").await.unwrap().unwrap();
    assert_eq!(stored.weight, Some(0.0));
    // And everything else survives
    assert_eq!(stored.height, Some(170.0));
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let (app, state) = common::create_test_app();
    let (token, _, _) = common::signup_user(&app, "a@b.com").await;

    let update = json!({"weight": 63.5, "fitnessGoal": "bulk"});
    for _ in 0..2 {
        let response = common::send_json(
            &app,
            Method::PUT,
            "/profile",
            Some(update.clone()),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored = state.users.find_by_email("a@b.com").await.unwrap().unwrap();
    assert_eq!(stored.weight, Some(63.5));
    assert_eq!(stored.fitness_goal.as_deref(), Some("bulk"));
    assert_eq!(stored.first_name, "Ann");
}

#[tokio::test]
async fn test_update_rejects_malformed_email() {
    let (app, state) = common::create_test_app();
    let (token, _, _) = common::signup_user(&app, "a@b.com").await;

    let response = common::send_json(
        &app,
        Method::PUT,
        "/profile",
        Some(json!({"email": "not-an-email"})),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = common::body_json(response).await;
    assert_eq!(json["message"], "Invalid Email.");

    let stored = state.users.find_by_email("a@b.com").await.unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn test_update_normalizes_new_email() {
    let (app, state) = common::create_test_app();
    let (token, _, _) = common::signup_user(&app, "a@b.com").await;

    let response = common::send_json(
        &app,
        Method::PUT,
        "/profile",
        Some(json!({"email": " New.Address@B.COM "})),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(state
        .users
        .find_by_email("new.address@b.com")
        .await
        .unwrap()
        .is_some());
    assert!(state.users.find_by_email("a@b.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_email_collision_conflicts() {
    let (app, _) = common::create_test_app();
    common::signup_user(&app, "taken@b.com").await;
    let (token, _, _) = common::signup_user(&app, "a@b.com").await;

    let response = common::send_json(
        &app,
        Method::PUT,
        "/profile",
        Some(json!({"email": "taken@b.com"})),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_nutrition_targets() {
    let (app, _) = common::create_test_app();
    let (token, _, _) = common::signup_user(&app, "a@b.com").await;

    let response = common::send_json(
        &app,
        Method::PUT,
        "/profile",
        Some(json!({"caloriesRecommended": 2200.0, "proteinRecommended": 130.0})),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json["user"]["caloriesRecommended"], 2200.0);
    assert_eq!(json["user"]["proteinRecommended"], 130.0);
}
