// SPDX-License-Identifier: MIT

//! User deletion tests: the user row and all dependent score and
//! session rows go away in one transaction.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_delete_user_removes_all_scores() {
    let (app, state, _pool) = common::create_test_app().await;
    let (cookie, _admin_id) = common::login(&state, "g-admin").await;

    let team = state.store.create_team("Blue").await.unwrap();
    let user = state.store.create_user("Ada", team.id).await.unwrap();
    for points in [10, 20, 30] {
        state.store.create_score(user.id, points).await.unwrap();
    }
    assert_eq!(
        state.store.list_scores_for_user(user.id).await.unwrap().len(),
        3
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/users/{}", user.id))
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    assert!(state.store.find_user_by_id(user.id).await.unwrap().is_none());
    assert!(state
        .store
        .list_scores_for_user(user.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_delete_missing_user_is_404() {
    let (app, state, _pool) = common::create_test_app().await;
    let (cookie, _) = common::login(&state, "g-admin").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/users/424242")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_leaves_other_users_scores() {
    let (_app, state, _pool) = common::create_test_app().await;

    let team = state.store.create_team("Red").await.unwrap();
    let ada = state.store.create_user("Ada", team.id).await.unwrap();
    let grace = state.store.create_user("Grace", team.id).await.unwrap();
    state.store.create_score(ada.id, 5).await.unwrap();
    state.store.create_score(grace.id, 7).await.unwrap();

    assert!(state.store.delete_user_with_scores(ada.id).await.unwrap());

    assert_eq!(
        state
            .store
            .list_scores_for_user(grace.id)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(state.store.find_user_by_id(grace.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_rolls_back_when_user_delete_fails() {
    let (_app, state, pool) = common::create_test_app().await;

    let team = state.store.create_team("Green").await.unwrap();
    let user = state.store.create_user("Ada", team.id).await.unwrap();
    state.store.create_score(user.id, 42).await.unwrap();

    // Make the transaction's final statement fail mid-way.
    sqlx::query(&format!(
        "CREATE TRIGGER block_user_delete BEFORE DELETE ON users \
         WHEN OLD.id = {} BEGIN SELECT RAISE(ABORT, 'delete blocked'); END",
        user.id
    ))
    .execute(&pool)
    .await
    .unwrap();

    assert!(state.store.delete_user_with_scores(user.id).await.is_err());

    // The earlier score delete was rolled back with it.
    assert!(state.store.find_user_by_id(user.id).await.unwrap().is_some());
    assert_eq!(
        state.store.list_scores_for_user(user.id).await.unwrap().len(),
        1
    );

    sqlx::query("DROP TRIGGER block_user_delete")
        .execute(&pool)
        .await
        .unwrap();

    assert!(state.store.delete_user_with_scores(user.id).await.unwrap());
    assert!(state
        .store
        .list_scores_for_user(user.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_delete_user_destroys_their_sessions() {
    let (_app, state, _pool) = common::create_test_app().await;
    let (cookie, user_id) = common::login(&state, "g-doomed").await;
    let token = cookie
        .trim_start_matches("teamscore_session=")
        .to_string();

    assert_eq!(
        state.sessions.resolve(&token).await.unwrap(),
        Some(user_id)
    );

    assert!(state.store.delete_user_with_scores(user_id).await.unwrap());

    assert_eq!(state.sessions.resolve(&token).await.unwrap(), None);
}
