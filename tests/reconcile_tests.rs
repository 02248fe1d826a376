// SPDX-License-Identifier: MIT

//! User reconciliation tests: find-or-create idempotence and the
//! concurrent first-login race.

use teamscore::db::Store;
use teamscore::error::AppError;
use teamscore::services::IdentityService;

mod common;

#[tokio::test]
async fn test_first_login_creates_user_once() {
    let pool = common::test_pool().await;
    let store = Store::new(pool.clone());
    let identity = IdentityService::new(store.clone());

    let profile = common::profile("g-1", "Ada", &["a@x.com", "b@x.com"]);

    let first = identity.reconcile(&profile).await.unwrap();
    assert_eq!(first.google_id.as_deref(), Some("g-1"));
    assert_eq!(first.name, "Ada");
    // Primary email is the first entry.
    assert_eq!(first.email.as_deref(), Some("a@x.com"));
    assert!(first.team_id.is_none());

    let second = identity.reconcile(&profile).await.unwrap();
    assert_eq!(second.id, first.id);

    assert_eq!(store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reconcile_without_email() {
    let pool = common::test_pool().await;
    let identity = IdentityService::new(Store::new(pool));

    let user = identity
        .reconcile(&common::profile("g-2", "Grace", &[]))
        .await
        .unwrap();

    assert!(user.email.is_none());
}

#[tokio::test]
async fn test_repeat_login_does_not_refresh_profile() {
    // Current behavior: the stored record is returned unchanged even if
    // the provider profile has since changed.
    let pool = common::test_pool().await;
    let identity = IdentityService::new(Store::new(pool));

    let created = identity
        .reconcile(&common::profile("g-3", "Old Name", &["old@x.com"]))
        .await
        .unwrap();

    let again = identity
        .reconcile(&common::profile("g-3", "New Name", &["new@x.com"]))
        .await
        .unwrap();

    assert_eq!(again.id, created.id);
    assert_eq!(again.name, "Old Name");
    assert_eq!(again.email.as_deref(), Some("old@x.com"));
}

#[tokio::test]
async fn test_duplicate_create_hits_unique_constraint() {
    let pool = common::test_pool().await;
    let store = Store::new(pool);

    store
        .create_google_user("g-4", "First", Some("f@x.com"), None)
        .await
        .unwrap();

    let err = store
        .create_google_user("g-4", "Second", Some("s@x.com"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DuplicateIdentity));
}

#[tokio::test]
async fn test_reconcile_recovers_when_losing_create_race() {
    // Simulate losing the race: the row appears between our lookup miss
    // and our insert. Reconcile must re-read and return the winner's row.
    let pool = common::test_pool().await;
    let store = Store::new(pool);
    let identity = IdentityService::new(store.clone());

    let winner = store
        .create_google_user("g-5", "Winner", Some("w@x.com"), None)
        .await
        .unwrap();

    let loser = identity
        .reconcile(&common::profile("g-5", "Loser", &["l@x.com"]))
        .await
        .unwrap();

    assert_eq!(loser.id, winner.id);
    assert_eq!(loser.name, "Winner");
    assert_eq!(store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_reconcile_yields_single_row() {
    let pool = common::test_pool().await;
    let store = Store::new(pool);
    let identity = IdentityService::new(store.clone());

    let profile = common::profile("g-6", "Racer", &["r@x.com"]);

    let (a, b) = tokio::join!(identity.reconcile(&profile), identity.reconcile(&profile));

    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a.id, b.id);
    assert_eq!(store.list_users().await.unwrap().len(), 1);
}
