mod common;

use std::collections::HashSet;

use common::store;
use identity_seaorm_store::{AppAuthId, Error, NewAppAuth, SeaOrmStore, TokenRegistry};
use rstest::rstest;
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tokio::task::JoinSet;

#[rstest]
#[tokio::test]
async fn resolving_an_issued_token_returns_its_registration(#[future(awt)] store: SeaOrmStore) {
    let expires_at = OffsetDateTime::now_utc() + Duration::days(30);
    let issued = store
        .issue_token(
            NewAppAuth::new("billing", "tok_billing_7f3a")
                .with_description("nightly invoice export")
                .with_meta(json!({ "scopes": ["invoices:read"] }))
                .with_expires_at(expires_at),
        )
        .await
        .unwrap();

    assert_eq!(issued.name, "billing");
    assert_eq!(issued.description.as_deref(), Some("nightly invoice export"));
    assert_eq!(issued.meta, json!({ "scopes": ["invoices:read"] }));

    let resolved = store.resolve_by_token("tok_billing_7f3a").await.unwrap();
    assert_eq!(resolved, issued);
    assert_eq!(store.get_app_auth(issued.id).await.unwrap(), issued);
}

#[rstest]
#[tokio::test]
async fn tokens_without_expiry_resolve(#[future(awt)] store: SeaOrmStore) {
    let issued = store
        .issue_token(NewAppAuth::new("search", "tok_search"))
        .await
        .unwrap();

    assert_eq!(issued.expires_at, None);
    assert_eq!(issued.meta, json!({}));
    assert_eq!(store.resolve_by_token("tok_search").await.unwrap(), issued);
}

#[rstest]
#[tokio::test]
async fn unknown_and_expired_tokens_fail_differently(#[future(awt)] store: SeaOrmStore) {
    store
        .issue_token(
            NewAppAuth::new("legacy", "tok_legacy")
                .with_expires_at(OffsetDateTime::now_utc() - Duration::minutes(1)),
        )
        .await
        .unwrap();

    let missing = store.resolve_by_token("tok_nope").await.unwrap_err();
    let expired = store.resolve_by_token("tok_legacy").await.unwrap_err();

    assert!(matches!(missing, Error::NotFound));
    assert!(matches!(expired, Error::Expired));
    assert!(missing.is_access_denied() && expired.is_access_denied());
}

#[rstest]
#[tokio::test]
async fn duplicate_names_and_tokens_are_rejected(#[future(awt)] store: SeaOrmStore) {
    let original = store
        .issue_token(NewAppAuth::new("mailer", "tok_mailer"))
        .await
        .unwrap();

    let same_name = store
        .issue_token(NewAppAuth::new("mailer", "tok_other"))
        .await
        .unwrap_err();
    assert!(matches!(same_name, Error::DuplicateName(ref name) if name == "mailer"));

    let same_token = store
        .issue_token(NewAppAuth::new("mailer-2", "tok_mailer"))
        .await
        .unwrap_err();
    assert!(matches!(same_token, Error::DuplicateToken));

    // Nothing was overwritten.
    assert_eq!(store.resolve_by_token("tok_mailer").await.unwrap(), original);
    assert!(matches!(
        store.resolve_by_token("tok_other").await,
        Err(Error::NotFound)
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_issues_of_one_token_admit_exactly_one(#[future(awt)] store: SeaOrmStore) {
    let mut tasks = JoinSet::new();
    for i in 0..100 {
        let store = store.clone();
        tasks.spawn(async move {
            store
                .issue_token(NewAppAuth::new(format!("svc-{i}"), "dup-token-001"))
                .await
        });
    }

    let mut winners = Vec::new();
    let mut duplicates = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(app) => winners.push(app),
            Err(Error::DuplicateToken) => duplicates += 1,
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(duplicates, 99);
    assert_eq!(
        store.resolve_by_token("dup-token-001").await.unwrap(),
        winners[0]
    );
}

#[rstest]
#[tokio::test]
async fn revoked_tokens_stop_resolving(#[future(awt)] store: SeaOrmStore) {
    let issued = store
        .issue_token(NewAppAuth::new("cron", "tok_cron"))
        .await
        .unwrap();

    store.revoke(issued.id).await.unwrap();

    assert!(matches!(
        store.resolve_by_token("tok_cron").await,
        Err(Error::NotFound)
    ));
    assert!(matches!(store.revoke(issued.id).await, Err(Error::NotFound)));
}

#[rstest]
#[tokio::test]
async fn rotation_replaces_the_token(#[future(awt)] store: SeaOrmStore) {
    let issued = store
        .issue_token(NewAppAuth::new("metrics", "tok_v1"))
        .await
        .unwrap();

    store.rotate_token(issued.id, "tok_v2".into()).await.unwrap();

    assert!(matches!(
        store.resolve_by_token("tok_v1").await,
        Err(Error::NotFound)
    ));
    let rotated = store.resolve_by_token("tok_v2").await.unwrap();
    assert_eq!(rotated.id, issued.id);
    assert_eq!(rotated.name, "metrics");
}

#[rstest]
#[tokio::test]
async fn rotation_into_a_taken_token_is_rejected(#[future(awt)] store: SeaOrmStore) {
    let a = store
        .issue_token(NewAppAuth::new("a", "tok_a"))
        .await
        .unwrap();
    let b = store
        .issue_token(NewAppAuth::new("b", "tok_b"))
        .await
        .unwrap();

    assert!(matches!(
        store.rotate_token(a.id, "tok_b".into()).await,
        Err(Error::DuplicateToken)
    ));
    assert_eq!(store.resolve_by_token("tok_a").await.unwrap(), a);
    assert_eq!(store.resolve_by_token("tok_b").await.unwrap(), b);

    let ghost = AppAuthId::from(uuid::Uuid::new_v4());
    assert!(matches!(
        store.rotate_token(ghost, "tok_c".into()).await,
        Err(Error::NotFound)
    ));
}

#[rstest]
#[tokio::test]
async fn expiry_can_be_extended_and_cleared(#[future(awt)] store: SeaOrmStore) {
    let issued = store
        .issue_token(
            NewAppAuth::new("etl", "tok_etl")
                .with_expires_at(OffsetDateTime::now_utc() - Duration::hours(1)),
        )
        .await
        .unwrap();
    assert!(matches!(
        store.resolve_by_token("tok_etl").await,
        Err(Error::Expired)
    ));

    store
        .set_token_expiry(issued.id, Some(OffsetDateTime::now_utc() + Duration::hours(1)))
        .await
        .unwrap();
    assert!(store.resolve_by_token("tok_etl").await.is_ok());

    store.set_token_expiry(issued.id, None).await.unwrap();
    assert_eq!(
        store.resolve_by_token("tok_etl").await.unwrap().expires_at,
        None
    );
}

#[rstest]
#[tokio::test]
async fn verify_token_checks_match_before_expiry(#[future(awt)] store: SeaOrmStore) {
    let live = store
        .issue_token(NewAppAuth::new("live", "tok_live"))
        .await
        .unwrap();
    let stale = store
        .issue_token(
            NewAppAuth::new("stale", "tok_stale")
                .with_expires_at(OffsetDateTime::now_utc() - Duration::seconds(1)),
        )
        .await
        .unwrap();

    store.verify_token(live.id, "tok_live").await.unwrap();
    assert!(matches!(
        store.verify_token(live.id, "tok_stale").await,
        Err(Error::InvalidToken)
    ));
    assert!(matches!(
        store.verify_token(stale.id, "wrong").await,
        Err(Error::InvalidToken)
    ));
    assert!(matches!(
        store.verify_token(stale.id, "tok_stale").await,
        Err(Error::Expired)
    ));
    assert!(matches!(
        store
            .verify_token(AppAuthId::from(uuid::Uuid::new_v4()), "tok_live")
            .await,
        Err(Error::NotFound)
    ));
}

#[rstest]
#[tokio::test]
async fn reaping_tokens_spares_non_expiring_ones(#[future(awt)] store: SeaOrmStore) {
    let now = OffsetDateTime::now_utc();
    for (name, expires_at) in [
        ("gone-1", Some(now - Duration::days(1))),
        ("gone-2", Some(now - Duration::seconds(1))),
        ("later", Some(now + Duration::days(1))),
        ("forever", None),
    ] {
        let mut app = NewAppAuth::new(name, format!("tok_{name}"));
        app.expires_at = expires_at;
        store.issue_token(app).await.unwrap();
    }

    assert_eq!(store.delete_expired_tokens(now).await.unwrap(), 2);
    assert_eq!(store.delete_expired_tokens(now).await.unwrap(), 0);

    let survivors: HashSet<String> = [
        store.resolve_by_token("tok_later").await.unwrap().name,
        store.resolve_by_token("tok_forever").await.unwrap().name,
    ]
    .into_iter()
    .collect();
    assert_eq!(survivors, HashSet::from(["later".to_owned(), "forever".to_owned()]));
}
