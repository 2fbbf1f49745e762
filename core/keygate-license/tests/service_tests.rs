mod common;

use chrono::Duration;
use common::{FailOn, FailingStore, harness, is_generated_key, t0};
use keygate_license::{AccessStatus, LicenseError, LicensingService, TRIAL_DAYS, normalize_email};
use keygate_storage::{LicenseRecord, LicenseState, LicenseStore};
use pretty_assertions::assert_eq;
use std::sync::Arc;

// ── start_trial ──────────────────────────────────────────────────

#[tokio::test]
async fn start_trial_grants_fourteen_days() {
    let h = harness();
    let grant = h.service.start_trial("a@x.com").await.unwrap();

    assert_eq!(grant.status, AccessStatus::Trial);
    assert_eq!(grant.expires_at, t0() + Duration::days(TRIAL_DAYS));
    assert_eq!(grant.message, "Trial started");

    let user = h.store.find_user("a@x.com").await.unwrap().unwrap();
    assert_eq!(user.created_at, t0());
}

#[tokio::test]
async fn start_trial_requires_email() {
    let h = harness();
    for raw in ["", "   ", "\t\n"] {
        let err = h.service.start_trial(raw).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Email required");
    }
    assert_eq!(h.store.trial_count().await, 0);
}

#[tokio::test]
async fn start_trial_is_idempotent_within_window() {
    let h = harness();
    let first = h.service.start_trial("a@x.com").await.unwrap();

    h.clock.advance(Duration::days(3));
    let second = h.service.start_trial("a@x.com").await.unwrap();

    assert_eq!(second.status, AccessStatus::Trial);
    assert_eq!(second.expires_at, first.expires_at);
    assert_eq!(second.message, "Trial already active");
    assert_eq!(h.store.trial_count().await, 1);
}

#[tokio::test]
async fn start_trial_after_window_reports_expired_without_renewal() {
    let h = harness();
    let first = h.service.start_trial("a@x.com").await.unwrap();

    h.clock.advance(Duration::days(TRIAL_DAYS) + Duration::seconds(1));
    let again = h.service.start_trial("a@x.com").await.unwrap();

    assert_eq!(again.status, AccessStatus::Expired);
    assert_eq!(again.expires_at, first.expires_at);
    assert_eq!(again.message, "Trial expired");
    assert_eq!(h.store.trial_count().await, 1);
}

#[tokio::test]
async fn start_trial_normalizes_email() {
    let h = harness();
    let first = h.service.start_trial(" Foo@Bar.COM ").await.unwrap();
    let second = h.service.start_trial("foo@bar.com").await.unwrap();

    assert_eq!(second.message, "Trial already active");
    assert_eq!(first.expires_at, second.expires_at);
    assert!(h.store.find_trial("foo@bar.com").await.unwrap().is_some());
    assert_eq!(normalize_email(" Foo@Bar.COM "), "foo@bar.com");
}

#[tokio::test]
async fn start_trial_write_failure_leaves_orphan_user() {
    let store = Arc::new(FailingStore::new(FailOn::TrialWrites));
    let service = LicensingService::new(store.clone());

    let err = service.start_trial("a@x.com").await.unwrap_err();
    assert!(matches!(err, LicenseError::Backend(_)));
    assert_eq!(err.client_message(), "write timed out");

    assert!(store.inner.find_user("a@x.com").await.unwrap().is_some());
    assert!(store.inner.find_trial("a@x.com").await.unwrap().is_none());
}

// ── activate_license ─────────────────────────────────────────────

#[tokio::test]
async fn activate_generates_key_when_none_provided() {
    let h = harness();
    let activation = h.service.activate_license("a@x.com", None).await.unwrap();

    assert_eq!(activation.status, AccessStatus::Active);
    assert!(activation.expires_at.is_none());
    assert!(is_generated_key(&activation.license_key));

    let lic = h.store.find_license(&activation.license_key).await.unwrap().unwrap();
    assert_eq!(lic.email, "a@x.com");
    assert_eq!(lic.status, LicenseState::Active);
    assert_eq!(lic.created_at, t0());
}

#[tokio::test]
async fn activate_empty_provided_key_counts_as_absent() {
    let h = harness();
    let activation = h.service.activate_license("a@x.com", Some("")).await.unwrap();
    assert!(is_generated_key(&activation.license_key));
}

#[tokio::test]
async fn activate_uses_provided_key() {
    let h = harness();
    let activation = h
        .service
        .activate_license("A@X.com", Some("key1"))
        .await
        .unwrap();

    assert_eq!(activation.license_key, "key1");
    let lic = h.store.find_license("key1").await.unwrap().unwrap();
    assert_eq!(lic.email, "a@x.com");
}

#[tokio::test]
async fn activate_twice_with_same_key_overwrites() {
    let h = harness();
    h.service.activate_license("a@x.com", Some("key1")).await.unwrap();
    h.service.activate_license("b@x.com", Some("key1")).await.unwrap();

    assert_eq!(h.store.license_count().await, 1);
    let lic = h.store.find_license("key1").await.unwrap().unwrap();
    assert_eq!(lic.email, "b@x.com");
}

#[tokio::test]
async fn activate_twice_without_key_creates_two_licenses() {
    let h = harness();
    let first = h.service.activate_license("a@x.com", None).await.unwrap();
    let second = h.service.activate_license("a@x.com", None).await.unwrap();

    assert_ne!(first.license_key, second.license_key);
    assert_eq!(h.store.license_count().await, 2);
}

#[tokio::test]
async fn activate_requires_email() {
    let h = harness();
    let err = h.service.activate_license("  ", Some("key1")).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(h.store.license_count().await, 0);
}

#[tokio::test]
async fn activate_write_failure_is_backend_error() {
    let store = Arc::new(FailingStore::new(FailOn::LicenseWrites));
    let service = LicensingService::new(store);
    let err = service.activate_license("a@x.com", None).await.unwrap_err();
    assert!(!err.is_validation());
}

// ── verify_license ───────────────────────────────────────────────

#[tokio::test]
async fn verify_requires_email() {
    let h = harness();
    let err = h.service.verify_license("", Some("key1")).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.client_message(), "Email required");
}

#[tokio::test]
async fn verify_without_trial_or_license_is_inactive() {
    let h = harness();
    let v = h.service.verify_license("nobody@x.com", None).await.unwrap();

    assert_eq!(v.status, AccessStatus::Inactive);
    assert_eq!(v.reason.as_deref(), Some("No trial or license"));
    assert!(v.expires_at.is_none());
    assert!(v.license_key.is_none());
}

#[tokio::test]
async fn verify_trial_boundary() {
    let h = harness();
    let grant = h.service.start_trial("a@x.com").await.unwrap();

    h.clock.set(grant.expires_at - Duration::milliseconds(1));
    let v = h.service.verify_license("a@x.com", None).await.unwrap();
    assert_eq!(v.status, AccessStatus::Trial);
    assert_eq!(v.expires_at, Some(grant.expires_at));

    h.clock.set(grant.expires_at);
    let v = h.service.verify_license("a@x.com", None).await.unwrap();
    assert_eq!(v.status, AccessStatus::Expired);
    assert_eq!(v.expires_at, Some(grant.expires_at));
}

#[tokio::test]
async fn verify_immediately_after_trial_start() {
    let h = harness();
    let grant = h.service.start_trial("a@x.com").await.unwrap();
    let v = h.service.verify_license("a@x.com", None).await.unwrap();

    assert_eq!(v.status, AccessStatus::Trial);
    assert_eq!(v.expires_at, Some(grant.expires_at));
    assert_eq!(v.expires_at, Some(t0() + Duration::days(14)));
}

#[tokio::test]
async fn active_license_beats_expired_trial() {
    let h = harness();
    h.service.start_trial("a@x.com").await.unwrap();
    h.service.activate_license("a@x.com", Some("key1")).await.unwrap();

    h.clock.advance(Duration::days(60));
    let v = h.service.verify_license(" A@x.COM", Some("key1")).await.unwrap();

    assert_eq!(v.status, AccessStatus::Active);
    assert_eq!(v.license_key.as_deref(), Some("key1"));
    assert!(v.expires_at.is_none());

    let without_key = h.service.verify_license("a@x.com", None).await.unwrap();
    assert_eq!(without_key.status, AccessStatus::Expired);
}

#[tokio::test]
async fn license_owned_by_other_email_is_ignored() {
    let h = harness();
    let activation = h.service.activate_license("a@x.com", Some("key1")).await.unwrap();
    assert_eq!(activation.license_key, "key1");

    let v = h.service.verify_license("a@x.com", Some("key1")).await.unwrap();
    assert_eq!(v.status, AccessStatus::Active);

    let v = h.service.verify_license("b@other.com", Some("key1")).await.unwrap();
    assert_eq!(v.status, AccessStatus::Inactive);
    assert!(v.license_key.is_none());

    h.service.start_trial("b@other.com").await.unwrap();
    let v = h.service.verify_license("b@other.com", Some("key1")).await.unwrap();
    assert_eq!(v.status, AccessStatus::Trial);
}

#[tokio::test]
async fn unknown_key_falls_through_to_trial() {
    let h = harness();
    h.service.start_trial("a@x.com").await.unwrap();
    let v = h.service.verify_license("a@x.com", Some("nope")).await.unwrap();
    assert_eq!(v.status, AccessStatus::Trial);
}

#[tokio::test]
async fn inactive_or_expired_license_rows_are_not_accepted() {
    let h = harness();
    h.store
        .upsert_license(&LicenseRecord {
            status: LicenseState::Inactive,
            ..LicenseRecord::active("revoked", "a@x.com", t0())
        })
        .await
        .unwrap();
    h.store
        .upsert_license(&LicenseRecord {
            expires_at: Some(t0() + Duration::days(1)),
            ..LicenseRecord::active("timed", "a@x.com", t0())
        })
        .await
        .unwrap();

    let v = h.service.verify_license("a@x.com", Some("revoked")).await.unwrap();
    assert_eq!(v.status, AccessStatus::Inactive);

    let v = h.service.verify_license("a@x.com", Some("timed")).await.unwrap();
    assert_eq!(v.status, AccessStatus::Active);
    assert_eq!(v.expires_at, Some(t0() + Duration::days(1)));

    h.clock.advance(Duration::days(1));
    let v = h.service.verify_license("a@x.com", Some("timed")).await.unwrap();
    assert_eq!(v.status, AccessStatus::Inactive);
}

#[tokio::test]
async fn verify_performs_no_writes() {
    let h = harness();
    h.service.verify_license("a@x.com", Some("key1")).await.unwrap();

    assert!(h.store.find_user("a@x.com").await.unwrap().is_none());
    assert_eq!(h.store.trial_count().await, 0);
    assert_eq!(h.store.license_count().await, 0);
}

#[tokio::test]
async fn verify_read_failure_is_backend_error() {
    let service = LicensingService::new(Arc::new(FailingStore::new(FailOn::Reads)));
    let err = service.verify_license("a@x.com", None).await.unwrap_err();
    assert!(matches!(err, LicenseError::Backend(_)));
}
