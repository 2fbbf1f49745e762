//! Shared test helpers for licensing tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use keygate_license::{LicensingService, ManualClock};
use keygate_storage::{
    LicenseRecord, LicenseStore, MemoryStore, StorageError, StorageResult, TrialRecord, UserRecord,
};
use std::sync::Arc;

/// A fixed starting instant for simulated time.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap()
}

/// Service over a fresh memory store with a manual clock starting at [`t0`].
pub struct Harness {
    pub service: LicensingService,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(t0()));
    let service = LicensingService::with_clock(store.clone(), clock.clone());
    Harness {
        service,
        store,
        clock,
    }
}

/// Which store call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Reads,
    TrialWrites,
    LicenseWrites,
}

/// Delegates to a [`MemoryStore`] but fails the chosen calls.
pub struct FailingStore {
    pub inner: MemoryStore,
    pub fail_on: FailOn,
}

impl FailingStore {
    pub fn new(fail_on: FailOn) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_on,
        }
    }

    fn check(&self, op: FailOn) -> StorageResult<()> {
        if self.fail_on == op {
            Err(StorageError::Backend("write timed out".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LicenseStore for FailingStore {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn ensure_user(&self, user: &UserRecord) -> StorageResult<()> {
        self.inner.ensure_user(user).await
    }

    async fn find_user(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        self.check(FailOn::Reads)?;
        self.inner.find_user(email).await
    }

    async fn find_trial(&self, email: &str) -> StorageResult<Option<TrialRecord>> {
        self.check(FailOn::Reads)?;
        self.inner.find_trial(email).await
    }

    async fn upsert_trial(&self, trial: &TrialRecord) -> StorageResult<()> {
        self.check(FailOn::TrialWrites)?;
        self.inner.upsert_trial(trial).await
    }

    async fn find_license(&self, license_key: &str) -> StorageResult<Option<LicenseRecord>> {
        self.check(FailOn::Reads)?;
        self.inner.find_license(license_key).await
    }

    async fn upsert_license(&self, license: &LicenseRecord) -> StorageResult<()> {
        self.check(FailOn::LicenseWrites)?;
        self.inner.upsert_license(license).await
    }
}

/// Returns true if `key` looks like `[0-9a-f]{16}-[0-9a-f]{8}`.
pub fn is_generated_key(key: &str) -> bool {
    let is_hex = |s: &str| s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'));
    match key.split_once('-') {
        Some((head, tail)) => head.len() == 16 && tail.len() == 8 && is_hex(head) && is_hex(tail),
        None => false,
    }
}
