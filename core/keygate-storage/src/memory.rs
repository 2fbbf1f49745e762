//! Process-local backend.
//!
//! Nothing survives a restart. Intended for local development and tests,
//! or deployments without a configured remote backend.

use crate::error::StorageResult;
use crate::record::{LicenseRecord, TrialRecord, UserRecord};
use crate::store::LicenseStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, UserRecord>,
    trials: HashMap<String, TrialRecord>,
    licenses: HashMap<String, LicenseRecord>,
}

/// In-memory [`LicenseStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of license rows currently held.
    pub async fn license_count(&self) -> usize {
        self.tables.read().await.licenses.len()
    }

    /// Number of trial rows currently held.
    pub async fn trial_count(&self) -> usize {
        self.tables.read().await.trials.len()
    }
}

#[async_trait]
impl LicenseStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ensure_user(&self, user: &UserRecord) -> StorageResult<()> {
        self.tables
            .write()
            .await
            .users
            .entry(user.email.clone())
            .or_insert_with(|| user.clone());
        Ok(())
    }

    async fn find_user(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(email).cloned())
    }

    async fn find_trial(&self, email: &str) -> StorageResult<Option<TrialRecord>> {
        Ok(self.tables.read().await.trials.get(email).cloned())
    }

    async fn upsert_trial(&self, trial: &TrialRecord) -> StorageResult<()> {
        self.tables
            .write()
            .await
            .trials
            .insert(trial.email.clone(), trial.clone());
        Ok(())
    }

    async fn find_license(&self, license_key: &str) -> StorageResult<Option<LicenseRecord>> {
        Ok(self.tables.read().await.licenses.get(license_key).cloned())
    }

    async fn upsert_license(&self, license: &LicenseRecord) -> StorageResult<()> {
        self.tables
            .write()
            .await
            .licenses
            .insert(license.license_key.clone(), license.clone());
        Ok(())
    }
}
