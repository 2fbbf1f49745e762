//! The persistence seam used by the licensing service.

use crate::error::StorageResult;
use crate::record::{LicenseRecord, TrialRecord, UserRecord};
use async_trait::async_trait;

/// Upsert-by-key and lookup-by-key over the three licensing tables.
///
/// Callers are expected to pass already-normalized emails. Lookups return
/// `Ok(None)` when the row is absent; `Err` is reserved for backend failures.
#[async_trait]
pub trait LicenseStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Inserts the user if no row exists for its email. An existing row keeps
    /// its original `created_at`.
    async fn ensure_user(&self, user: &UserRecord) -> StorageResult<()>;

    async fn find_user(&self, email: &str) -> StorageResult<Option<UserRecord>>;

    async fn find_trial(&self, email: &str) -> StorageResult<Option<TrialRecord>>;

    /// Inserts or replaces the trial keyed by its email.
    async fn upsert_trial(&self, trial: &TrialRecord) -> StorageResult<()>;

    async fn find_license(&self, license_key: &str) -> StorageResult<Option<LicenseRecord>>;

    /// Inserts or replaces the license keyed by its license key. Last write wins.
    async fn upsert_license(&self, license: &LicenseRecord) -> StorageResult<()>;
}
