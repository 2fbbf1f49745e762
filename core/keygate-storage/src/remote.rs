//! Remote backend over a PostgREST-compatible REST API.
//!
//! Tables are addressed as `{url}/rest/v1/{table}`. Lookups use
//! `?{column}=eq.{value}` filters, upserts use `POST` with `on_conflict` and
//! a `Prefer: resolution=...` header. The service-role key authenticates
//! every request.

use crate::config::RemoteConfig;
use crate::error::{StorageError, StorageResult};
use crate::record::{LicenseRecord, TrialRecord, UserRecord};
use crate::store::LicenseStore;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const USERS: &str = "users";
const TRIALS: &str = "trials";
const LICENSES: &str = "licenses";

/// How a conflicting row is handled on insert.
#[derive(Debug, Clone, Copy)]
enum Conflict {
    /// Replace the existing row.
    Merge,
    /// Keep the existing row untouched.
    Ignore,
}

impl Conflict {
    fn prefer_header(self) -> &'static str {
        match self {
            Self::Merge => "resolution=merge-duplicates,return=minimal",
            Self::Ignore => "resolution=ignore-duplicates,return=minimal",
        }
    }
}

/// Error body returned by PostgREST.
#[derive(Debug, serde::Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// [`LicenseStore`] backed by a managed relational service.
pub struct RemoteStore {
    base_url: String,
    service_role_key: String,
    client: Client,
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RemoteStore {
    /// Creates a client for the configured service.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Config`] if the url or key is empty, or if the
    /// HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> StorageResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorageError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            service_role_key: config.service_role_key.clone(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Fetches at most one row where `column` equals `value`.
    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> StorageResult<Option<T>> {
        let filter = format!("eq.{value}");
        let response = self
            .client
            .get(self.table_url(table))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .query(&[(column, filter.as_str()), ("select", "*"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| StorageError::Network(format!("{table} lookup failed: {e}")))?;

        let response = check_status(table, response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| StorageError::Network(format!("{table} lookup failed: {e}")))?;
        let mut rows: Vec<T> = serde_json::from_str(&body)?;

        debug!("{} lookup on {} returned {} row(s)", table, column, rows.len());
        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    async fn upsert<T: Serialize + Sync>(
        &self,
        table: &str,
        conflict_column: &str,
        conflict: Conflict,
        row: &T,
    ) -> StorageResult<()> {
        let response = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Prefer", conflict.prefer_header())
            .query(&[("on_conflict", conflict_column)])
            .json(row)
            .send()
            .await
            .map_err(|e| StorageError::Network(format!("{table} upsert failed: {e}")))?;

        check_status(table, response).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into [`StorageError::Backend`] with the
/// backend's message.
async fn check_status(table: &str, response: Response) -> StorageResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("{table} request failed with status {status}")
            } else {
                body
            }
        });

    warn!("{} request rejected ({}): {}", table, status, message);
    Err(StorageError::Backend(message))
}

#[async_trait]
impl LicenseStore for RemoteStore {
    fn backend_name(&self) -> &'static str {
        "remote"
    }

    async fn ensure_user(&self, user: &UserRecord) -> StorageResult<()> {
        self.upsert(USERS, "email", Conflict::Ignore, user).await
    }

    async fn find_user(&self, email: &str) -> StorageResult<Option<UserRecord>> {
        self.select_one(USERS, "email", email).await
    }

    async fn find_trial(&self, email: &str) -> StorageResult<Option<TrialRecord>> {
        self.select_one(TRIALS, "email", email).await
    }

    async fn upsert_trial(&self, trial: &TrialRecord) -> StorageResult<()> {
        self.upsert(TRIALS, "email", Conflict::Merge, trial).await
    }

    async fn find_license(&self, license_key: &str) -> StorageResult<Option<LicenseRecord>> {
        self.select_one(LICENSES, "license_key", license_key).await
    }

    async fn upsert_license(&self, license: &LicenseRecord) -> StorageResult<()> {
        self.upsert(LICENSES, "license_key", Conflict::Merge, license)
            .await
    }
}
