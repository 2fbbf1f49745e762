//! Backend selection, resolved once at startup.

use crate::error::{StorageError, StorageResult};
use crate::memory::MemoryStore;
use crate::remote::RemoteStore;
use crate::store::LicenseStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Which backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Connection parameters for [`RemoteStore`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the service (e.g. `https://project.supabase.co`).
    pub url: String,
    /// Service-role key used for both the `apikey` and bearer headers.
    pub service_role_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_role_key: String::new(),
            timeout_secs: 30,
        }
    }
}

// The key is a secret; keep it out of logs.
impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("service_role_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl RemoteConfig {
    pub(crate) fn validate(&self) -> StorageResult<()> {
        if self.url.trim().is_empty() {
            return Err(StorageError::Config("remote backend requires a url".into()));
        }
        if self.service_role_key.trim().is_empty() {
            return Err(StorageError::Config(
                "remote backend requires a service role key".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(StorageError::Config("timeout must be at least one second".into()));
        }
        Ok(())
    }
}

/// Backend configuration injected at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum BackendConfig {
    #[default]
    Memory,
    Remote(RemoteConfig),
}

impl BackendConfig {
    /// Picks a backend from startup inputs.
    ///
    /// An explicit `kind` always wins. Without one, the remote backend is
    /// chosen when both `url` and `service_role_key` are present, and the
    /// memory backend otherwise.
    #[must_use]
    pub fn resolve(
        kind: Option<BackendKind>,
        url: Option<String>,
        service_role_key: Option<String>,
        timeout_secs: u64,
    ) -> Self {
        let url = url.filter(|u| !u.trim().is_empty());
        let key = service_role_key.filter(|k| !k.trim().is_empty());

        let kind = kind.unwrap_or(if url.is_some() && key.is_some() {
            BackendKind::Remote
        } else {
            BackendKind::Memory
        });

        match kind {
            BackendKind::Memory => Self::Memory,
            BackendKind::Remote => Self::Remote(RemoteConfig {
                url: url.unwrap_or_default(),
                service_role_key: key.unwrap_or_default(),
                timeout_secs,
            }),
        }
    }

    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Memory => BackendKind::Memory,
            Self::Remote(_) => BackendKind::Remote,
        }
    }
}

/// Builds the store described by `config`.
///
/// # Errors
///
/// Returns [`StorageError::Config`] if a remote backend is missing its url
/// or key.
pub fn open_store(config: &BackendConfig) -> StorageResult<Arc<dyn LicenseStore>> {
    let store: Arc<dyn LicenseStore> = match config {
        BackendConfig::Memory => Arc::new(MemoryStore::new()),
        BackendConfig::Remote(remote) => Arc::new(RemoteStore::new(remote)?),
    };
    info!("Opened {} license store", store.backend_name());
    Ok(store)
}
