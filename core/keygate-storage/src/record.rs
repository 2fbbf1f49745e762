//! Row types for the `users`, `trials` and `licenses` tables.
//!
//! Field names match the column names of the relational schema, so the
//! same structs serialize straight into REST payloads. Timestamps are
//! stored as ISO-8601 strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A known customer, keyed by normalized email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    #[must_use]
    pub fn new(email: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            created_at,
        }
    }
}

/// A time-boxed trial, keyed by normalized email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub email: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TrialRecord {
    /// Returns true while `now` is strictly before the expiry.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Stored state of a license row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseState {
    /// Issued and usable.
    Active,
    /// Anything else found in the table. Never written by the service.
    #[serde(other)]
    Inactive,
}

/// An issued license, keyed by license key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub license_key: String,
    pub email: String,
    pub status: LicenseState,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl LicenseRecord {
    /// An active, non-expiring license.
    #[must_use]
    pub fn active(
        license_key: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            license_key: license_key.into(),
            email: email.into(),
            status: LicenseState::Active,
            created_at,
            expires_at: None,
        }
    }

    /// Returns true if the license is active and has not reached its expiry.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.status == LicenseState::Active && self.expires_at.is_none_or(|exp| now < exp)
    }
}
