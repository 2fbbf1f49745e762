//! Access status and operation outcomes.

use chrono::{DateTime, Duration, Utc};
use keygate_storage::TrialRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a trial in days.
pub const TRIAL_DAYS: i64 = 14;

/// Length of a trial.
#[must_use]
pub fn trial_duration() -> Duration {
    Duration::days(TRIAL_DAYS)
}

/// The access status reported for an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessStatus {
    /// Within the trial window.
    Trial,
    /// The trial window has passed.
    Expired,
    /// A valid license was presented.
    Active,
    /// Neither a trial nor a matching license exists.
    Inactive,
    /// The request itself was unusable (no email).
    Invalid,
}

impl AccessStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Expired => "expired",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`crate::LicensingService::start_trial`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialGrant {
    /// `Trial` or `Expired`.
    pub status: AccessStatus,
    pub expires_at: DateTime<Utc>,
    pub message: &'static str,
}

impl TrialGrant {
    pub(crate) fn started(expires_at: DateTime<Utc>) -> Self {
        Self {
            status: AccessStatus::Trial,
            expires_at,
            message: "Trial started",
        }
    }

    /// Reports an existing trial without touching it.
    pub(crate) fn existing(trial: &TrialRecord, now: DateTime<Utc>) -> Self {
        let expires_at = trial.expires_at;
        if trial.is_active_at(now) {
            Self {
                status: AccessStatus::Trial,
                expires_at,
                message: "Trial already active",
            }
        } else {
            Self {
                status: AccessStatus::Expired,
                expires_at,
                message: "Trial expired",
            }
        }
    }
}

/// Outcome of [`crate::LicensingService::activate_license`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub license_key: String,
    /// Always `Active`.
    pub status: AccessStatus,
    /// Always `None`; issued licenses do not expire.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Outcome of [`crate::LicensingService::verify_license`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub status: AccessStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    /// Set only when a presented license was accepted.
    pub license_key: Option<String>,
}

impl Verification {
    pub(crate) fn licensed(license_key: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            status: AccessStatus::Active,
            expires_at,
            reason: None,
            license_key: Some(license_key),
        }
    }

    pub(crate) fn from_trial(trial: &TrialRecord, now: DateTime<Utc>) -> Self {
        let status = if trial.is_active_at(now) {
            AccessStatus::Trial
        } else {
            AccessStatus::Expired
        };
        Self {
            status,
            expires_at: Some(trial.expires_at),
            reason: None,
            license_key: None,
        }
    }

    pub(crate) fn inactive() -> Self {
        Self {
            status: AccessStatus::Inactive,
            expires_at: None,
            reason: Some("No trial or license".to_string()),
            license_key: None,
        }
    }
}
