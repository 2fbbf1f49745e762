//! The licensing state machine over an injected store.
//!
//! Calls for the same email are not coordinated. Two concurrent
//! `start_trial` calls for a new email may both miss the existing-trial
//! check and both write; the store's upsert keeps whichever lands last.

use crate::clock::{Clock, SystemClock};
use crate::email::normalize_email;
use crate::error::{LicenseError, LicenseResult};
use crate::key::generate_license_key;
use crate::status::{AccessStatus, Activation, TrialGrant, Verification, trial_duration};
use keygate_storage::{LicenseRecord, LicenseStore, TrialRecord, UserRecord};
use std::sync::Arc;
use tracing::{debug, info};

/// Trial, activation and verification over a [`LicenseStore`].
#[derive(Clone)]
pub struct LicensingService {
    store: Arc<dyn LicenseStore>,
    clock: Arc<dyn Clock>,
}

impl LicensingService {
    /// Creates a service reading wall-clock time.
    #[must_use]
    pub fn new(store: Arc<dyn LicenseStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(store: Arc<dyn LicenseStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Name of the backing store, for logs.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Starts a 14-day trial, or reports the existing one unchanged.
    ///
    /// # Errors
    ///
    /// [`LicenseError::Validation`] if the email is empty after
    /// normalization, [`LicenseError::Backend`] if the store fails.
    pub async fn start_trial(&self, email: &str) -> LicenseResult<TrialGrant> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(LicenseError::email_required());
        }

        let now = self.clock.now();
        if let Some(existing) = self.store.find_trial(&email).await? {
            debug!("Trial already exists for {}", email);
            return Ok(TrialGrant::existing(&existing, now));
        }

        let expires_at = now + trial_duration();
        self.store.ensure_user(&UserRecord::new(&email, now)).await?;
        self.store
            .upsert_trial(&TrialRecord {
                email: email.clone(),
                started_at: now,
                expires_at,
            })
            .await?;

        info!("Trial started for {} (expires {})", email, expires_at);
        Ok(TrialGrant::started(expires_at))
    }

    /// Issues an active, non-expiring license.
    ///
    /// Uses `provided_key` when it is non-empty, otherwise generates one. An
    /// existing license under the same key is overwritten.
    ///
    /// # Errors
    ///
    /// [`LicenseError::Validation`] if the email is empty after
    /// normalization, [`LicenseError::Backend`] if the store fails.
    pub async fn activate_license(
        &self,
        email: &str,
        provided_key: Option<&str>,
    ) -> LicenseResult<Activation> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(LicenseError::email_required());
        }

        let now = self.clock.now();
        let license_key = match provided_key.filter(|k| !k.is_empty()) {
            Some(key) => key.to_string(),
            None => generate_license_key(),
        };

        self.store.ensure_user(&UserRecord::new(&email, now)).await?;
        self.store
            .upsert_license(&LicenseRecord::active(&license_key, &email, now))
            .await?;

        info!("License activated for {}", email);
        Ok(Activation {
            license_key,
            status: AccessStatus::Active,
            expires_at: None,
        })
    }

    /// Resolves the access status for an email. Performs no writes.
    ///
    /// A presented license wins when it exists, belongs to this email, is
    /// active and has not expired. Otherwise the trial decides, and with no
    /// trial the status is `Inactive`.
    ///
    /// # Errors
    ///
    /// [`LicenseError::Validation`] if the email is empty after
    /// normalization, [`LicenseError::Backend`] if the store fails.
    pub async fn verify_license(
        &self,
        email: &str,
        license_key: Option<&str>,
    ) -> LicenseResult<Verification> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(LicenseError::email_required());
        }

        let now = self.clock.now();

        if let Some(key) = license_key.filter(|k| !k.is_empty()) {
            match self.store.find_license(key).await? {
                Some(lic) if lic.email == email && lic.is_valid_at(now) => {
                    debug!("License accepted for {}", email);
                    return Ok(Verification::licensed(lic.license_key, lic.expires_at));
                }
                Some(_) => debug!("License presented for {} does not apply", email),
                None => debug!("Unknown license key presented for {}", email),
            }
        }

        match self.store.find_trial(&email).await? {
            Some(trial) => Ok(Verification::from_trial(&trial, now)),
            None => {
                debug!("No trial or license for {}", email);
                Ok(Verification::inactive())
            }
        }
    }
}
