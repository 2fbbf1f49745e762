//! Trial issuance, license activation and license verification.
//!
//! The [`LicensingService`] exposes three operations over an injected
//! [`keygate_storage::LicenseStore`]:
//!
//! - [`LicensingService::start_trial`]: a one-time, non-renewable 14-day trial per email
//! - [`LicensingService::activate_license`]: issue (or overwrite) an active license
//! - [`LicensingService::verify_license`]: resolve the current access status
//!
//! # Status model
//!
//! Per normalized email, a trial moves from `trial` to `expired` purely with
//! time. A license activated at any point dominates verification whenever
//! it is presented with a matching email. Nothing is ever revoked or deleted.
//!
//! # License Key Format
//!
//! Generated keys are opaque bearer tokens: 16 hex characters, a hyphen, and
//! 8 more hex characters (e.g. `3f9a0c1b2d4e5f60-a1b2c3d4`). Caller-supplied
//! keys are stored verbatim.

mod clock;
mod email;
mod error;
mod key;
mod service;
mod status;

pub use clock::{Clock, ManualClock, SystemClock};
pub use email::normalize_email;
pub use error::{LicenseError, LicenseResult};
pub use key::generate_license_key;
pub use service::LicensingService;
pub use status::{AccessStatus, Activation, TRIAL_DAYS, TrialGrant, Verification, trial_duration};
