//! Persistence backends for Keygate licensing.
//!
//! Three logical tables back the licensing service:
//!
//! - `users`: one row per normalized email
//! - `trials`: one row per normalized email
//! - `licenses`: one row per license key
//!
//! Every backend implements [`LicenseStore`], which only offers
//! upsert-by-key and lookup-by-key. Two backends ship:
//!
//! - [`MemoryStore`] keeps everything in process memory and loses it on restart
//! - [`RemoteStore`] talks to a PostgREST-compatible relational service
//!
//! The backend is chosen once at startup from a [`BackendConfig`] and handed
//! to the service as an `Arc<dyn LicenseStore>` via [`open_store`].

mod config;
mod error;
mod memory;
mod record;
mod remote;
mod store;

pub use config::{BackendConfig, BackendKind, RemoteConfig, open_store};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use record::{LicenseRecord, LicenseState, TrialRecord, UserRecord};
pub use remote::RemoteStore;
pub use store::LicenseStore;
