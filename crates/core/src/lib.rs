//! bbst core library.
//!
//! Roster management for teacher accounts: flat-file repositories holding a
//! teacher list and a blacklist, credential derivation from names, parsing of
//! the school administration export, reconciliation with operator decisions,
//! and export of the roster for downstream systems.

pub mod admin_export;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod export;
pub mod models;
pub mod reconcile;
pub mod repository;
pub mod store;

// Re-exports for convenience.
pub use config::AppConfig;
pub use credentials::CredentialGenerator;
pub use errors::CoreError;
pub use models::{GuidMatch, Teacher};
pub use reconcile::{Decider, Decision};
pub use repository::{Amendment, RepositoryManager, UpdateReport};
pub use store::{Blacklist, RecordStore};
