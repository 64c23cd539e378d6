//! Flat-file persistence for one repository.
//!
//! A repository directory holds:
//! - the teacher list (CSV, see [`record_store`])
//! - an optional blacklist (one guid per line, see [`blacklist`])
//! - a zero-byte marker token

pub mod atomic;
pub mod blacklist;
pub mod record_store;

pub use blacklist::Blacklist;
pub use record_store::RecordStore;
