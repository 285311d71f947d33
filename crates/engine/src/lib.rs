//! Hexbound engine library.
//!
//! Thin collaborator layer around the pure rules core in
//! `hexbound-domain`:
//!
//! - `ports` - trait boundaries for persistence and remote sync
//! - `persistence` - in-memory and JSON-file store adapters
//! - `sync` - HTTP remote-sync adapter
//! - `service` - the `CharacterService` owning the live record

pub mod persistence;
pub mod ports;
pub mod service;
pub mod sync;

pub use service::{CharacterService, ServiceError};
