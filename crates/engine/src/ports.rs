//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine: a synchronous key-value
//! store holding the persisted character document, and an async remote
//! sync endpoint. Adapters live in `persistence` and `sync`.

use async_trait::async_trait;

use hexbound_domain::CharacterRecord;

// ============================================================================
// Character store
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

/// Key-value persistence for the character document. One well-known key
/// maps to one JSON payload.
pub trait CharacterStore: Send + Sync {
    /// Returns the payload stored under `key`, or `None` when nothing has
    /// been saved yet.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes `payload` under `key`, replacing any previous value.
    fn set(&self, key: &str, payload: &[u8]) -> Result<(), StoreError>;
}

// ============================================================================
// Remote sync
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Acknowledgement for a remote save. Failures are data, never panics.
#[derive(Debug, Clone)]
pub struct SyncAck {
    pub ok: bool,
    pub message: String,
}

/// Result of a remote load. `record` is present only when `ok`.
#[derive(Debug, Clone)]
pub struct SyncLoad {
    pub ok: bool,
    pub record: Option<CharacterRecord>,
    pub message: String,
}

/// Remote copy of the character document, keyed by character id.
#[async_trait]
pub trait RemoteSync: Send + Sync {
    async fn save(&self, record: &CharacterRecord) -> SyncAck;

    async fn load(&self, character_id: &str) -> SyncLoad;
}
