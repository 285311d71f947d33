//! HTTP adapter for the [`RemoteSync`] port.
//!
//! Talks to a plain document endpoint: `PUT {base}/characters/{id}` to
//! save, `GET {base}/characters/{id}` to load. Every failure is folded
//! into the outcome object; callers decide what to do with a bad sync.

use async_trait::async_trait;

use hexbound_domain::CharacterRecord;

use crate::ports::{RemoteSync, SyncAck, SyncError, SyncLoad};

pub struct HttpRemoteSync {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteSync {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn character_url(&self, id: &str) -> String {
        format!("{}/characters/{}", self.base_url, id)
    }

    async fn put_record(&self, record: &CharacterRecord) -> Result<(), SyncError> {
        self.client
            .put(self.character_url(&record.id))
            .json(record)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn get_record(&self, id: &str) -> Result<CharacterRecord, SyncError> {
        let record = self
            .client
            .get(self.character_url(id))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(record)
    }
}

#[async_trait]
impl RemoteSync for HttpRemoteSync {
    async fn save(&self, record: &CharacterRecord) -> SyncAck {
        match self.put_record(record).await {
            Ok(()) => SyncAck {
                ok: true,
                message: "Synced.".into(),
            },
            Err(e) => {
                tracing::warn!(error = %e, character = %record.id, "remote save failed");
                SyncAck {
                    ok: false,
                    message: format!("Sync failed: {e}"),
                }
            }
        }
    }

    async fn load(&self, character_id: &str) -> SyncLoad {
        match self.get_record(character_id).await {
            Ok(record) => SyncLoad {
                ok: true,
                record: Some(record),
                message: "Loaded.".into(),
            },
            Err(e) => {
                tracing::warn!(error = %e, character = %character_id, "remote load failed");
                SyncLoad {
                    ok: false,
                    record: None,
                    message: format!("Load failed: {e}"),
                }
            }
        }
    }
}
