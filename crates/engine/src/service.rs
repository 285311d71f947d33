//! The character service.
//!
//! Single owning context for one character: holds the rule tables and the
//! latest record, and funnels every mutation through the same pipeline -
//! mutate, re-sync class features, derive, persist. Consumers read the
//! record; they never mutate it directly.

use std::collections::BTreeMap;

use hexbound_domain::appliers::{apply_background, apply_race};
use hexbound_domain::attribution::strip_source;
use hexbound_domain::class_features::{
    list_class_choices, set_class_choice, sync_class_features, ClassChoiceView,
};
use hexbound_domain::rest::{long_rest, short_rest, RestMode};
use hexbound_domain::spellcasting::{self, SpellSlotsView};
use hexbound_domain::value_objects::{DieSize, SourceTag};
use hexbound_domain::{
    derive, undo_last_level_up, CharacterRecord, DomainError, LevelUpWizard, RuleTables,
    CHAR_STORAGE_KEY,
};

use crate::ports::{CharacterStore, RemoteSync, StoreError, SyncAck, SyncLoad};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CharacterService<S: CharacterStore> {
    store: S,
    tables: RuleTables,
    key: String,
    record: CharacterRecord,
}

impl<S: CharacterStore> CharacterService<S> {
    /// Loads the record from the store. A missing key or unreadable payload
    /// falls back to a fresh default; partial JSON deep-merges over the
    /// default shape via serde defaults. The result is always re-synced
    /// and re-derived before use.
    pub fn load(store: S, tables: RuleTables) -> Result<Self, ServiceError> {
        let record = match store.get(CHAR_STORAGE_KEY)? {
            Some(bytes) => match serde_json::from_slice::<CharacterRecord>(&bytes) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(error = %e, "stored character unreadable, starting fresh");
                    CharacterRecord::default()
                }
            },
            None => {
                tracing::debug!("no stored character, starting fresh");
                CharacterRecord::default()
            }
        };
        let record = derive(record, &tables);
        let record = derive(sync_class_features(record, &tables), &tables);
        tracing::debug!(character = %record.id, level = record.level, "character loaded");
        Ok(Self {
            store,
            tables,
            key: CHAR_STORAGE_KEY.to_string(),
            record,
        })
    }

    pub fn record(&self) -> &CharacterRecord {
        &self.record
    }

    pub fn tables(&self) -> &RuleTables {
        &self.tables
    }

    /// Applies a free-form edit (name, abilities, notes, manual skills...)
    /// and runs it through the normal pipeline.
    pub fn edit(&mut self, f: impl FnOnce(&mut CharacterRecord)) -> Result<(), ServiceError> {
        f(&mut self.record);
        self.persist()
    }

    // ------------------------------------------------------------------
    // Origin selections
    // ------------------------------------------------------------------

    /// Selects (or with `None` clears) the background. Previous background
    /// grants are stripped before the new ones apply.
    pub fn select_background(&mut self, id: Option<&str>) -> Result<(), ServiceError> {
        let background = match id {
            Some(id) => Some(
                self.tables
                    .background(id)
                    .ok_or_else(|| DomainError::validation("Unknown background."))?
                    .clone(),
            ),
            None => None,
        };
        let record = std::mem::take(&mut self.record);
        let record = strip_source(record, SourceTag::Background);
        self.record = apply_background(record, background.as_ref());
        self.persist()
    }

    /// Selects (or clears) the race. Ability bonuses from the previous
    /// race are reversed exactly before the new ones apply.
    pub fn select_race(&mut self, id: Option<&str>) -> Result<(), ServiceError> {
        let race = match id {
            Some(id) => Some(
                self.tables
                    .race(id)
                    .ok_or_else(|| DomainError::validation("Unknown race."))?
                    .clone(),
            ),
            None => None,
        };
        let record = std::mem::take(&mut self.record);
        self.record = apply_race(record, race.as_ref());
        self.persist()
    }

    // ------------------------------------------------------------------
    // Class features
    // ------------------------------------------------------------------

    /// Choices the current class level has unlocked, with selections.
    pub fn class_choices(&self) -> Vec<ClassChoiceView> {
        list_class_choices(&self.record, &self.tables)
    }

    /// Records a selection for a class choice; the re-sync materializes
    /// the chosen options as features.
    pub fn choose(&mut self, choice_key: &str, option_ids: &[String]) -> Result<(), ServiceError> {
        let record = std::mem::take(&mut self.record);
        self.record = set_class_choice(record, choice_key, option_ids);
        self.persist()
    }

    // ------------------------------------------------------------------
    // Level up
    // ------------------------------------------------------------------

    /// Starts a level-up wizard against the current record.
    pub fn begin_level_up(&self) -> Result<LevelUpWizard, ServiceError> {
        Ok(LevelUpWizard::begin(&self.record, &self.tables)?)
    }

    /// Validates and applies a completed wizard atomically.
    pub fn commit_level_up(&mut self, wizard: &LevelUpWizard) -> Result<(), ServiceError> {
        let committed = wizard.commit(self.record.clone(), &self.tables)?;
        self.record = committed;
        tracing::info!(
            character = %self.record.id,
            level = self.record.level,
            "level up committed"
        );
        self.persist()
    }

    /// Reverses the most recent level-up exactly.
    pub fn undo_level_up(&mut self) -> Result<(), ServiceError> {
        let reverted = undo_last_level_up(self.record.clone(), &self.tables)?;
        self.record = reverted;
        tracing::info!(
            character = %self.record.id,
            level = self.record.level,
            "level up undone"
        );
        self.persist()
    }

    // ------------------------------------------------------------------
    // Rests and resources
    // ------------------------------------------------------------------

    /// Spends hit dice on a short rest. `roll` receives a die's face count
    /// and returns a roll in `1..=faces`; it is only consulted in
    /// [`RestMode::Roll`].
    pub fn take_short_rest(
        &mut self,
        spend: &BTreeMap<DieSize, i32>,
        mode: RestMode,
        roll: impl FnMut(i32) -> i32,
    ) -> Result<(), ServiceError> {
        let record = std::mem::take(&mut self.record);
        self.record = short_rest(record, spend, mode, &self.tables, roll);
        self.persist()
    }

    pub fn take_long_rest(&mut self) -> Result<(), ServiceError> {
        let record = std::mem::take(&mut self.record);
        self.record = long_rest(record, &self.tables);
        self.persist()
    }

    /// Current slot availability from the rule tables.
    pub fn spell_slots(&self) -> SpellSlotsView {
        spellcasting::spell_slots(&self.record, &self.tables)
    }

    /// Marks one pact slot as used. Returns whether a slot was available;
    /// at the table maximum this is a no-op.
    pub fn cast_pact_slot(&mut self) -> Result<bool, ServiceError> {
        let max = self
            .spell_slots()
            .pact_magic
            .map(|p| p.slots)
            .unwrap_or(0);
        if self.record.resources.pact_slots_used >= max {
            return Ok(false);
        }
        self.record.resources.pact_slots_used += 1;
        self.persist()?;
        Ok(true)
    }

    /// Marks one shared-progression slot of `level` as used.
    pub fn use_spell_slot(&mut self, level: u8) -> Result<bool, ServiceError> {
        let max = self
            .spell_slots()
            .spellcasting_slots
            .get(&level)
            .copied()
            .unwrap_or(0);
        let used = self
            .record
            .resources
            .spell_slots_used
            .entry(level)
            .or_insert(0);
        if *used >= max {
            return Ok(false);
        }
        *used += 1;
        self.persist()?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Remote sync
    // ------------------------------------------------------------------

    /// Pushes the current record to the remote. The ack reports failure;
    /// local state is already persisted either way.
    pub async fn save_remote(&self, remote: &dyn RemoteSync) -> SyncAck {
        remote.save(&self.record).await
    }

    /// Pulls the record from the remote. A failed load leaves the local
    /// record untouched; a successful one replaces it through the normal
    /// pipeline.
    pub async fn load_remote(&mut self, remote: &dyn RemoteSync) -> Result<SyncLoad, ServiceError> {
        let outcome = remote.load(&self.record.id).await;
        if let Some(record) = outcome.record.clone().filter(|_| outcome.ok) {
            self.record = derive(record, &self.tables);
            self.persist()?;
            tracing::info!(character = %self.record.id, "remote record adopted");
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------

    /// Save pipeline: class features re-synced, record re-derived, JSON
    /// written to the store.
    fn persist(&mut self) -> Result<(), ServiceError> {
        let record = std::mem::take(&mut self.record);
        let record = sync_class_features(record, &self.tables);
        self.record = derive(record, &self.tables);
        let payload = serde_json::to_vec(&self.record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.set(&self.key, &payload)?;
        tracing::debug!(character = %self.record.id, bytes = payload.len(), "character saved");
        Ok(())
    }
}
