//! Character rules core.
//!
//! Pure domain logic for a 5e (2014) character sheet: the persisted record,
//! derived numbers, data-driven effects, source attribution, class feature
//! sync, rests, spellcasting limits, and the transactional level-up wizard
//! with exact undo. No I/O and no randomness; dice rolls are injected as
//! closures by callers.

pub mod appliers;
pub mod attribution;
pub mod character;
pub mod class_features;
pub mod derive;
pub mod effects;
pub mod error;
pub mod level_up;
pub mod rest;
pub mod rules;
pub mod spellcasting;
pub mod value_objects;

pub use character::{CharacterRecord, CHAR_STORAGE_KEY, RECORD_VERSION};
pub use derive::derive;
pub use error::DomainError;
pub use level_up::{undo_last_level_up, LevelUpWizard};
pub use rules::RuleTables;
