//! Store adapters for the [`CharacterStore`] port.
//!
//! [`CharacterStore`]: crate::ports::CharacterStore

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
