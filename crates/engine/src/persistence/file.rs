//! JSON file store. Each key becomes one `<key>.json` document inside a
//! directory the adapter owns.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::ports::{CharacterStore, StoreError};

#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens (creating if needed) the directory the documents live in.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CharacterStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, payload: &[u8]) -> Result<(), StoreError> {
        // Write-then-rename so a crash mid-write never truncates the
        // previous document.
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, self.path_for(key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_bytes_through_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(store.get("doc").unwrap().is_none());
        store.set("doc", br#"{"a":1}"#).unwrap();
        store.set("doc", br#"{"a":2}"#).unwrap();
        assert_eq!(store.get("doc").unwrap().as_deref(), Some(&br#"{"a":2}"#[..]));
    }
}
