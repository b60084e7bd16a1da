use std::{
    fmt::Debug,
    fs, io,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use tracing::debug;

use crate::{error::StoreError, model::Place};

/// Holds at most one selected place. Writes replace the whole record.
///
/// Callers check [`PlaceStore::has`] before [`PlaceStore::load`].
pub trait PlaceStore: Send + Sync + Debug {
    fn save(&self, place: &Place) -> Result<(), StoreError>;
    fn load(&self) -> Result<Place, StoreError>;
    fn has(&self) -> bool;
}

/// Keeps the place as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FilePlaceStore {
    path: PathBuf,
}

impl FilePlaceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io { path: self.path.display().to_string(), source }
    }
}

impl PlaceStore for FilePlaceStore {
    fn save(&self, place: &Place) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = encode(place)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), place = %place.name, "saved selected place");
        Ok(())
    }

    fn load(&self) -> Result<Place, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StoreError::NotSaved),
            Err(e) => return Err(self.io_error(e)),
        };

        decode(&json)
    }

    fn has(&self) -> bool {
        self.path.is_file()
    }
}

/// Keeps the serialized record in memory.
#[derive(Debug, Default)]
pub struct MemoryPlaceStore {
    record: Mutex<Option<String>>,
}

impl PlaceStore for MemoryPlaceStore {
    fn save(&self, place: &Place) -> Result<(), StoreError> {
        let json = encode(place)?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(json);
        Ok(())
    }

    fn load(&self) -> Result<Place, StoreError> {
        let record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        let json = record.as_deref().ok_or(StoreError::NotSaved)?;
        decode(json)
    }

    fn has(&self) -> bool {
        self.record.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

fn encode(place: &Place) -> Result<String, StoreError> {
    serde_json::to_string(place).map_err(StoreError::Encode)
}

fn decode(json: &str) -> Result<Place, StoreError> {
    serde_json::from_str(json).map_err(StoreError::Decode)
}
