/// Persistent settings store
///
/// Small key-value stores the volume controller writes its settings through.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::StoreError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Store that forgets everything when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a pretty-printed JSON object on disk.
///
/// The whole file is rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl JsonFileStore {
    /// Default settings file in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("soundstage").join("settings.json"))
    }

    /// Open the store, starting empty if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if !path.exists() {
            tracing::debug!("No settings found at {}, starting fresh", path.display());
            return Ok(Self {
                path,
                values: BTreeMap::new(),
            });
        }

        let load_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            StoreError::LoadFailed {
                path: path.display().to_string(),
                source,
            }
        };
        let json = std::fs::read_to_string(&path).map_err(|e| load_failed(Box::new(e)))?;
        let values: BTreeMap<String, Value> =
            serde_json::from_str(&json).map_err(|e| load_failed(Box::new(e)))?;

        tracing::debug!("Loaded settings from: {}", path.display());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        let save_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            StoreError::SaveFailed {
                path: self.path.display().to_string(),
                source,
            }
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(Box::new(e)))?;
        }

        let json = serde_json::to_string_pretty(&self.values).map_err(|e| save_failed(Box::new(e)))?;
        std::fs::write(&self.path, json).map_err(|e| save_failed(Box::new(e)))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.save()
    }
}
