/// User-scoped key-value storage: a single JSON object on disk,
/// rewritten on every change.
pub mod models;

use log::{debug, error};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::{
  fs,
  path::{Path, PathBuf},
  sync::RwLock,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("storage i/o error: {0}")]
  Io(#[from] std::io::Error),
  #[error("storage encoding error: {0}")]
  Json(#[from] serde_json::Error),
  #[error("storage file {0} does not hold a JSON object")]
  NotAnObject(String),
}

#[derive(Debug, Default)]
pub struct KeyValueStore {
  path: Option<PathBuf>,
  values: RwLock<Map<String, Value>>,
}

impl KeyValueStore {
  /// Store that lives only as long as the process
  pub fn in_memory() -> Self {
    Default::default()
  }

  pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let path = path.as_ref().to_path_buf();
    let values = if path.exists() {
      let raw = fs::read_to_string(&path)?;
      if raw.trim().is_empty() {
        Map::new()
      } else {
        match serde_json::from_str::<Value>(&raw)? {
          Value::Object(map) => map,
          _ => return Err(StoreError::NotAnObject(path.display().to_string())),
        }
      }
    } else {
      Map::new()
    };
    debug!("opened storage {} with {} keys", path.display(), values.len());
    Ok(Self {
      path: Some(path),
      values: RwLock::new(values),
    })
  }

  /// Opens the store; if the file is unreadable the process keeps going
  /// with an empty store that will overwrite it on the next change.
  pub fn open_or_empty(path: impl AsRef<Path>) -> Self {
    let path = path.as_ref();
    match Self::open(path) {
      Ok(store) => store,
      Err(err) => {
        error!("error opening storage {}: {err}, starting empty", path.display());
        Self {
          path: Some(path.to_path_buf()),
          values: Default::default(),
        }
      }
    }
  }

  pub fn get_raw(&self, key: &str) -> Option<Value> {
    let values = self.values.read().unwrap_or_else(|e| e.into_inner());
    values.get(key).cloned()
  }

  /// Typed read, a value of the wrong shape reads as absent
  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    let raw = self.get_raw(key)?;
    match serde_json::from_value(raw) {
      Ok(value) => Some(value),
      Err(err) => {
        debug!("ignoring stored {key}: {err}");
        None
      }
    }
  }

  pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
    let value = serde_json::to_value(value)?;
    let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
    values.insert(key.to_owned(), value);
    self.persist(&values)
  }

  pub fn remove(&self, key: &str) -> Result<(), StoreError> {
    let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
    if values.remove(key).is_some() {
      self.persist(&values)?;
    }
    Ok(())
  }

  fn persist(&self, values: &Map<String, Value>) -> Result<(), StoreError> {
    let Some(path) = &self.path else {
      return Ok(());
    };
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
  }
}
