//! Persistence gate and JSON codec.
//!
//! [`JsonFile`] is the single choke point for disk access: operations load
//! the whole collection through it before doing anything and rewrite the
//! whole collection through it after a mutation. No operation reads or
//! writes a partial file.
//!
//! Writes go through a temp-file-then-rename cycle in the same directory,
//! so a crash mid-write leaves the previous collection intact.
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use super::error::{BuildError, StoreError};

/// Handle on the backing JSON file.
pub(crate) struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Opens the backing file, creating it first when requested. A created
    /// file is zero-length, which loads as the empty collection.
    pub(crate) fn open(path: PathBuf, create_if_missing: bool) -> Result<Self, BuildError> {
        if create_if_missing && !path.exists() {
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                return Err(BuildError::NotJsonFile { path });
            }
            File::create_new(&path).map_err(|source| BuildError::FileCreation {
                path: path.clone(),
                source,
            })?;
            info!("created store file {path:?}");
        }

        if !path.exists() {
            return Err(BuildError::StoreNotFound { path });
        }

        Ok(Self { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole collection. A zero-length file is the empty
    /// collection.
    pub(crate) fn load<T: DeserializeOwned>(
        &self,
        operation: &'static str,
    ) -> Result<Vec<T>, StoreError> {
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::StoreNotFound {
                path: self.path.clone(),
            },
            _ => StoreError::Codec {
                operation,
                cause: e.into(),
            },
        })?;

        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<T> = serde_json::from_slice(&bytes).map_err(|e| StoreError::Codec {
            operation,
            cause: e.into(),
        })?;
        debug!("[{operation}] loaded {} records", records.len());
        Ok(records)
    }

    /// Rewrites the whole collection, replacing the file atomically.
    pub(crate) fn save<T: Serialize>(
        &self,
        operation: &'static str,
        records: &[T],
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(records).map_err(|e| StoreError::Codec {
            operation,
            cause: e.into(),
        })?;

        let staged = self.path.with_extension("json.tmp");
        fs::write(&staged, &bytes).map_err(|e| StoreError::Codec {
            operation,
            cause: e.into(),
        })?;
        fs::rename(&staged, &self.path).map_err(|e| StoreError::Codec {
            operation,
            cause: e.into(),
        })?;
        debug!("[{operation}] wrote {} records", records.len());
        Ok(())
    }
}

/// Record to generic field tree, for by-name access and partial updates.
pub(crate) fn to_tree<T: Serialize>(
    operation: &'static str,
    record: &T,
) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(tree)) => Ok(tree),
        Ok(_) => Err(StoreError::Codec {
            operation,
            cause: super::error::CodecError::NotAnObject,
        }),
        Err(e) => Err(StoreError::Codec {
            operation,
            cause: e.into(),
        }),
    }
}

/// Field tree back to a typed record.
pub(crate) fn from_tree<T: DeserializeOwned>(
    operation: &'static str,
    tree: Map<String, Value>,
) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(tree)).map_err(|e| StoreError::Codec {
        operation,
        cause: e.into(),
    })
}
