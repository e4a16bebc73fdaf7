//! The record store engine.
//!
//! A [`Store`] treats a single JSON file holding an array of objects as a
//! typed collection and offers select, insert, update, and delete operations
//! over it. There is no server process and no cache: every operation reads
//! the whole collection from disk, works on the in-memory snapshot, and, if
//! it mutates, writes the whole collection back in one pass.
//!
//! # Responsibilities
//!
//! - Loading and rewriting the backing file through a single choke point
//! - Resolving fields generically by name, independent of the record type
//! - Enforcing identifier uniqueness on insert
//! - Distinguishing "not found" outcomes from structural failures
//!
//! # Example
//! ```rust
//! use brine::{FieldDef, FieldKind, Schema, Store};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Person {
//!     id: String,
//!     name: String,
//! }
//!
//! impl Schema for Person {
//!     const FIELDS: &'static [FieldDef] = &[
//!         FieldDef::new("id", FieldKind::Text),
//!         FieldDef::new("name", FieldKind::Text),
//!     ];
//! }
//!
//! let path = std::env::temp_dir().join("brine-store-doc.json");
//! # std::fs::remove_file(&path).ok();
//! let store: Store<Person> = Store::builder()
//!     .path(&path)
//!     .id_key("id")
//!     .create_if_missing(true)
//!     .build()
//!     .unwrap();
//!
//! store.insert(Person { id: "1".into(), name: "Ada".into() }).unwrap();
//! let ada = store.select_by_id("1").unwrap().unwrap();
//! assert_eq!(ada.name, "Ada");
//! # std::fs::remove_file(&path).ok();
//! ```
//!
//! # Concurrency
//!
//! Operations are synchronous and single-threaded. Two writers hitting the
//! same file from independent threads or processes can interleave their
//! read-modify-write windows and lose one writer's result; callers who need
//! concurrent writes must wrap the store in their own mutual-exclusion
//! boundary.
//!
//! # See Also
//! - [`Schema`](crate::schema::Schema): the declared field table consulted
//!   for every field-name validation.
mod delete;
mod file;
mod insert;
mod resolve;
mod select;
mod update;
mod validate;

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use log::info;

use crate::schema::{FieldKind, Record};
use error::BuildError;
use file::JsonFile;

pub mod error {
    use std::io;
    use std::path::PathBuf;

    use thiserror::Error;

    use crate::schema::FieldKind;

    /// Failures raised while building a [`Store`](super::Store).
    #[derive(Debug, Error)]
    pub enum BuildError {
        #[error("store path is not set")]
        MissingPath,

        #[error("store file {path:?} must carry a .json extension")]
        NotJsonFile { path: PathBuf },

        #[error("failed to create store file {path:?}: {source}")]
        FileCreation { path: PathBuf, source: io::Error },

        #[error("identifier field '{key}' is not declared on the record type")]
        IdentifierFieldMissing { key: String },

        #[error("identifier field '{key}' is {kind:?}; only text or numeric fields can identify a record")]
        InvalidIdentifierType { key: String, kind: FieldKind },

        #[error("store file {path:?} does not exist")]
        StoreNotFound { path: PathBuf },
    }

    /// Failures raised by store operations.
    ///
    /// "Not found" outcomes on selects, updates, and deletes are reported
    /// through empty results, `None`, or `false`, never through this enum.
    #[derive(Debug, Error)]
    pub enum StoreError {
        #[error("store file {path:?} does not exist")]
        StoreNotFound { path: PathBuf },

        #[error("[{operation}] field '{key}' is not declared on the record type")]
        UnknownField { operation: &'static str, key: String },

        #[error("[{operation}] no identifier field configured; set one with StoreBuilder::id_key")]
        IdentifierNotConfigured { operation: &'static str },

        #[error("record carries an empty value for identifier field '{key}'")]
        EmptyIdentifier { key: String },

        #[error("duplicate identifier '{id}' for field '{key}'")]
        DuplicateIdentifier { key: String, id: String },

        #[error("replacement record carries identifier '{actual}', expected '{expected}'")]
        IdentifierMismatch { expected: String, actual: String },

        #[error("{count} records share identifier '{id}'")]
        AmbiguousIdentifier { id: String, count: usize },

        #[error("record has no readable field '{key}'")]
        MissingAccessor { key: String },

        #[error("[{operation}] {cause}")]
        Codec {
            operation: &'static str,
            cause: CodecError,
        },
    }

    /// Causes behind a [`StoreError::Codec`] failure.
    #[derive(Debug, Error)]
    pub enum CodecError {
        #[error("io failure: {0}")]
        Io(#[from] io::Error),

        #[error("malformed store content: {0}")]
        Json(#[from] serde_json::Error),

        #[error("record did not serialize to a JSON object")]
        NotAnObject,
    }
}

/// An embedded record store over a single JSON file.
///
/// Construct one with [`Store::builder`]. The type parameter is the declared
/// record type; operations that take or return records are statically typed
/// to it, while field arguments are resolved by name at runtime against the
/// type's [`Schema`](crate::schema::Schema) table.
pub struct Store<T> {
    file: JsonFile,
    id_key: Option<String>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Store<T> {
    pub fn builder() -> StoreBuilder<T> {
        StoreBuilder::new()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Configuration captured once at store construction.
///
/// Only the path is required. Without an identifier field the store still
/// supports every key- and condition-based operation, but identifier-based
/// ones fail with
/// [`IdentifierNotConfigured`](error::StoreError::IdentifierNotConfigured)
/// and inserts skip uniqueness enforcement.
pub struct StoreBuilder<T> {
    path: Option<PathBuf>,
    id_key: Option<String>,
    create_if_missing: bool,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> StoreBuilder<T> {
    fn new() -> Self {
        Self {
            path: None,
            id_key: None,
            create_if_missing: false,
            _record: PhantomData,
        }
    }

    /// Sets the backing file path.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Designates the field whose value must be unique across records.
    pub fn id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = Some(key.into());
        self
    }

    /// Creates the backing file on build when it does not exist yet.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn build(self) -> Result<Store<T>, BuildError> {
        let path = self
            .path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(BuildError::MissingPath)?;

        // A blank identifier key counts as unconfigured.
        let id_key = self.id_key.filter(|key| !key.trim().is_empty());
        if let Some(key) = &id_key {
            match T::field(key) {
                None => {
                    return Err(BuildError::IdentifierFieldMissing { key: key.clone() });
                }
                Some(field) if !matches!(field.kind, FieldKind::Text | FieldKind::Number) => {
                    return Err(BuildError::InvalidIdentifierType {
                        key: key.clone(),
                        kind: field.kind,
                    });
                }
                Some(_) => {}
            }
        }

        let file = JsonFile::open(path, self.create_if_missing)?;
        info!("store ready at {:?}", file.path());

        Ok(Store {
            file,
            id_key,
            _record: PhantomData,
        })
    }
}


#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::fixtures::Person;
    use super::*;

    #[test]
    #[should_panic(expected = "MissingPath")]
    fn build_requires_a_path() {
        Store::<Person>::builder().build().unwrap();
    }

    #[test]
    #[should_panic(expected = "IdentifierFieldMissing")]
    fn build_rejects_undeclared_id_key() {
        let temp = TempDir::new("build").unwrap();
        Store::<Person>::builder()
            .path(temp.path().join("people.json"))
            .id_key("salary")
            .create_if_missing(true)
            .build()
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "InvalidIdentifierType")]
    fn build_rejects_list_valued_id_key() {
        let temp = TempDir::new("build").unwrap();
        Store::<Person>::builder()
            .path(temp.path().join("people.json"))
            .id_key("cars")
            .create_if_missing(true)
            .build()
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "NotJsonFile")]
    fn build_creates_json_files_only() {
        let temp = TempDir::new("build").unwrap();
        Store::<Person>::builder()
            .path(temp.path().join("people.txt"))
            .create_if_missing(true)
            .build()
            .unwrap();
    }

    #[test]
    #[should_panic(expected = "StoreNotFound")]
    fn build_requires_an_existing_file() {
        let temp = TempDir::new("build").unwrap();
        Store::<Person>::builder()
            .path(temp.path().join("people.json"))
            .build()
            .unwrap();
    }

    #[test]
    fn numeric_id_key_is_accepted() {
        let temp = TempDir::new("build").unwrap();
        let store = Store::<Person>::builder()
            .path(temp.path().join("people.json"))
            .id_key("age")
            .create_if_missing(true)
            .build();
        assert!(store.is_ok());
    }

    #[test]
    #[should_panic(expected = "IdentifierNotConfigured")]
    fn blank_id_key_counts_as_unconfigured() {
        let temp = TempDir::new("build").unwrap();
        let store = Store::<Person>::builder()
            .path(temp.path().join("people.json"))
            .id_key("  ")
            .create_if_missing(true)
            .build()
            .unwrap();
        store.select_by_id("1").unwrap();
    }
}
