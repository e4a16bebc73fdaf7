//! Read-only queries.
//!
//! Every query loads a fresh snapshot of the collection; nothing is cached
//! between calls. "Not found" is an empty result or `None`, never an error.
use log::{info, warn};
use serde_json::Value;

use super::error::StoreError;
use super::{Store, file, resolve, validate};
use crate::schema::Record;

impl<T: Record> Store<T> {
    /// Returns every record in file order. A zero-length file reads as the
    /// empty collection.
    pub fn select_all(&self) -> Result<Vec<T>, StoreError> {
        validate::ensure_store_exists(self.path())?;
        self.file.load("select_all")
    }

    /// Returns the record whose identifier equals `id`, or `None`.
    ///
    /// More than one match means a prior uniqueness violation and fails
    /// with [`AmbiguousIdentifier`](StoreError::AmbiguousIdentifier).
    pub fn select_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        const OP: &str = "select_by_id";
        validate::ensure_store_exists(self.path())?;
        let key = validate::ensure_id_configured(OP, self.id_key.as_deref())?;

        let mut found = Vec::new();
        for record in self.file.load::<T>(OP)? {
            let tree = file::to_tree(OP, &record)?;
            if resolve::field_text(&tree, key)? == id {
                found.push(record);
            }
        }

        match found.len() {
            0 => {
                warn!("[{OP}] no record with id '{id}'");
                Ok(None)
            }
            1 => {
                info!("[{OP}] found record '{id}'");
                Ok(found.pop())
            }
            count => Err(StoreError::AmbiguousIdentifier {
                id: id.to_string(),
                count,
            }),
        }
    }

    /// Returns every record whose `key` field matches `value`, comparing
    /// field name and value case-insensitively.
    pub fn select_by_key(&self, key: &str, value: &str) -> Result<Vec<T>, StoreError> {
        const OP: &str = "select_by_key";
        validate::ensure_store_exists(self.path())?;
        validate::ensure_field_exists::<T>(OP, key)?;

        let mut matched = Vec::new();
        for record in self.file.load::<T>(OP)? {
            let tree = file::to_tree(OP, &record)?;
            if resolve::matches_value(&tree, key, value) {
                matched.push(record);
            }
        }
        if matched.is_empty() {
            warn!("[{OP}] no records match {key}='{value}'");
        }
        Ok(matched)
    }

    /// Returns every record satisfying `condition`, in collection order.
    pub fn select_where<F>(&self, condition: F) -> Result<Vec<T>, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        validate::ensure_store_exists(self.path())?;
        let matched: Vec<T> = self
            .file
            .load::<T>("select_where")?
            .into_iter()
            .filter(|record| condition(record))
            .collect();
        if matched.is_empty() {
            warn!("[select_where] no records satisfy the condition");
        }
        Ok(matched)
    }

    /// Collects the values under `key` across the collection: an array
    /// field contributes its element texts as one inner vec, a non-null
    /// scalar contributes a one-element inner vec, and null scalars are
    /// skipped without a placeholder.
    pub fn select_key(&self, key: &str) -> Result<Vec<Vec<String>>, StoreError> {
        const OP: &str = "select_key";
        validate::ensure_store_exists(self.path())?;
        validate::ensure_field_exists::<T>(OP, key)?;

        let mut values = Vec::new();
        for record in self.file.load::<T>(OP)? {
            let tree = file::to_tree(OP, &record)?;
            match resolve::lookup(&tree, key) {
                Some(Value::Array(elements)) => {
                    values.push(elements.iter().map(resolve::text_form).collect());
                }
                Some(Value::Null) | None => {}
                Some(scalar) => values.push(vec![resolve::text_form(scalar)]),
            }
        }
        Ok(values)
    }

    /// Projects several keys at once: one inner vec per record (always,
    /// even when every requested field is null) holding the text form of
    /// each requested field in key order. Array fields render as their
    /// full JSON array form; null-valued entries are omitted.
    pub fn select_keys(&self, keys: &[&str]) -> Result<Vec<Vec<String>>, StoreError> {
        const OP: &str = "select_keys";
        validate::ensure_store_exists(self.path())?;

        if let [key] = keys {
            return self.select_key(key);
        }
        for key in keys {
            validate::ensure_field_exists::<T>(OP, key)?;
        }

        let mut grouped = Vec::new();
        for record in self.file.load::<T>(OP)? {
            let tree = file::to_tree(OP, &record)?;
            let mut row = Vec::new();
            for key in keys {
                match resolve::lookup(&tree, key) {
                    Some(Value::Null) | None => {}
                    Some(array @ Value::Array(_)) => row.push(array.to_string()),
                    Some(scalar) => row.push(resolve::text_form(scalar)),
                }
            }
            grouped.push(row);
        }
        Ok(grouped)
    }
}
