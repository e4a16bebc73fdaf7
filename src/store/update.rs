//! In-place mutation of records.
//!
//! Every update runs one read-modify-write cycle: load the whole collection,
//! mutate matching records through their field trees, decode the trees back
//! into typed records, and rewrite the file once if anything changed.
use log::{info, warn};
use serde_json::{Map, Value};

use super::error::StoreError;
use super::{Store, file, resolve, validate};
use crate::schema::{FieldKind, Record, Schema};

/// Sets `key` on the tree when the tree carries it, and reports whether it
/// did. Arrays replace the field wholesale. Scalars aimed at a text field
/// are stored via their text form; aimed at any other kind they pass
/// through unchanged so the record stays decodable.
fn set_field<T: Schema>(tree: &mut Map<String, Value>, key: &str, new_value: &Value) -> bool {
    let Some(raw) = resolve::raw_key(tree, key) else {
        return false;
    };
    let stored = match new_value {
        Value::Array(_) => new_value.clone(),
        scalar => match T::field(key).map(|field| field.kind) {
            Some(FieldKind::Text) => Value::String(resolve::text_form(scalar)),
            _ => scalar.clone(),
        },
    };
    tree.insert(raw, stored);
    true
}

impl<T: Record> Store<T> {
    /// Sets `key` to `new_value` on every record carrying the field.
    /// Returns whether any record changed.
    pub fn update_key(&self, key: &str, new_value: Value) -> Result<bool, StoreError> {
        const OP: &str = "update_key";
        validate::ensure_store_exists(self.path())?;
        validate::ensure_field_exists::<T>(OP, key)?;

        let mut rewritten = Vec::new();
        let mut updated = 0usize;
        for record in self.file.load::<T>(OP)? {
            let mut tree = file::to_tree(OP, &record)?;
            if set_field::<T>(&mut tree, key, &new_value) {
                rewritten.push(file::from_tree(OP, tree)?);
                updated += 1;
            } else {
                rewritten.push(record);
            }
        }

        if updated > 0 {
            self.file.save(OP, &rewritten)?;
            info!("[{OP}] set '{key}' on {updated} records");
        }
        Ok(updated > 0)
    }

    /// Replaces the record whose identifier equals `id` with `record`.
    ///
    /// The replacement must carry the same identifier; anything else fails
    /// with [`IdentifierMismatch`](StoreError::IdentifierMismatch) before
    /// any write. Returns `false` when no record has that id.
    pub fn update_by_id(&self, id: &str, record: T) -> Result<bool, StoreError> {
        const OP: &str = "update_by_id";
        validate::ensure_store_exists(self.path())?;
        let key = validate::ensure_id_configured(OP, self.id_key.as_deref())?;

        let mut records: Vec<T> = self.file.load(OP)?;
        let mut target = None;
        for (index, existing) in records.iter().enumerate() {
            let tree = file::to_tree(OP, existing)?;
            if resolve::field_text(&tree, key)? == id {
                target = Some(index);
                break;
            }
        }

        let Some(index) = target else {
            warn!("[{OP}] no record with id '{id}'");
            return Ok(false);
        };

        let replacement_id = resolve::field_text(&file::to_tree(OP, &record)?, key)?;
        if replacement_id != id {
            return Err(StoreError::IdentifierMismatch {
                expected: id.to_string(),
                actual: replacement_id,
            });
        }

        records[index] = record;
        self.file.save(OP, &records)?;
        info!("[{OP}] replaced record '{id}'");
        Ok(true)
    }

    /// Sets `key` to `new_value` on every record satisfying `condition`.
    /// Returns `false` without writing when nothing matches.
    pub fn update_where<F>(
        &self,
        condition: F,
        key: &str,
        new_value: Value,
    ) -> Result<bool, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        const OP: &str = "update_where";
        validate::ensure_store_exists(self.path())?;
        validate::ensure_field_exists::<T>(OP, key)?;

        let records: Vec<T> = self.file.load(OP)?;
        if !records.iter().any(&condition) {
            warn!("[{OP}] no records satisfy the condition");
            return Ok(false);
        }

        let mut rewritten = Vec::with_capacity(records.len());
        let mut updated = 0usize;
        for record in records {
            if condition(&record) {
                let mut tree = file::to_tree(OP, &record)?;
                if set_field::<T>(&mut tree, key, &new_value) {
                    rewritten.push(file::from_tree(OP, tree)?);
                    updated += 1;
                    continue;
                }
            }
            rewritten.push(record);
        }

        if updated > 0 {
            self.file.save(OP, &rewritten)?;
            info!("[{OP}] set '{key}' on {updated} records");
        }
        Ok(updated > 0)
    }

    /// Applies every `(field, value)` pair in `updates` to each record
    /// satisfying `condition`. Field names are validated up front; a pair
    /// whose field is missing from a record's tree is skipped for that
    /// record. Returns whether any field changed anywhere.
    pub fn update_fields_where<F>(
        &self,
        condition: F,
        updates: &[(&str, Value)],
    ) -> Result<bool, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        const OP: &str = "update_fields_where";
        validate::ensure_store_exists(self.path())?;
        for (key, _) in updates {
            validate::ensure_field_exists::<T>(OP, key)?;
        }

        let records: Vec<T> = self.file.load(OP)?;
        if !records.iter().any(&condition) {
            warn!("[{OP}] no records satisfy the condition");
            return Ok(false);
        }

        let mut rewritten = Vec::with_capacity(records.len());
        let mut touched = 0usize;
        for record in records {
            if !condition(&record) {
                rewritten.push(record);
                continue;
            }
            let mut tree = file::to_tree(OP, &record)?;
            let mut changed = false;
            for (key, value) in updates {
                changed |= set_field::<T>(&mut tree, key, value);
            }
            if changed {
                rewritten.push(file::from_tree(OP, tree)?);
                touched += 1;
            } else {
                rewritten.push(record);
            }
        }

        if touched > 0 {
            self.file.save(OP, &rewritten)?;
            info!("[{OP}] updated {touched} records");
        }
        Ok(touched > 0)
    }
}
