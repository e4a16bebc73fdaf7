//! Removing records.
use log::{info, warn};

use super::error::StoreError;
use super::{Store, file, resolve, validate};
use crate::schema::Record;

impl<T: Record> Store<T> {
    /// Replaces the collection with the empty sequence. Idempotent.
    pub fn delete_all(&self) -> Result<bool, StoreError> {
        const OP: &str = "delete_all";
        validate::ensure_store_exists(self.path())?;

        self.file.save(OP, &Vec::<T>::new())?;
        info!("[{OP}] collection cleared");
        Ok(true)
    }

    /// Removes the record whose identifier equals `id`. Returns `false`
    /// without writing when no record matches; fails with
    /// [`AmbiguousIdentifier`](StoreError::AmbiguousIdentifier) when more
    /// than one does.
    pub fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        const OP: &str = "delete_by_id";
        validate::ensure_store_exists(self.path())?;
        let key = validate::ensure_id_configured(OP, self.id_key.as_deref())?;

        let mut remaining = Vec::new();
        let mut removed = 0usize;
        for record in self.file.load::<T>(OP)? {
            let tree = file::to_tree(OP, &record)?;
            if resolve::field_text(&tree, key)? == id {
                removed += 1;
            } else {
                remaining.push(record);
            }
        }

        match removed {
            0 => {
                warn!("[{OP}] no record with id '{id}'");
                Ok(false)
            }
            1 => {
                self.file.save(OP, &remaining)?;
                info!("[{OP}] deleted record '{id}'");
                Ok(true)
            }
            count => Err(StoreError::AmbiguousIdentifier {
                id: id.to_string(),
                count,
            }),
        }
    }

    /// Removes every record whose `key` field matches `value`, comparing
    /// case-insensitively. Returns `false` without writing when nothing
    /// matches.
    pub fn delete_by_key(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        const OP: &str = "delete_by_key";
        validate::ensure_store_exists(self.path())?;
        validate::ensure_field_exists::<T>(OP, key)?;

        let mut remaining = Vec::new();
        let mut removed = 0usize;
        for record in self.file.load::<T>(OP)? {
            let tree = file::to_tree(OP, &record)?;
            if resolve::matches_value(&tree, key, value) {
                removed += 1;
            } else {
                remaining.push(record);
            }
        }

        if removed == 0 {
            warn!("[{OP}] no records match {key}='{value}'");
            return Ok(false);
        }
        self.file.save(OP, &remaining)?;
        info!("[{OP}] deleted {removed} records matching {key}='{value}'");
        Ok(true)
    }

    /// Removes every record satisfying `condition`. Returns `false`
    /// without writing when nothing matches.
    pub fn delete_where<F>(&self, condition: F) -> Result<bool, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        const OP: &str = "delete_where";
        validate::ensure_store_exists(self.path())?;

        let (matched, remaining): (Vec<T>, Vec<T>) = self
            .file
            .load::<T>(OP)?
            .into_iter()
            .partition(|record| condition(record));

        if matched.is_empty() {
            warn!("[{OP}] no records satisfy the condition");
            return Ok(false);
        }
        self.file.save(OP, &remaining)?;
        info!("[{OP}] deleted {} records", matched.len());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::super::fixtures::{john, mark, seeded_store};

    #[test]
    fn delete_all_is_idempotent() {
        let temp = TempDir::new("delete").unwrap();
        let store = seeded_store(&temp);

        assert!(store.delete_all().unwrap());
        assert!(store.delete_all().unwrap());
        assert!(store.select_all().unwrap().is_empty());
    }

    #[test]
    fn delete_by_id_removes_one_record() {
        let temp = TempDir::new("delete").unwrap();
        let store = seeded_store(&temp);

        assert!(store.delete_by_id("2").unwrap());
        assert!(store.select_by_id("2").unwrap().is_none());
        assert_eq!(store.select_all().unwrap().len(), 2);
    }

    #[test]
    fn delete_by_id_miss_leaves_the_file_untouched() {
        let temp = TempDir::new("delete").unwrap();
        let store = seeded_store(&temp);
        let before = std::fs::read(store.path()).unwrap();

        assert!(!store.delete_by_id("99").unwrap());
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
    }

    #[test]
    #[should_panic(expected = "AmbiguousIdentifier")]
    fn delete_by_id_rejects_duplicate_identifiers() {
        let temp = TempDir::new("delete").unwrap();
        let store = seeded_store(&temp);

        let mut twin = mark();
        twin.id = "1".into();
        let mut records = store.select_all().unwrap();
        records.push(twin);
        std::fs::write(store.path(), serde_json::to_vec(&records).unwrap()).unwrap();

        store.delete_by_id("1").unwrap();
    }

    #[test]
    fn delete_by_key_removes_all_matches() {
        let temp = TempDir::new("delete").unwrap();
        let store = seeded_store(&temp);

        assert!(store.delete_by_key("city", "new york").unwrap());
        let rest = store.select_all().unwrap();
        assert_eq!(rest, vec![mark()]);
    }

    #[test]
    fn delete_by_key_miss_is_a_no_write() {
        let temp = TempDir::new("delete").unwrap();
        let store = seeded_store(&temp);
        let before = std::fs::read(store.path()).unwrap();

        assert!(!store.delete_by_key("city", "Berlin").unwrap());
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn delete_where_removes_matches_and_keeps_the_rest() {
        let temp = TempDir::new("delete").unwrap();
        let store = seeded_store(&temp);

        assert!(store.delete_where(|p| p.city == "New York").unwrap());
        let rest = store.select_all().unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].name, "Mark");
    }

    #[test]
    fn delete_where_without_matches_returns_false() {
        let temp = TempDir::new("delete").unwrap();
        let store = seeded_store(&temp);

        assert!(!store.delete_where(|p| p.age > 100).unwrap());
        assert_eq!(store.select_all().unwrap(), vec![john(), mark(), super::super::fixtures::alice()]);
    }
}
