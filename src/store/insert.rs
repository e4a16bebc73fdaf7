//! Appending records.
use log::info;

use super::error::StoreError;
use super::{Store, file, resolve, validate};
use crate::schema::Record;

impl<T: Record> Store<T> {
    /// Appends one record and rewrites the collection.
    ///
    /// With an identifier field configured, the record's identifier must be
    /// non-blank and unique across the collection; a null identifier reads
    /// as blank.
    pub fn insert(&self, record: T) -> Result<(), StoreError> {
        const OP: &str = "insert";
        validate::ensure_store_exists(self.path())?;

        let mut records: Vec<T> = self.file.load(OP)?;

        if let Some(key) = self.id_key.as_deref() {
            let tree = file::to_tree(OP, &record)?;
            let id = resolve::field_text(&tree, key)?;
            if id.trim().is_empty() {
                return Err(StoreError::EmptyIdentifier {
                    key: key.to_string(),
                });
            }
            for existing in &records {
                let existing_tree = file::to_tree(OP, existing)?;
                if resolve::field_text(&existing_tree, key)? == id {
                    return Err(StoreError::DuplicateIdentifier {
                        key: key.to_string(),
                        id,
                    });
                }
            }
        }

        records.push(record);
        self.file.save(OP, &records)?;
        info!("[{OP}] inserted 1 record, {} total", records.len());
        Ok(())
    }

    /// Inserts records one at a time, in order. The first failure aborts
    /// the rest of the batch; records inserted before it stay committed.
    pub fn insert_multiple(&self, records: Vec<T>) -> Result<(), StoreError> {
        for record in records {
            self.insert(record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::super::fixtures::{Person, john, mark, store_in};
    use crate::store::Store;

    #[test]
    fn insert_then_select_by_id_round_trips() {
        let temp = TempDir::new("insert").unwrap();
        let store = store_in(&temp);

        store.insert(john()).unwrap();
        assert_eq!(store.select_by_id("1").unwrap().unwrap(), john());
    }

    #[test]
    fn duplicate_identifier_leaves_the_collection_unchanged() {
        let temp = TempDir::new("insert").unwrap();
        let store = store_in(&temp);
        store.insert(john()).unwrap();

        let mut twin = mark();
        twin.id = "1".into();
        let result = store.insert(twin);

        assert!(matches!(
            result,
            Err(crate::store::error::StoreError::DuplicateIdentifier { .. })
        ));
        assert_eq!(store.select_all().unwrap(), vec![john()]);
    }

    #[test]
    #[should_panic(expected = "EmptyIdentifier")]
    fn blank_identifier_is_rejected() {
        let temp = TempDir::new("insert").unwrap();
        let store = store_in(&temp);

        let mut nobody = john();
        nobody.id = "  ".into();
        store.insert(nobody).unwrap();
    }

    #[test]
    fn without_an_id_key_duplicates_are_allowed() {
        let temp = TempDir::new("insert").unwrap();
        let store: Store<Person> = Store::builder()
            .path(temp.path().join("people.json"))
            .create_if_missing(true)
            .build()
            .unwrap();

        store.insert(john()).unwrap();
        store.insert(john()).unwrap();
        assert_eq!(store.select_all().unwrap().len(), 2);
    }

    #[test]
    fn batch_failure_keeps_earlier_inserts() {
        let temp = TempDir::new("insert").unwrap();
        let store = store_in(&temp);

        let mut twin = mark();
        twin.id = "1".into();
        // john commits, twin collides, alice never runs.
        let result = store.insert_multiple(vec![john(), twin, super::super::fixtures::alice()]);

        assert!(result.is_err());
        assert_eq!(store.select_all().unwrap(), vec![john()]);
    }
}
