//! Operation preconditions.
use std::path::Path;

use super::error::StoreError;
use crate::schema::Schema;

/// The backing file must exist at the time of the operation.
pub(crate) fn ensure_store_exists(path: &Path) -> Result<(), StoreError> {
    if !path.exists() {
        return Err(StoreError::StoreNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// The referenced field must be declared on the record type.
pub(crate) fn ensure_field_exists<T: Schema>(
    operation: &'static str,
    key: &str,
) -> Result<(), StoreError> {
    if T::field(key).is_none() {
        return Err(StoreError::UnknownField {
            operation,
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Identifier-based operations need an identifier field configured.
pub(crate) fn ensure_id_configured<'a>(
    operation: &'static str,
    id_key: Option<&'a str>,
) -> Result<&'a str, StoreError> {
    id_key.ok_or(StoreError::IdentifierNotConfigured { operation })
}
