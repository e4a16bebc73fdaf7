//! Record type declarations.
//!
//! A type stored in a [`Store`](crate::store::Store) declares its fields once
//! through the [`Schema`] trait: a static table mapping each field name to a
//! [`FieldKind`]. Every "does this field exist on the record type" question is
//! answered from that table, so no runtime type introspection happens anywhere
//! in the crate.
//!
//! # Example
//! ```rust
//! use brine::{FieldDef, FieldKind, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Person {
//!     id: String,
//!     name: String,
//!     cars: Vec<String>,
//! }
//!
//! impl Schema for Person {
//!     const FIELDS: &'static [FieldDef] = &[
//!         FieldDef::new("id", FieldKind::Text),
//!         FieldDef::new("name", FieldKind::Text),
//!         FieldDef::new("cars", FieldKind::List),
//!     ];
//! }
//!
//! assert!(Person::field("NAME").is_some());
//! assert!(Person::field("salary").is_none());
//! ```
use serde::{Serialize, de::DeserializeOwned};

/// Value shape of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    List,
}

/// One declared field of a record type.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Static field table of a record type.
pub trait Schema {
    /// Declared fields, in declaration order. Names are matched
    /// case-insensitively throughout the crate.
    const FIELDS: &'static [FieldDef];

    /// Looks up a declared field by name, ignoring case.
    fn field(name: &str) -> Option<&'static FieldDef> {
        Self::FIELDS
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }
}

/// Everything a type needs to live in a store: a declared field table plus
/// a serde round-trip through the JSON codec.
pub trait Record: Schema + Serialize + DeserializeOwned {}

impl<T: Schema + Serialize + DeserializeOwned> Record for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Reading {
        sensor: String,
        value: f64,
        active: bool,
    }

    impl Schema for Reading {
        const FIELDS: &'static [FieldDef] = &[
            FieldDef::new("sensor", FieldKind::Text),
            FieldDef::new("value", FieldKind::Number),
            FieldDef::new("active", FieldKind::Bool),
        ];
    }

    #[test]
    fn field_lookup_ignores_case() {
        let field = Reading::field("SeNsOr").unwrap();
        assert_eq!(field.name, "sensor");
        assert_eq!(field.kind, FieldKind::Text);
    }

    #[test]
    fn field_lookup_misses_undeclared_names() {
        assert!(Reading::field("unit").is_none());
    }

    #[test]
    fn field_table_keeps_declaration_order() {
        let names: Vec<&str> = Reading::FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["sensor", "value", "active"]);
    }
}
