pub mod schema;
pub mod store;

pub use schema::{FieldDef, FieldKind, Record, Schema};
pub use serde_json::Value;
pub use store::error::{BuildError, CodecError, StoreError};
pub use store::{Store, StoreBuilder};
