pub mod loader;
pub mod schema;

pub use loader::{RelationalLoader, StoreConfig, StoreError};
pub use schema::{TABLES, TableDef, table_names};
