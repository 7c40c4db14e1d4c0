pub mod error;
pub mod polars_utils;
pub mod reader;

pub use error::{IngestError, Result};
pub use polars_utils::{
    any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty, format_numeric, parse_f64,
    parse_i64,
};
pub use reader::{
    RECIPE_COLUMNS, REVIEW_COLUMNS, read_recipes_parquet, read_reviews_csv, require_columns,
};
