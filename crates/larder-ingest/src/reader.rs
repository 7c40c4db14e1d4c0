//! Source extract readers.
//!
//! The review log ships as CSV, the recipe catalog as Parquet with its
//! list-valued columns (`Images`, `Keywords`, `RecipeIngredientParts`,
//! `RecipeIngredientQuantities`) as native list columns. Both are read
//! whole into memory; this is a full-batch pipeline.

use std::fs::File;
use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, ParquetReader, SerReader};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Columns the review source must provide.
pub const REVIEW_COLUMNS: [&str; 8] = [
    "ReviewId",
    "AuthorId",
    "AuthorName",
    "RecipeId",
    "Rating",
    "Review",
    "DateSubmitted",
    "DateModified",
];

/// Columns the recipe source must provide.
pub const RECIPE_COLUMNS: [&str; 24] = [
    "RecipeId",
    "Name",
    "AuthorId",
    "AuthorName",
    "CookTime",
    "PrepTime",
    "TotalTime",
    "DatePublished",
    "Description",
    "RecipeCategory",
    "Calories",
    "FatContent",
    "SaturatedFatContent",
    "CholesterolContent",
    "SodiumContent",
    "CarbohydrateContent",
    "FiberContent",
    "SugarContent",
    "ProteinContent",
    "RecipeServings",
    "RecipeYield",
    "RecipeInstructions",
    "Images",
    "Keywords",
];

/// Read the review log CSV into a DataFrame.
pub fn read_reviews_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    require_columns(&df, &REVIEW_COLUMNS, path)?;
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "reviews read"
    );
    Ok(df)
}

/// Read the recipe catalog Parquet into a DataFrame.
pub fn read_recipes_parquet(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => IngestError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => IngestError::FileOpen {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    require_columns(&df, &RECIPE_COLUMNS, path)?;
    // The two ingredient list columns are validated separately so the
    // error names whichever one is missing.
    require_columns(
        &df,
        &["RecipeIngredientParts", "RecipeIngredientQuantities"],
        path,
    )?;
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "recipes read"
    );
    Ok(df)
}

/// Check that every required column is present, naming the first absent one.
pub fn require_columns(df: &DataFrame, columns: &[&str], path: &Path) -> Result<()> {
    for column in columns {
        if df.column(column).is_err() {
            return Err(IngestError::MissingColumn {
                column: (*column).to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}
