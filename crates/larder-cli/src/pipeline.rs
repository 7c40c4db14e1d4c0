//! Batch pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Ingest**: read the recipe Parquet and review CSV extracts
//! 2. **Normalize**: type the raw fields (durations, timestamps, text)
//! 3. **Shape**: decompose into the nine output relations
//! 4. **Load**: write the relations to the store in dependency order
//!
//! Each stage takes the output of the previous stage and returns typed
//! results; parsing failures abort before anything touches the store.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

use larder_ingest::{read_recipes_parquet, read_reviews_csv};
use larder_model::{DerivedTables, LoadReport};
use larder_store::{RelationalLoader, StoreConfig};
use larder_transform::{normalize_recipes, normalize_reviews, shape_tables};

/// Result of the ingest stage: both source extracts, raw.
#[derive(Debug)]
pub struct RawExtracts {
    pub recipes: DataFrame,
    pub reviews: DataFrame,
}

/// Result of the normalize stage: both extracts, typed.
#[derive(Debug)]
pub struct NormalizedFrames {
    pub recipes: DataFrame,
    pub reviews: DataFrame,
}

/// Read both source extracts into memory.
pub fn ingest(recipes_path: &Path, reviews_path: &Path) -> Result<RawExtracts> {
    let span = info_span!("ingest");
    let _guard = span.enter();
    let start = Instant::now();

    let recipes = read_recipes_parquet(recipes_path)
        .with_context(|| format!("read recipes {}", recipes_path.display()))?;
    let reviews = read_reviews_csv(reviews_path)
        .with_context(|| format!("read reviews {}", reviews_path.display()))?;

    info!(
        recipe_rows = recipes.height(),
        review_rows = reviews.height(),
        duration_ms = start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok(RawExtracts { recipes, reviews })
}

/// Normalize both raw frames. A malformed timestamp aborts here, before
/// any store writes.
pub fn normalize(raw: &RawExtracts) -> Result<NormalizedFrames> {
    let span = info_span!("normalize");
    let _guard = span.enter();
    let start = Instant::now();

    let recipes = normalize_recipes(&raw.recipes).context("normalize recipes")?;
    let reviews = normalize_reviews(&raw.reviews).context("normalize reviews")?;

    info!(
        recipe_rows = recipes.height(),
        review_rows = reviews.height(),
        duration_ms = start.elapsed().as_millis(),
        "normalize complete"
    );
    Ok(NormalizedFrames { recipes, reviews })
}

/// Decompose the normalized frames into the nine output relations.
pub fn shape(frames: &NormalizedFrames) -> Result<DerivedTables> {
    let span = info_span!("shape");
    let _guard = span.enter();
    let start = Instant::now();

    let tables = shape_tables(&frames.recipes, &frames.reviews).context("shape tables")?;

    info!(
        derived_rows = tables.row_count(),
        issues = tables.issues.len(),
        duration_ms = start.elapsed().as_millis(),
        "shape complete"
    );
    Ok(tables)
}

/// Write the derived relations to the configured store.
///
/// The connection lives only for this stage and is released on every exit
/// path. Per-table failures land in the returned report rather than here.
pub fn load(
    tables: &DerivedTables,
    config: &StoreConfig,
    drop_existing: bool,
) -> Result<LoadReport> {
    let span = info_span!("load");
    let _guard = span.enter();
    let start = Instant::now();

    let mut loader = RelationalLoader::connect(config).context("connect to store")?;
    if drop_existing {
        loader.drop_tables().context("drop tables")?;
    }
    loader.create_tables().context("create tables")?;
    let report = loader.load(tables);

    debug!(
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        duration_ms = start.elapsed().as_millis(),
        "load stage finished"
    );
    Ok(report)
}
