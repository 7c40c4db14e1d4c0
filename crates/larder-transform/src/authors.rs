//! Canonical author identity resolution.
//!
//! The review log and the recipe catalog both carry `(AuthorId, AuthorName)`
//! pairs and routinely disagree. The resolver picks, per author id, the name
//! attached to that author's most recent activity in each source, then
//! prefers the review-sourced name over the recipe-sourced one. An empty
//! name is treated as absent, never as a valid value.

use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use polars::prelude::{AnyValue, DataFrame};
use tracing::debug;

use larder_ingest::{any_to_i64, any_to_string};
use larder_model::Author;

/// Latest-dated name per author id from one source table.
///
/// Ties on the timestamp are broken by last occurrence in input order,
/// which keeps the selection deterministic for a given extract.
fn latest_names(
    df: &DataFrame,
    id_column: &str,
    name_column: &str,
    date_column: &str,
) -> Result<HashMap<i64, String>> {
    let ids = df.column(id_column)?;
    let names = df.column(name_column)?;
    let dates = df.column(date_column)?;

    // Canonical timestamps compare correctly as strings; a null date sorts
    // before every real one.
    let mut latest: HashMap<i64, (String, String)> = HashMap::new();
    for idx in 0..df.height() {
        let Some(author_id) = any_to_i64(ids.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        let name = any_to_string(names.get(idx).unwrap_or(AnyValue::Null));
        let date = any_to_string(dates.get(idx).unwrap_or(AnyValue::Null));
        match latest.get(&author_id) {
            Some((existing_date, _)) if date < *existing_date => {}
            _ => {
                latest.insert(author_id, (date, name));
            }
        }
    }
    Ok(latest
        .into_iter()
        .map(|(id, (_, name))| (id, name))
        .collect())
}

/// Resolve one canonical `(author_id, name)` row per author id across the
/// two sources. Ids whose name is empty in both sources get no row; the
/// shaping step reports every reference to them.
pub fn resolve_authors(reviews: &DataFrame, recipes: &DataFrame) -> Result<Vec<Author>> {
    let from_reviews = latest_names(reviews, "AuthorId", "AuthorName", "DateModified")?;
    let from_recipes = latest_names(recipes, "AuthorId", "AuthorName", "DatePublished")?;

    let mut ids: BTreeSet<i64> = BTreeSet::new();
    ids.extend(from_reviews.keys().copied());
    ids.extend(from_recipes.keys().copied());

    let mut authors = Vec::with_capacity(ids.len());
    let mut unnamed = 0usize;
    for author_id in ids {
        let review_name = from_reviews
            .get(&author_id)
            .map(|name| name.trim())
            .filter(|name| !name.is_empty());
        let recipe_name = from_recipes
            .get(&author_id)
            .map(|name| name.trim())
            .filter(|name| !name.is_empty());
        match review_name.or(recipe_name) {
            Some(name) => authors.push(Author {
                author_id,
                name: name.to_string(),
            }),
            None => unnamed += 1,
        }
    }
    debug!(
        resolved = authors.len(),
        unnamed, "author resolution complete"
    );
    Ok(authors)
}
