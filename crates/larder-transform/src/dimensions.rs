//! Surrogate-keyed dimension extraction.
//!
//! A [`Dimension`] assigns each distinct value of a column a dense 0-based
//! surrogate key in first-seen order and keeps the value→key lookup the
//! fact builders resolve against. Keys are stable within one run only; the
//! loader coalesces across runs by natural value.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use polars::prelude::{AnyValue, DataFrame};

use larder_ingest::{any_to_i64, any_to_string_non_empty};
use larder_model::RecipeKeyword;

use crate::lists::row_list_values;

/// An ordered set of distinct values with dense surrogate keys.
#[derive(Debug, Clone, Default)]
pub struct Dimension {
    values: Vec<String>,
    lookup: HashMap<String, i64>,
}

impl Dimension {
    /// Insert a value, returning its surrogate key (existing or new).
    pub fn insert(&mut self, value: &str) -> i64 {
        if let Some(&key) = self.lookup.get(value) {
            return key;
        }
        let key = self.values.len() as i64;
        self.values.push(value.to_string());
        self.lookup.insert(value.to_string(), key);
        key
    }

    /// Surrogate key for a value, if present.
    pub fn key_of(&self, value: &str) -> Option<i64> {
        self.lookup.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Rows in key order: `(surrogate_key, value)`.
    pub fn rows(&self) -> impl Iterator<Item = (i64, &str)> {
        self.values
            .iter()
            .enumerate()
            .map(|(key, value)| (key as i64, value.as_str()))
    }
}

/// Build a dimension over the distinct values of a single-valued column.
/// Null and empty values contribute nothing.
pub fn string_dimension(df: &DataFrame, column: &str) -> Result<Dimension> {
    let series = df.column(column)?;
    let mut dimension = Dimension::default();
    for idx in 0..df.height() {
        if let Some(value) = any_to_string_non_empty(series.get(idx).unwrap_or(AnyValue::Null)) {
            dimension.insert(&value);
        }
    }
    Ok(dimension)
}

/// Build a dimension over the exploded values of a list-valued column.
///
/// An empty or null list contributes no values; duplicates within one
/// row's list collapse to a single dimension entry. With `fold_case` the
/// values are lower-cased first, so differently-cased spellings share a
/// key.
pub fn list_dimension(df: &DataFrame, column: &str, fold_case: bool) -> Result<Dimension> {
    let series = df.column(column)?;
    let mut dimension = Dimension::default();
    for idx in 0..df.height() {
        for value in row_list_values(series, idx)? {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            if fold_case {
                dimension.insert(&trimmed.to_lowercase());
            } else {
                dimension.insert(trimmed);
            }
        }
    }
    Ok(dimension)
}

/// Build the `(recipe_id, keyword_id)` join rows for a list-valued keyword
/// column, collapsing duplicate pairs within one recipe.
pub fn keyword_pairs(
    df: &DataFrame,
    id_column: &str,
    list_column: &str,
    dimension: &Dimension,
) -> Result<Vec<RecipeKeyword>> {
    let ids = df.column(id_column)?;
    let lists = df.column(list_column)?;
    let mut pairs = Vec::new();
    for idx in 0..df.height() {
        let Some(recipe_id) = any_to_i64(ids.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        let mut seen: HashSet<i64> = HashSet::new();
        for value in row_list_values(lists, idx)? {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(keyword_id) = dimension.key_of(trimmed)
                && seen.insert(keyword_id)
            {
                pairs.push(RecipeKeyword {
                    recipe_id,
                    keyword_id,
                });
            }
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_dense_and_first_seen_ordered() {
        let mut dimension = Dimension::default();
        assert_eq!(dimension.insert("Dessert"), 0);
        assert_eq!(dimension.insert("Breakfast"), 1);
        assert_eq!(dimension.insert("Dessert"), 0);
        assert_eq!(dimension.len(), 2);
        assert_eq!(dimension.key_of("Breakfast"), Some(1));
        assert_eq!(dimension.key_of("Lunch"), None);
    }
}
