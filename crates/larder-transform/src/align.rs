//! Parallel list re-alignment.
//!
//! `RecipeIngredientParts` and `RecipeIngredientQuantities` are parallel
//! per-recipe lists that arrive independently exploded. Positional
//! correspondence is reconstructed explicitly: each exploded row gets a
//! zero-based ordinal within its recipe, and the two frames are inner
//! joined on `(recipe_id, ordinal)`, never zipped by adjacency. When the
//! two lists disagree in length, the trailing unmatched elements drop out
//! of the join silently.

use anyhow::Result;
use polars::prelude::{
    AnyValue, DataFrame, IntoLazy, JoinArgs, JoinType, NamedFrom, Series, col,
};

use larder_ingest::{any_to_i64, any_to_string_non_empty};
use larder_model::{DataQualityIssue, RecipeIngredient};

use crate::dimensions::Dimension;
use crate::lists::row_list_values;

/// Aligned ingredient rows plus the issues observed while resolving them.
#[derive(Debug, Default)]
pub struct AlignedIngredients {
    pub rows: Vec<RecipeIngredient>,
    pub issues: Vec<DataQualityIssue>,
}

/// Explode a list-valued column into one row per element, tagging every
/// row with its occurrence rank within its parent record (first element =
/// ordinal 0). Null or empty lists contribute no rows.
pub fn explode_with_ordinal(
    df: &DataFrame,
    id_column: &str,
    list_column: &str,
    value_column: &str,
) -> Result<DataFrame> {
    let ids = df.column(id_column)?;
    let lists = df.column(list_column)?;

    let mut out_ids: Vec<i64> = Vec::new();
    let mut out_ordinals: Vec<i64> = Vec::new();
    let mut out_values: Vec<Option<String>> = Vec::new();
    for idx in 0..df.height() {
        let Some(record_id) = any_to_i64(ids.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        for (ordinal, value) in row_list_values(lists, idx)?.into_iter().enumerate() {
            out_ids.push(record_id);
            out_ordinals.push(ordinal as i64);
            out_values.push(Some(value));
        }
    }

    let frame = DataFrame::new(vec![
        Series::new(id_column.into(), out_ids).into(),
        Series::new("ordinal".into(), out_ordinals).into(),
        Series::new(value_column.into(), out_values).into(),
    ])?;
    Ok(frame)
}

/// Re-associate ingredient names with their quantities and resolve the
/// names against the ingredient dimension.
///
/// Names are case-folded before resolution so `"Flour"` and `"flour"` hit
/// the same surrogate key; the emitted quantity text keeps its original
/// case. A folded name missing from the dimension still produces a row
/// (with a null key) and is reported as an issue rather than dropped.
pub fn align_ingredients(
    recipes: &DataFrame,
    ingredients: &Dimension,
) -> Result<AlignedIngredients> {
    let parts = explode_with_ordinal(
        recipes,
        "RecipeId",
        "RecipeIngredientParts",
        "ingredient_name",
    )?;
    let quantities = explode_with_ordinal(
        recipes,
        "RecipeId",
        "RecipeIngredientQuantities",
        "ingredient_quantity",
    )?;

    // The correctness-critical step: the k-th name pairs with the k-th
    // quantity of the same recipe, whatever either list contains.
    let joined = parts
        .lazy()
        .join(
            quantities.lazy(),
            [col("RecipeId"), col("ordinal")],
            [col("RecipeId"), col("ordinal")],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    let ids = joined.column("RecipeId")?;
    let ordinals = joined.column("ordinal")?;
    let names = joined.column("ingredient_name")?;
    let quantity_texts = joined.column("ingredient_quantity")?;

    let mut aligned: Vec<(i64, i64, Option<String>, Option<String>)> =
        Vec::with_capacity(joined.height());
    for idx in 0..joined.height() {
        let Some(recipe_id) = any_to_i64(ids.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        let ordinal = any_to_i64(ordinals.get(idx).unwrap_or(AnyValue::Null)).unwrap_or(0);
        let name = any_to_string_non_empty(names.get(idx).unwrap_or(AnyValue::Null));
        let quantity = any_to_string_non_empty(quantity_texts.get(idx).unwrap_or(AnyValue::Null));
        aligned.push((recipe_id, ordinal, name, quantity));
    }
    // The join result's row order is an implementation detail; restore
    // per-recipe list order for deterministic output.
    aligned.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    let mut result = AlignedIngredients::default();
    for (recipe_id, _ordinal, name, quantity) in aligned {
        let ingredient_id = match &name {
            Some(name) => {
                let folded = name.to_lowercase();
                let key = ingredients.key_of(&folded);
                if key.is_none() {
                    result.issues.push(DataQualityIssue::UnresolvedIngredient {
                        recipe_id,
                        name: folded,
                    });
                }
                key
            }
            None => None,
        };
        result.rows.push(RecipeIngredient {
            recipe_id,
            ingredient_id,
            ingredient_quantity: quantity,
        });
    }
    Ok(result)
}
