//! Relational decomposition of the normalized frames.
//!
//! Runs the dimension builders, the author resolver, and the list aligner
//! over the normalized recipe and review frames and assembles the full set
//! of derived relation rows. Resolution problems become data quality
//! issues on the result; nothing is silently dropped here.

use std::collections::HashSet;

use anyhow::Result;
use polars::prelude::{AnyValue, DataFrame};
use tracing::{debug, info};

use larder_ingest::{any_to_f64, any_to_i64, any_to_string_non_empty};
use larder_model::{
    Category, DataQualityIssue, DerivedTables, Ingredient, Keyword, Nutrition, Recipe,
    RecipeImage, Review,
};

use crate::align::align_ingredients;
use crate::authors::resolve_authors;
use crate::dimensions::{keyword_pairs, list_dimension, string_dimension};
use crate::lists::row_list_values;

/// Decompose the two normalized frames into the nine output relations.
pub fn shape_tables(recipes: &DataFrame, reviews: &DataFrame) -> Result<DerivedTables> {
    let mut tables = DerivedTables::default();

    let categories = string_dimension(recipes, "RecipeCategory")?;
    let keywords = list_dimension(recipes, "Keywords", false)?;
    let ingredients = list_dimension(recipes, "RecipeIngredientParts", true)?;
    debug!(
        categories = categories.len(),
        keywords = keywords.len(),
        ingredients = ingredients.len(),
        "dimensions extracted"
    );

    tables.authors = resolve_authors(reviews, recipes)?;
    let known_authors: HashSet<i64> = tables
        .authors
        .iter()
        .map(|author| author.author_id)
        .collect();

    tables.categories = categories
        .rows()
        .map(|(category_id, name)| Category {
            category_id,
            name: name.to_string(),
        })
        .collect();
    tables.keywords = keywords
        .rows()
        .map(|(keyword_id, keyword)| Keyword {
            keyword_id,
            keyword: keyword.to_string(),
        })
        .collect();
    tables.ingredients = ingredients
        .rows()
        .map(|(ingredient_id, name)| Ingredient {
            ingredient_id,
            name: name.to_string(),
        })
        .collect();

    build_recipe_rows(recipes, &categories, &known_authors, &mut tables)?;
    build_image_rows(recipes, &mut tables)?;
    tables.recipe_keywords = keyword_pairs(recipes, "RecipeId", "Keywords", &keywords)?;

    let aligned = align_ingredients(recipes, &ingredients)?;
    tables.recipe_ingredients = aligned.rows;
    tables.issues.extend(aligned.issues);

    build_review_rows(reviews, &known_authors, &mut tables)?;

    info!(
        authors = tables.authors.len(),
        recipes = tables.recipes.len(),
        reviews = tables.reviews.len(),
        issues = tables.issues.len(),
        "shaping complete"
    );
    Ok(tables)
}

fn build_recipe_rows(
    recipes: &DataFrame,
    categories: &crate::dimensions::Dimension,
    known_authors: &HashSet<i64>,
    tables: &mut DerivedTables,
) -> Result<()> {
    let ids = recipes.column("RecipeId")?;
    let names = recipes.column("Name")?;
    let author_ids = recipes.column("AuthorId")?;
    let cook_times = recipes.column("CookTime")?;
    let prep_times = recipes.column("PrepTime")?;
    let total_times = recipes.column("TotalTime")?;
    let published = recipes.column("DatePublished")?;
    let descriptions = recipes.column("Description")?;
    let category_names = recipes.column("RecipeCategory")?;
    let servings = recipes.column("RecipeServings")?;
    let yields = recipes.column("RecipeYield")?;
    let instructions = recipes.column("RecipeInstructions")?;
    let nutrition_columns = [
        recipes.column("Calories")?,
        recipes.column("FatContent")?,
        recipes.column("SaturatedFatContent")?,
        recipes.column("CholesterolContent")?,
        recipes.column("SodiumContent")?,
        recipes.column("CarbohydrateContent")?,
        recipes.column("FiberContent")?,
        recipes.column("SugarContent")?,
        recipes.column("ProteinContent")?,
    ];

    for idx in 0..recipes.height() {
        let Some(recipe_id) = any_to_i64(ids.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        let Some(author_id) = any_to_i64(author_ids.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        if !known_authors.contains(&author_id) {
            tables.issues.push(DataQualityIssue::UnresolvedAuthor {
                author_id,
                relation: "recipes".to_string(),
            });
        }
        let category_id = any_to_string_non_empty(category_names.get(idx).unwrap_or(AnyValue::Null))
            .and_then(|name| categories.key_of(name.trim()));
        let nutrition_values: Vec<Option<f64>> = nutrition_columns
            .iter()
            .map(|column| any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect();
        tables.recipes.push(Recipe {
            recipe_id,
            name: any_to_string_non_empty(names.get(idx).unwrap_or(AnyValue::Null)),
            author_id,
            cook_time: any_to_i64(cook_times.get(idx).unwrap_or(AnyValue::Null)),
            prep_time: any_to_i64(prep_times.get(idx).unwrap_or(AnyValue::Null)),
            total_time: any_to_i64(total_times.get(idx).unwrap_or(AnyValue::Null)),
            date_published: any_to_string_non_empty(published.get(idx).unwrap_or(AnyValue::Null)),
            description: any_to_string_non_empty(descriptions.get(idx).unwrap_or(AnyValue::Null)),
            category_id,
            nutrition: Nutrition {
                calories: nutrition_values[0],
                fat_content: nutrition_values[1],
                saturated_fat_content: nutrition_values[2],
                cholesterol_content: nutrition_values[3],
                sodium_content: nutrition_values[4],
                carbohydrate_content: nutrition_values[5],
                fiber_content: nutrition_values[6],
                sugar_content: nutrition_values[7],
                protein_content: nutrition_values[8],
            },
            recipe_servings: any_to_string_non_empty(servings.get(idx).unwrap_or(AnyValue::Null)),
            recipe_yield: any_to_string_non_empty(yields.get(idx).unwrap_or(AnyValue::Null)),
            recipe_instructions: any_to_string_non_empty(
                instructions.get(idx).unwrap_or(AnyValue::Null),
            ),
        });
    }
    Ok(())
}

fn build_image_rows(recipes: &DataFrame, tables: &mut DerivedTables) -> Result<()> {
    let ids = recipes.column("RecipeId")?;
    let images = recipes.column("Images")?;
    for idx in 0..recipes.height() {
        let Some(recipe_id) = any_to_i64(ids.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        for url in row_list_values(images, idx)? {
            let trimmed = url.trim();
            if trimmed.is_empty() {
                continue;
            }
            tables.recipe_images.push(RecipeImage {
                recipe_id,
                image_url: trimmed.to_string(),
            });
        }
    }
    Ok(())
}

fn build_review_rows(
    reviews: &DataFrame,
    known_authors: &HashSet<i64>,
    tables: &mut DerivedTables,
) -> Result<()> {
    let ids = reviews.column("ReviewId")?;
    let author_ids = reviews.column("AuthorId")?;
    let recipe_ids = reviews.column("RecipeId")?;
    let ratings = reviews.column("Rating")?;
    let bodies = reviews.column("Review")?;
    let submitted = reviews.column("DateSubmitted")?;
    let modified = reviews.column("DateModified")?;

    for idx in 0..reviews.height() {
        let Some(review_id) = any_to_i64(ids.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        let Some(author_id) = any_to_i64(author_ids.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        let Some(recipe_id) = any_to_i64(recipe_ids.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        if !known_authors.contains(&author_id) {
            tables.issues.push(DataQualityIssue::UnresolvedAuthor {
                author_id,
                relation: "reviews".to_string(),
            });
        }
        let date_submitted = any_to_string_non_empty(submitted.get(idx).unwrap_or(AnyValue::Null));
        let date_modified = any_to_string_non_empty(modified.get(idx).unwrap_or(AnyValue::Null));
        if let (Some(submitted_at), Some(modified_at)) = (&date_submitted, &date_modified)
            && modified_at < submitted_at
        {
            tables
                .issues
                .push(DataQualityIssue::ReviewDatesOutOfOrder { review_id });
        }
        tables.reviews.push(Review {
            review_id,
            author_id,
            recipe_id,
            rating: any_to_i64(ratings.get(idx).unwrap_or(AnyValue::Null)),
            review: any_to_string_non_empty(bodies.get(idx).unwrap_or(AnyValue::Null)),
            date_submitted,
            date_modified,
        });
    }
    Ok(())
}
