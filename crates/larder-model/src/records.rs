//! Typed rows for the nine output relations.
//!
//! Every pipeline run derives these records freshly from the two source
//! extracts; the loader upserts them, so a record's natural key (author id,
//! recipe id, review id, or a dimension's natural value) identifies the row
//! across runs even when surrogate keys are renumbered.

use serde::Serialize;

/// One canonical display name per source author id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub author_id: i64,
    pub name: String,
}

/// Recipe category dimension row. Surrogate key, run-local numbering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub category_id: i64,
    pub name: String,
}

/// Keyword dimension row. Surrogate key, run-local numbering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyword {
    pub keyword_id: i64,
    pub keyword: String,
}

/// Ingredient dimension row. The name is stored case-folded so that
/// differently-cased spellings share one surrogate key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    pub ingredient_id: i64,
    pub name: String,
}

/// Nine numeric nutrition facts carried on every recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Nutrition {
    pub calories: Option<f64>,
    pub fat_content: Option<f64>,
    pub saturated_fat_content: Option<f64>,
    pub cholesterol_content: Option<f64>,
    pub sodium_content: Option<f64>,
    pub carbohydrate_content: Option<f64>,
    pub fiber_content: Option<f64>,
    pub sugar_content: Option<f64>,
    pub protein_content: Option<f64>,
}

/// A fully normalized recipe row.
///
/// Durations are integer minutes (or null when the source had none);
/// timestamps are canonical `YYYY-MM-DDTHH:MM:SS` text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub recipe_id: i64,
    pub name: Option<String>,
    pub author_id: i64,
    pub cook_time: Option<i64>,
    pub prep_time: Option<i64>,
    pub total_time: Option<i64>,
    pub date_published: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub nutrition: Nutrition,
    pub recipe_servings: Option<String>,
    pub recipe_yield: Option<String>,
    pub recipe_instructions: Option<String>,
}

/// Weak relation: one image URL attached to a recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeImage {
    pub recipe_id: i64,
    pub image_url: String,
}

/// Join relation between recipes and the keyword dimension.
/// Duplicate pairs within one recipe are collapsed before this point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeKeyword {
    pub recipe_id: i64,
    pub keyword_id: i64,
}

/// Join relation between recipes and the ingredient dimension, carrying
/// the original-case quantity text. A null `ingredient_id` marks an
/// alignment row whose name had no dimension match; the row is kept and
/// the mismatch is surfaced separately as a data quality issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeIngredient {
    pub recipe_id: i64,
    pub ingredient_id: Option<i64>,
    pub ingredient_quantity: Option<String>,
}

/// A normalized review row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub review_id: i64,
    pub author_id: i64,
    pub recipe_id: i64,
    pub rating: Option<i64>,
    pub review: Option<String>,
    pub date_submitted: Option<String>,
    pub date_modified: Option<String>,
}

/// The full set of derived relation rows produced by one shaping pass,
/// plus every data quality issue observed along the way.
#[derive(Debug, Clone, Default)]
pub struct DerivedTables {
    pub authors: Vec<Author>,
    pub categories: Vec<Category>,
    pub keywords: Vec<Keyword>,
    pub ingredients: Vec<Ingredient>,
    pub recipes: Vec<Recipe>,
    pub recipe_images: Vec<RecipeImage>,
    pub recipe_keywords: Vec<RecipeKeyword>,
    pub recipe_ingredients: Vec<RecipeIngredient>,
    pub reviews: Vec<Review>,
    pub issues: Vec<crate::issue::DataQualityIssue>,
}

impl DerivedTables {
    /// Total number of relation rows across all nine tables.
    pub fn row_count(&self) -> usize {
        self.authors.len()
            + self.categories.len()
            + self.keywords.len()
            + self.ingredients.len()
            + self.recipes.len()
            + self.recipe_images.len()
            + self.recipe_keywords.len()
            + self.recipe_ingredients.len()
            + self.reviews.len()
    }
}
