pub mod error;
pub mod issue;
pub mod records;
pub mod report;

pub use error::{DataError, Result};
pub use issue::DataQualityIssue;
pub use records::{
    Author, Category, DerivedTables, Ingredient, Keyword, Nutrition, Recipe, RecipeImage,
    RecipeIngredient, RecipeKeyword, Review,
};
pub use report::{FkViolation, LoadFailure, LoadReport, TableLoad};
