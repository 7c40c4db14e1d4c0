//! Tests for schema management and idempotent loading against an
//! in-memory store.

use larder_model::{
    Author, Category, DerivedTables, Ingredient, Keyword, Nutrition, Recipe, RecipeImage,
    RecipeIngredient, RecipeKeyword, Review,
};
use larder_store::{RelationalLoader, StoreConfig};

fn sample_recipe(recipe_id: i64, author_id: i64) -> Recipe {
    Recipe {
        recipe_id,
        name: Some("Cake".to_string()),
        author_id,
        cook_time: Some(60),
        prep_time: Some(15),
        total_time: Some(75),
        date_published: Some("2019-05-01T08:00:00".to_string()),
        description: Some("plain".to_string()),
        category_id: Some(0),
        nutrition: Nutrition {
            calories: Some(320.0),
            ..Nutrition::default()
        },
        recipe_servings: Some("8".to_string()),
        recipe_yield: Some("1 cake".to_string()),
        recipe_instructions: Some("Mix. Bake.".to_string()),
    }
}

fn sample_tables() -> DerivedTables {
    DerivedTables {
        authors: vec![
            Author {
                author_id: 1,
                name: "alice".to_string(),
            },
            Author {
                author_id: 2,
                name: "bob".to_string(),
            },
        ],
        categories: vec![Category {
            category_id: 0,
            name: "Dessert".to_string(),
        }],
        keywords: vec![Keyword {
            keyword_id: 0,
            keyword: "easy".to_string(),
        }],
        ingredients: vec![Ingredient {
            ingredient_id: 0,
            name: "flour".to_string(),
        }],
        recipes: vec![sample_recipe(100, 1)],
        recipe_images: vec![RecipeImage {
            recipe_id: 100,
            image_url: "https://img/1.jpg".to_string(),
        }],
        recipe_keywords: vec![RecipeKeyword {
            recipe_id: 100,
            keyword_id: 0,
        }],
        recipe_ingredients: vec![RecipeIngredient {
            recipe_id: 100,
            ingredient_id: Some(0),
            ingredient_quantity: Some("2 cups".to_string()),
        }],
        reviews: vec![Review {
            review_id: 500,
            author_id: 2,
            recipe_id: 100,
            rating: Some(5),
            review: Some("fine".to_string()),
            date_submitted: Some("2020-01-01T10:00:00".to_string()),
            date_modified: Some("2020-01-02T10:00:00".to_string()),
        }],
        issues: Vec::new(),
    }
}

fn connected_loader() -> RelationalLoader {
    let loader = RelationalLoader::connect(&StoreConfig::in_memory()).unwrap();
    loader.create_tables().unwrap();
    loader
}

#[test]
fn create_tables_is_idempotent() {
    let loader = connected_loader();
    loader.create_tables().unwrap();
    assert_eq!(loader.table_count("authors").unwrap(), 0);
}

#[test]
fn load_writes_every_relation() {
    let mut loader = connected_loader();
    let report = loader.load(&sample_tables());

    assert!(!report.has_failures());
    assert_eq!(report.rows_for("authors"), Some(2));
    assert_eq!(loader.table_count("authors").unwrap(), 2);
    assert_eq!(loader.table_count("recipes").unwrap(), 1);
    assert_eq!(loader.table_count("reviews").unwrap(), 1);
    assert_eq!(loader.table_count("recipe_images").unwrap(), 1);
    assert!(report.fk_violations.is_empty());
}

#[test]
fn reloading_the_same_run_leaves_counts_unchanged() {
    let mut loader = connected_loader();
    loader.load(&sample_tables());
    let report = loader.load(&sample_tables());

    assert!(!report.has_failures());
    assert_eq!(loader.table_count("authors").unwrap(), 2);
    assert_eq!(loader.table_count("categories").unwrap(), 1);
    assert_eq!(loader.table_count("recipes").unwrap(), 1);
    assert_eq!(loader.table_count("recipe_keywords").unwrap(), 1);
    assert_eq!(loader.table_count("recipe_ingredients").unwrap(), 1);
    assert_eq!(loader.table_count("reviews").unwrap(), 1);
}

#[test]
fn rerun_updates_mutable_attributes_by_natural_key() {
    let mut loader = connected_loader();
    loader.load(&sample_tables());

    let mut updated = sample_tables();
    updated.authors[0].name = "alice_renamed".to_string();
    loader.load(&updated);

    assert_eq!(loader.table_count("authors").unwrap(), 2);
    // The renamed author kept its id and took the new name.
    let report = loader.load(&updated);
    assert_eq!(report.rows_for("authors"), Some(2));
}

#[test]
fn one_failed_relation_does_not_stop_the_rest() {
    let mut loader = connected_loader();
    loader.execute_raw("DROP TABLE reviews").unwrap();

    let report = loader.load(&sample_tables());

    assert!(report.has_failures());
    assert!(report.failed.iter().any(|failure| failure.table == "reviews"));
    // Everything upstream of the broken relation still loaded.
    assert_eq!(report.rows_for("authors"), Some(2));
    assert_eq!(loader.table_count("recipes").unwrap(), 1);
}

#[test]
fn foreign_key_violations_are_surfaced_not_fatal() {
    let mut loader = connected_loader();
    let mut tables = sample_tables();
    // Review by an author that resolved to no Author row.
    tables.reviews.push(Review {
        review_id: 501,
        author_id: 99,
        recipe_id: 100,
        rating: None,
        review: None,
        date_submitted: None,
        date_modified: None,
    });

    let report = loader.load(&tables);

    assert!(!report.has_failures());
    assert_eq!(loader.table_count("reviews").unwrap(), 2);
    assert!(
        report
            .fk_violations
            .iter()
            .any(|violation| violation.table == "reviews"
                && violation.referenced_table == "authors"
                && violation.rows == 1)
    );
}

#[test]
fn drop_tables_clears_the_schema() {
    let mut loader = connected_loader();
    loader.load(&sample_tables());

    loader.drop_tables().unwrap();
    loader.create_tables().unwrap();

    assert_eq!(loader.table_count("authors").unwrap(), 0);
    assert_eq!(loader.table_count("reviews").unwrap(), 0);
}
