//! End-to-end pipeline test: fixture extracts on disk, through ingest,
//! normalize, shape, and load into an in-memory store.

use std::fs::File;

use larder_cli::pipeline::{ingest, normalize, shape};
use larder_store::{RelationalLoader, StoreConfig};
use polars::prelude::{DataFrame, NamedFrom, ParquetWriter, Series};
use tempfile::TempDir;

const RECIPE_COUNT: usize = 10;
const REVIEW_COUNT: usize = 57;

/// Ten recipes by authors 1-10.
fn write_recipes_parquet(dir: &TempDir) -> std::path::PathBuf {
    let ids: Vec<i64> = (0..RECIPE_COUNT as i64).map(|i| 100 + i).collect();
    let authors: Vec<i64> = (1..=RECIPE_COUNT as i64).collect();
    let author_names: Vec<String> = authors.iter().map(|id| format!("chef{id}")).collect();
    let images: Vec<Series> = ids
        .iter()
        .map(|id| Series::new("".into(), &[format!("https://img/{id}.jpg")]))
        .collect();
    let keywords: Vec<Series> = ids
        .iter()
        .map(|_| Series::new("".into(), &["easy", "baked"]))
        .collect();
    let parts: Vec<Series> = ids
        .iter()
        .map(|_| Series::new("".into(), &["flour", "sugar"]))
        .collect();
    let quantities: Vec<Series> = ids
        .iter()
        .map(|_| Series::new("".into(), &["2 cups", "1 cup"]))
        .collect();
    let instructions: Vec<Series> = ids
        .iter()
        .map(|_| Series::new("".into(), &["Mix.", "Bake."]))
        .collect();

    let mut df = DataFrame::new(vec![
        Series::new("RecipeId".into(), ids).into(),
        Series::new("Name".into(), vec!["Cake"; RECIPE_COUNT]).into(),
        Series::new("AuthorId".into(), authors).into(),
        Series::new("AuthorName".into(), author_names).into(),
        Series::new("CookTime".into(), vec!["PT1H"; RECIPE_COUNT]).into(),
        Series::new("PrepTime".into(), vec!["PT15M"; RECIPE_COUNT]).into(),
        Series::new("TotalTime".into(), vec!["PT1H15M"; RECIPE_COUNT]).into(),
        Series::new(
            "DatePublished".into(),
            vec!["2019-05-01T08:00:00Z"; RECIPE_COUNT],
        )
        .into(),
        Series::new("Description".into(), vec!["plain"; RECIPE_COUNT]).into(),
        Series::new("RecipeCategory".into(), vec!["Dessert"; RECIPE_COUNT]).into(),
        Series::new("Calories".into(), vec![320.0; RECIPE_COUNT]).into(),
        Series::new("FatContent".into(), vec![12.0; RECIPE_COUNT]).into(),
        Series::new("SaturatedFatContent".into(), vec![4.0; RECIPE_COUNT]).into(),
        Series::new("CholesterolContent".into(), vec![40.0; RECIPE_COUNT]).into(),
        Series::new("SodiumContent".into(), vec![200.0; RECIPE_COUNT]).into(),
        Series::new("CarbohydrateContent".into(), vec![45.0; RECIPE_COUNT]).into(),
        Series::new("FiberContent".into(), vec![2.0; RECIPE_COUNT]).into(),
        Series::new("SugarContent".into(), vec![30.0; RECIPE_COUNT]).into(),
        Series::new("ProteinContent".into(), vec![5.0; RECIPE_COUNT]).into(),
        Series::new("RecipeServings".into(), vec!["8"; RECIPE_COUNT]).into(),
        Series::new("RecipeYield".into(), vec!["1 cake"; RECIPE_COUNT]).into(),
        Series::new("RecipeInstructions".into(), instructions.as_slice()).into(),
        Series::new("Images".into(), images.as_slice()).into(),
        Series::new("Keywords".into(), keywords.as_slice()).into(),
        Series::new("RecipeIngredientParts".into(), parts.as_slice()).into(),
        Series::new("RecipeIngredientQuantities".into(), quantities.as_slice()).into(),
    ])
    .unwrap();

    let path = dir.path().join("recipes.parquet");
    let file = File::create(&path).unwrap();
    ParquetWriter::new(file).finish(&mut df).unwrap();
    path
}

/// Fifty-seven reviews by authors 1-57; together with the ten recipe
/// authors (1-10) that makes 57 distinct authors overall.
fn write_reviews_csv(dir: &TempDir) -> std::path::PathBuf {
    let mut content = String::from(
        "ReviewId,AuthorId,AuthorName,RecipeId,Rating,Review,DateSubmitted,DateModified\n",
    );
    for i in 1..=REVIEW_COUNT as i64 {
        let recipe_id = 100 + ((i - 1) % RECIPE_COUNT as i64);
        content.push_str(&format!(
            "{i},{i},reviewer{i},{recipe_id},5,Nice,2020-01-01T10:00:00Z,2020-01-02T10:00:00Z\n"
        ));
    }
    let path = dir.path().join("reviews.csv");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn full_pipeline_matches_smoke_counts() {
    let dir = TempDir::new().unwrap();
    let recipes_path = write_recipes_parquet(&dir);
    let reviews_path = write_reviews_csv(&dir);

    let raw = ingest(&recipes_path, &reviews_path).unwrap();
    let frames = normalize(&raw).unwrap();
    let tables = shape(&frames).unwrap();

    assert_eq!(tables.authors.len(), 57);
    assert_eq!(tables.recipes.len(), 10);
    assert_eq!(tables.reviews.len(), 57);
    assert!(tables.issues.is_empty());

    let mut loader = RelationalLoader::connect(&StoreConfig::in_memory()).unwrap();
    loader.create_tables().unwrap();
    let report = loader.load(&tables);

    assert!(!report.has_failures());
    assert!(report.fk_violations.is_empty());
    assert_eq!(loader.table_count("authors").unwrap(), 57);
    assert_eq!(loader.table_count("recipes").unwrap(), 10);
    assert_eq!(loader.table_count("reviews").unwrap(), 57);
    // Two keywords and two folded ingredients across all recipes.
    assert_eq!(loader.table_count("keywords").unwrap(), 2);
    assert_eq!(loader.table_count("ingredients").unwrap(), 2);
    assert_eq!(loader.table_count("recipe_images").unwrap(), 10);

    // Re-running the load is a no-op for every relation.
    let rerun = loader.load(&tables);
    assert!(!rerun.has_failures());
    assert_eq!(loader.table_count("authors").unwrap(), 57);
    assert_eq!(loader.table_count("recipe_keywords").unwrap(), 20);
    assert_eq!(loader.table_count("recipe_ingredients").unwrap(), 20);
}

#[test]
fn file_backed_store_survives_reconnect() {
    let dir = TempDir::new().unwrap();
    let recipes_path = write_recipes_parquet(&dir);
    let reviews_path = write_reviews_csv(&dir);
    let db_path = dir.path().join("larder.db");

    let raw = ingest(&recipes_path, &reviews_path).unwrap();
    let frames = normalize(&raw).unwrap();
    let tables = shape(&frames).unwrap();

    let config = StoreConfig::at_path(&db_path);
    let report = larder_cli::pipeline::load(&tables, &config, false).unwrap();
    assert!(!report.has_failures());

    // The load stage released its connection; a fresh one sees the rows.
    let loader = RelationalLoader::connect(&config).unwrap();
    assert_eq!(loader.table_count("authors").unwrap(), 57);
    assert_eq!(loader.table_count("reviews").unwrap(), 57);
}
