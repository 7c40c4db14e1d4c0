use std::fs::File;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use tracing::{info, info_span};

use larder_model::DerivedTables;
use larder_store::{StoreConfig, table_names};

use crate::cli::RunArgs;
use crate::pipeline::{ingest, load, normalize, shape};
use crate::summary::apply_table_style;
use crate::types::RunResult;

/// Print the output relations in load order.
pub fn run_tables() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Relation", "Role"]);
    apply_table_style(&mut table);
    for name in table_names() {
        table.add_row(vec![name, relation_role(name)]);
    }
    println!("{table}");
    Ok(())
}

fn relation_role(name: &str) -> &'static str {
    match name {
        "categories" | "keywords" | "ingredients" => "dimension",
        "authors" => "entity",
        "recipes" | "reviews" => "fact",
        "recipe_images" => "weak relation",
        _ => "join relation",
    }
}

/// Run the full pipeline: ingest, normalize, shape, and (unless dry-run)
/// load.
pub fn run_pipeline(args: &RunArgs) -> Result<RunResult> {
    if args.database.is_none() && !args.dry_run {
        bail!("either --database <PATH> or --dry-run is required");
    }
    let database = args
        .database
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| ":memory:".to_string());
    let run_span = info_span!("run", database = %database);
    let _run_guard = run_span.enter();
    let run_start = Instant::now();

    let raw = ingest(&args.recipes, &args.reviews)?;
    let frames = normalize(&raw)?;
    let tables = shape(&frames)?;

    let derived = derived_counts(&tables);
    let mut errors = Vec::new();

    let report = if args.dry_run {
        None
    } else {
        let config = match &args.database {
            Some(path) => StoreConfig::at_path(path),
            None => StoreConfig::in_memory(),
        };
        let report = load(&tables, &config, args.drop_existing)?;
        for failure in &report.failed {
            errors.push(format!("{}: {}", failure.table, failure.error));
        }
        Some(report)
    };

    let result = RunResult {
        database,
        dry_run: args.dry_run,
        derived,
        report,
        issues: tables.issues.clone(),
        errors,
    };

    if let Some(path) = &args.report {
        let payload = serde_json::json!({
            "database": &result.database,
            "dry_run": result.dry_run,
            "report": &result.report,
            "issues": &result.issues,
        });
        let file =
            File::create(path).with_context(|| format!("create report {}", path.display()))?;
        serde_json::to_writer_pretty(file, &payload)
            .with_context(|| format!("write report {}", path.display()))?;
    }

    info!(
        duration_ms = run_start.elapsed().as_millis(),
        issues = result.issues.len(),
        "run complete"
    );
    Ok(result)
}

/// Derived row counts per relation, in load order.
fn derived_counts(tables: &DerivedTables) -> Vec<(String, usize)> {
    vec![
        ("categories".to_string(), tables.categories.len()),
        ("authors".to_string(), tables.authors.len()),
        ("recipes".to_string(), tables.recipes.len()),
        ("recipe_images".to_string(), tables.recipe_images.len()),
        ("keywords".to_string(), tables.keywords.len()),
        ("recipe_keywords".to_string(), tables.recipe_keywords.len()),
        ("ingredients".to_string(), tables.ingredients.len()),
        (
            "recipe_ingredients".to_string(),
            tables.recipe_ingredients.len(),
        ),
        ("reviews".to_string(), tables.reviews.len()),
    ]
}
