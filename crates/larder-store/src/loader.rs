//! Idempotent relational loading.
//!
//! The loader owns the store connection for the duration of the load and
//! releases it on every exit path when it drops. Each relation is written
//! in its own transaction; a failed relation rolls back, is recorded in
//! the [`LoadReport`], and does not stop the remaining relations from
//! loading.

use std::path::PathBuf;

use rusqlite::{Connection, params};
use thiserror::Error;
use tracing::{debug, info, warn};

use larder_model::{
    Author, Category, DerivedTables, FkViolation, Ingredient, Keyword, LoadReport, Recipe,
    RecipeImage, RecipeIngredient, RecipeKeyword, Review,
};

use crate::schema::TABLES;

/// Errors raised by schema management and connection handling.
/// Per-table write failures are not raised; they land in the report.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connect(#[source] rusqlite::Error),

    #[error("schema statement failed: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("store query failed: {0}")]
    Query(#[source] rusqlite::Error),
}

/// Explicit store configuration; there is no ambient global state.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    path: Option<PathBuf>,
}

impl StoreConfig {
    /// An in-memory store, useful for tests and dry runs.
    pub fn in_memory() -> Self {
        Self { path: None }
    }

    /// A file-backed store at the given path, created if absent.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Dependency-ordered schema management and upsert writes against the
/// relational store.
pub struct RelationalLoader {
    conn: Connection,
}

impl RelationalLoader {
    /// Open a connection for the configured store.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let conn = match config.path() {
            Some(path) => {
                let conn = Connection::open(path).map_err(StoreError::Connect)?;
                conn.pragma_update(None, "journal_mode", "WAL")
                    .map_err(StoreError::Connect)?;
                conn.pragma_update(None, "synchronous", "NORMAL")
                    .map_err(StoreError::Connect)?;
                conn
            }
            None => Connection::open_in_memory().map_err(StoreError::Connect)?,
        };
        // Foreign keys are declared inline but, per the schema contract, are
        // informational at write time and surfaced after load via
        // `PRAGMA foreign_key_check`. Pin enforcement off so the bundled
        // SQLite's non-standard `SQLITE_DEFAULT_FOREIGN_KEYS=1` default does
        // not turn per-row constraint failures fatal.
        conn.pragma_update(None, "foreign_keys", "OFF")
            .map_err(StoreError::Connect)?;
        debug!(
            database = %config
                .path()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string()),
            "store connected"
        );
        Ok(Self { conn })
    }

    /// Create all relations if absent, parent tables first.
    pub fn create_tables(&self) -> Result<(), StoreError> {
        for table in &TABLES {
            self.conn
                .execute(table.create, [])
                .map_err(StoreError::Schema)?;
        }
        debug!(tables = TABLES.len(), "schema ensured");
        Ok(())
    }

    /// Drop all relations, children first so referencing tables never
    /// outlive their parents.
    pub fn drop_tables(&self) -> Result<(), StoreError> {
        for table in TABLES.iter().rev() {
            self.conn
                .execute(&format!("DROP TABLE IF EXISTS {}", table.name), [])
                .map_err(StoreError::Schema)?;
        }
        debug!(tables = TABLES.len(), "schema dropped");
        Ok(())
    }

    /// Write every derived relation in dependency order.
    ///
    /// A failed relation is rolled back and recorded; the rest still load.
    /// The report also carries any foreign key violations found once all
    /// writes settle.
    pub fn load(&mut self, tables: &DerivedTables) -> LoadReport {
        let mut report = LoadReport::default();
        self.load_step(&mut report, "categories", |conn| {
            write_categories(conn, &tables.categories)
        });
        self.load_step(&mut report, "authors", |conn| {
            write_authors(conn, &tables.authors)
        });
        self.load_step(&mut report, "recipes", |conn| {
            write_recipes(conn, &tables.recipes)
        });
        self.load_step(&mut report, "recipe_images", |conn| {
            write_recipe_images(conn, &tables.recipe_images)
        });
        self.load_step(&mut report, "keywords", |conn| {
            write_keywords(conn, &tables.keywords)
        });
        self.load_step(&mut report, "recipe_keywords", |conn| {
            write_recipe_keywords(conn, &tables.recipe_keywords)
        });
        self.load_step(&mut report, "ingredients", |conn| {
            write_ingredients(conn, &tables.ingredients)
        });
        self.load_step(&mut report, "recipe_ingredients", |conn| {
            write_recipe_ingredients(conn, &tables.recipe_ingredients)
        });
        self.load_step(&mut report, "reviews", |conn| {
            write_reviews(conn, &tables.reviews)
        });

        match self.check_foreign_keys() {
            Ok(violations) => report.fk_violations = violations,
            Err(error) => warn!(%error, "foreign key check failed"),
        }
        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            fk_violations = report.fk_violations.len(),
            "load complete"
        );
        report
    }

    fn load_step<F>(&mut self, report: &mut LoadReport, table: &str, write: F)
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<usize>,
    {
        match write(&mut self.conn) {
            Ok(rows) => {
                debug!(table, rows, "relation loaded");
                report.record_success(table, rows);
            }
            Err(error) => {
                warn!(table, %error, "relation load failed");
                report.record_failure(table, error.to_string());
            }
        }
    }

    /// Report rows violating the declared foreign keys, grouped by the
    /// referencing and referenced relation.
    pub fn check_foreign_keys(&self) -> Result<Vec<FkViolation>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("PRAGMA foreign_key_check")
            .map_err(StoreError::Query)?;
        let rows = stmt
            .query_map([], |row| {
                let table: String = row.get(0)?;
                let referenced: String = row.get(2)?;
                Ok((table, referenced))
            })
            .map_err(StoreError::Query)?;

        let mut grouped: Vec<FkViolation> = Vec::new();
        for row in rows {
            let (table, referenced_table) = row.map_err(StoreError::Query)?;
            match grouped
                .iter_mut()
                .find(|v| v.table == table && v.referenced_table == referenced_table)
            {
                Some(violation) => violation.rows += 1,
                None => grouped.push(FkViolation {
                    table,
                    referenced_table,
                    rows: 1,
                }),
            }
        }
        Ok(grouped)
    }

    /// Current row count of one relation.
    pub fn table_count(&self, table: &str) -> Result<usize, StoreError> {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|count| count as usize)
            .map_err(StoreError::Query)
    }

    /// Execute a raw statement; used by tests to perturb the store.
    pub fn execute_raw(&self, sql: &str) -> Result<usize, StoreError> {
        self.conn.execute(sql, []).map_err(StoreError::Query)
    }
}

fn write_categories(conn: &mut Connection, rows: &[Category]) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let mut changed = 0;
    {
        let mut stmt = tx.prepare(crate::schema::INSERT_CATEGORIES)?;
        for row in rows {
            changed += stmt.execute(params![row.category_id, row.name])?;
        }
    }
    tx.commit()?;
    Ok(changed)
}

fn write_authors(conn: &mut Connection, rows: &[Author]) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let mut changed = 0;
    {
        let mut stmt = tx.prepare(crate::schema::INSERT_AUTHORS)?;
        for row in rows {
            changed += stmt.execute(params![row.author_id, row.name])?;
        }
    }
    tx.commit()?;
    Ok(changed)
}

fn write_recipes(conn: &mut Connection, rows: &[Recipe]) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let mut changed = 0;
    {
        let mut stmt = tx.prepare(crate::schema::INSERT_RECIPES)?;
        for row in rows {
            changed += stmt.execute(params![
                row.recipe_id,
                row.name,
                row.author_id,
                row.cook_time,
                row.prep_time,
                row.total_time,
                row.date_published,
                row.description,
                row.category_id,
                row.nutrition.calories,
                row.nutrition.fat_content,
                row.nutrition.saturated_fat_content,
                row.nutrition.cholesterol_content,
                row.nutrition.sodium_content,
                row.nutrition.carbohydrate_content,
                row.nutrition.fiber_content,
                row.nutrition.sugar_content,
                row.nutrition.protein_content,
                row.recipe_servings,
                row.recipe_yield,
                row.recipe_instructions,
            ])?;
        }
    }
    tx.commit()?;
    Ok(changed)
}

fn write_recipe_images(conn: &mut Connection, rows: &[RecipeImage]) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let mut changed = 0;
    {
        let mut stmt = tx.prepare(crate::schema::INSERT_RECIPE_IMAGES)?;
        for row in rows {
            changed += stmt.execute(params![row.recipe_id, row.image_url])?;
        }
    }
    tx.commit()?;
    Ok(changed)
}

fn write_keywords(conn: &mut Connection, rows: &[Keyword]) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let mut changed = 0;
    {
        let mut stmt = tx.prepare(crate::schema::INSERT_KEYWORDS)?;
        for row in rows {
            changed += stmt.execute(params![row.keyword_id, row.keyword])?;
        }
    }
    tx.commit()?;
    Ok(changed)
}

fn write_recipe_keywords(conn: &mut Connection, rows: &[RecipeKeyword]) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let mut changed = 0;
    {
        let mut stmt = tx.prepare(crate::schema::INSERT_RECIPE_KEYWORDS)?;
        for row in rows {
            changed += stmt.execute(params![row.recipe_id, row.keyword_id])?;
        }
    }
    tx.commit()?;
    Ok(changed)
}

fn write_ingredients(conn: &mut Connection, rows: &[Ingredient]) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let mut changed = 0;
    {
        let mut stmt = tx.prepare(crate::schema::INSERT_INGREDIENTS)?;
        for row in rows {
            changed += stmt.execute(params![row.ingredient_id, row.name])?;
        }
    }
    tx.commit()?;
    Ok(changed)
}

fn write_recipe_ingredients(
    conn: &mut Connection,
    rows: &[RecipeIngredient],
) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let mut changed = 0;
    {
        let mut stmt = tx.prepare(crate::schema::INSERT_RECIPE_INGREDIENTS)?;
        for row in rows {
            changed += stmt.execute(params![
                row.recipe_id,
                row.ingredient_id,
                row.ingredient_quantity
            ])?;
        }
    }
    tx.commit()?;
    Ok(changed)
}

fn write_reviews(conn: &mut Connection, rows: &[Review]) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let mut changed = 0;
    {
        let mut stmt = tx.prepare(crate::schema::INSERT_REVIEWS)?;
        for row in rows {
            changed += stmt.execute(params![
                row.review_id,
                row.author_id,
                row.recipe_id,
                row.rating,
                row.review,
                row.date_submitted,
                row.date_modified,
            ])?;
        }
    }
    tx.commit()?;
    Ok(changed)
}
