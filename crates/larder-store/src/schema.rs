//! Relation DDL and write statements.
//!
//! Tables are listed in dependency order: every parent precedes the
//! relations that reference it, so iterating [`TABLES`] forward is safe for
//! create/load and backward for drop. Foreign keys are declared inline
//! (SQLite cannot add them after the fact); like the original warehouse
//! target they are informational at write time and checked after load via
//! `PRAGMA foreign_key_check`.
//!
//! Dimension tables (categories, keywords, ingredients) carry run-local
//! surrogate ids constrained unique on both the id and the natural value,
//! so their writes use `INSERT OR REPLACE`: a re-run of the same extract is
//! a no-op, and a renumbered run replaces by whichever key collides.

/// One output relation: its name, idempotent create statement, and
/// upsert statement.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub create: &'static str,
    pub insert: &'static str,
}

pub const CREATE_CATEGORIES: &str = "CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY,
    category_name TEXT NOT NULL UNIQUE
)";

pub const CREATE_AUTHORS: &str = "CREATE TABLE IF NOT EXISTS authors (
    author_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
)";

pub const CREATE_RECIPES: &str = "CREATE TABLE IF NOT EXISTS recipes (
    recipe_id INTEGER PRIMARY KEY,
    name TEXT,
    author_id INTEGER REFERENCES authors (author_id),
    cook_time INTEGER,
    prep_time INTEGER,
    total_time INTEGER,
    date_published TEXT,
    description TEXT,
    category_id INTEGER REFERENCES categories (category_id),
    calories REAL,
    fat_content REAL,
    saturated_fat_content REAL,
    cholesterol_content REAL,
    sodium_content REAL,
    carbohydrate_content REAL,
    fiber_content REAL,
    sugar_content REAL,
    protein_content REAL,
    recipe_servings TEXT,
    recipe_yield TEXT,
    recipe_instructions TEXT
)";

pub const CREATE_RECIPE_IMAGES: &str = "CREATE TABLE IF NOT EXISTS recipe_images (
    recipe_image_id INTEGER PRIMARY KEY AUTOINCREMENT,
    recipe_id INTEGER NOT NULL REFERENCES recipes (recipe_id),
    image_url TEXT,
    UNIQUE (recipe_id, image_url)
)";

pub const CREATE_KEYWORDS: &str = "CREATE TABLE IF NOT EXISTS keywords (
    keyword_id INTEGER PRIMARY KEY,
    keyword TEXT NOT NULL UNIQUE
)";

pub const CREATE_RECIPE_KEYWORDS: &str = "CREATE TABLE IF NOT EXISTS recipe_keywords (
    recipe_keyword_id INTEGER PRIMARY KEY AUTOINCREMENT,
    recipe_id INTEGER NOT NULL REFERENCES recipes (recipe_id),
    keyword_id INTEGER NOT NULL REFERENCES keywords (keyword_id),
    UNIQUE (recipe_id, keyword_id)
)";

pub const CREATE_INGREDIENTS: &str = "CREATE TABLE IF NOT EXISTS ingredients (
    ingredient_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
)";

pub const CREATE_RECIPE_INGREDIENTS: &str = "CREATE TABLE IF NOT EXISTS recipe_ingredients (
    recipe_ingredient_id INTEGER PRIMARY KEY AUTOINCREMENT,
    recipe_id INTEGER NOT NULL REFERENCES recipes (recipe_id),
    ingredient_id INTEGER REFERENCES ingredients (ingredient_id),
    ingredient_quantity TEXT,
    UNIQUE (recipe_id, ingredient_id, ingredient_quantity)
)";

pub const CREATE_REVIEWS: &str = "CREATE TABLE IF NOT EXISTS reviews (
    review_id INTEGER PRIMARY KEY,
    author_id INTEGER NOT NULL REFERENCES authors (author_id),
    recipe_id INTEGER NOT NULL REFERENCES recipes (recipe_id),
    rating INTEGER,
    review TEXT,
    date_submitted TEXT,
    date_modified TEXT
)";

pub const INSERT_CATEGORIES: &str =
    "INSERT OR REPLACE INTO categories (category_id, category_name) VALUES (?1, ?2)";

pub const INSERT_AUTHORS: &str = "INSERT INTO authors (author_id, name)
    VALUES (?1, ?2)
    ON CONFLICT (author_id) DO UPDATE SET name = excluded.name";

pub const INSERT_RECIPES: &str = "INSERT INTO recipes (
        recipe_id, name, author_id, cook_time, prep_time, total_time,
        date_published, description, category_id, calories, fat_content,
        saturated_fat_content, cholesterol_content, sodium_content,
        carbohydrate_content, fiber_content, sugar_content, protein_content,
        recipe_servings, recipe_yield, recipe_instructions
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)
    ON CONFLICT (recipe_id) DO UPDATE SET
        name = excluded.name,
        author_id = excluded.author_id,
        cook_time = excluded.cook_time,
        prep_time = excluded.prep_time,
        total_time = excluded.total_time,
        date_published = excluded.date_published,
        description = excluded.description,
        category_id = excluded.category_id,
        calories = excluded.calories,
        fat_content = excluded.fat_content,
        saturated_fat_content = excluded.saturated_fat_content,
        cholesterol_content = excluded.cholesterol_content,
        sodium_content = excluded.sodium_content,
        carbohydrate_content = excluded.carbohydrate_content,
        fiber_content = excluded.fiber_content,
        sugar_content = excluded.sugar_content,
        protein_content = excluded.protein_content,
        recipe_servings = excluded.recipe_servings,
        recipe_yield = excluded.recipe_yield,
        recipe_instructions = excluded.recipe_instructions";

pub const INSERT_RECIPE_IMAGES: &str = "INSERT INTO recipe_images (recipe_id, image_url)
    VALUES (?1, ?2)
    ON CONFLICT DO NOTHING";

pub const INSERT_KEYWORDS: &str =
    "INSERT OR REPLACE INTO keywords (keyword_id, keyword) VALUES (?1, ?2)";

pub const INSERT_RECIPE_KEYWORDS: &str = "INSERT INTO recipe_keywords (recipe_id, keyword_id)
    VALUES (?1, ?2)
    ON CONFLICT DO NOTHING";

pub const INSERT_INGREDIENTS: &str =
    "INSERT OR REPLACE INTO ingredients (ingredient_id, name) VALUES (?1, ?2)";

pub const INSERT_RECIPE_INGREDIENTS: &str =
    "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, ingredient_quantity)
    VALUES (?1, ?2, ?3)
    ON CONFLICT DO NOTHING";

pub const INSERT_REVIEWS: &str = "INSERT INTO reviews (
        review_id, author_id, recipe_id, rating, review, date_submitted, date_modified
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT (review_id) DO UPDATE SET
        author_id = excluded.author_id,
        recipe_id = excluded.recipe_id,
        rating = excluded.rating,
        review = excluded.review,
        date_submitted = excluded.date_submitted,
        date_modified = excluded.date_modified";

/// All nine relations in dependency (load) order.
pub const TABLES: [TableDef; 9] = [
    TableDef {
        name: "categories",
        create: CREATE_CATEGORIES,
        insert: INSERT_CATEGORIES,
    },
    TableDef {
        name: "authors",
        create: CREATE_AUTHORS,
        insert: INSERT_AUTHORS,
    },
    TableDef {
        name: "recipes",
        create: CREATE_RECIPES,
        insert: INSERT_RECIPES,
    },
    TableDef {
        name: "recipe_images",
        create: CREATE_RECIPE_IMAGES,
        insert: INSERT_RECIPE_IMAGES,
    },
    TableDef {
        name: "keywords",
        create: CREATE_KEYWORDS,
        insert: INSERT_KEYWORDS,
    },
    TableDef {
        name: "recipe_keywords",
        create: CREATE_RECIPE_KEYWORDS,
        insert: INSERT_RECIPE_KEYWORDS,
    },
    TableDef {
        name: "ingredients",
        create: CREATE_INGREDIENTS,
        insert: INSERT_INGREDIENTS,
    },
    TableDef {
        name: "recipe_ingredients",
        create: CREATE_RECIPE_INGREDIENTS,
        insert: INSERT_RECIPE_INGREDIENTS,
    },
    TableDef {
        name: "reviews",
        create: CREATE_REVIEWS,
        insert: INSERT_REVIEWS,
    },
];

/// Relation names in load order.
pub fn table_names() -> Vec<&'static str> {
    TABLES.iter().map(|table| table.name).collect()
}
