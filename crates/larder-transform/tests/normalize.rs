//! Tests for field normalization.

use larder_model::DataError;
use larder_transform::{normalize_recipes, normalize_reviews};
use polars::prelude::{DataFrame, NamedFrom, Series};

fn reviews_df(date_submitted: Vec<Option<&str>>, date_modified: Vec<Option<&str>>) -> DataFrame {
    let height = date_submitted.len();
    DataFrame::new(vec![
        Series::new("ReviewId".into(), (1..=height as i64).collect::<Vec<_>>()).into(),
        Series::new("AuthorId".into(), vec![10i64; height]).into(),
        Series::new("RecipeId".into(), vec![100i64; height]).into(),
        Series::new("Rating".into(), vec![5i64; height]).into(),
        Series::new("AuthorName".into(), vec!["  alice  "; height]).into(),
        Series::new("Review".into(), vec![r#"the "best" cake"#; height]).into(),
        Series::new("DateSubmitted".into(), date_submitted).into(),
        Series::new("DateModified".into(), date_modified).into(),
    ])
    .unwrap()
}

fn recipes_df(cook_times: Vec<Option<&str>>) -> DataFrame {
    let height = cook_times.len();
    let instructions = Series::new(
        "RecipeInstructions".into(),
        (0..height)
            .map(|_| Series::new("".into(), &[r#"Mix "well"."#, "Bake."]))
            .collect::<Vec<_>>(),
    );
    let parts = Series::new(
        "RecipeIngredientParts".into(),
        (0..height)
            .map(|_| Series::new("".into(), &[r#""self-rising" flour"#]))
            .collect::<Vec<_>>(),
    );
    DataFrame::new(vec![
        Series::new("RecipeId".into(), (1..=height as i64).collect::<Vec<_>>()).into(),
        Series::new("AuthorId".into(), vec![10i64; height]).into(),
        Series::new("AuthorName".into(), vec![" carol "; height]).into(),
        Series::new("Name".into(), vec![r#"A "special" pie"#; height]).into(),
        Series::new("CookTime".into(), cook_times).into(),
        Series::new("PrepTime".into(), vec![Some("PT15M"); height]).into(),
        Series::new("TotalTime".into(), vec![Some("PT1H45M"); height]).into(),
        Series::new(
            "DatePublished".into(),
            vec![Some("2019-05-01T08:00:00Z"); height],
        )
        .into(),
        Series::new("Description".into(), vec!["plain"; height]).into(),
        Series::new("RecipeServings".into(), vec!["8"; height]).into(),
        Series::new("RecipeYield".into(), vec!["1 pie"; height]).into(),
        instructions.into(),
        parts.into(),
    ])
    .unwrap()
}

#[test]
fn durations_become_integer_minutes() {
    let df = recipes_df(vec![Some("PT1H30M"), Some("PT45M"), Some("PT2H"), Some("")]);

    let normalized = normalize_recipes(&df).unwrap();

    let cook = normalized.column("CookTime").unwrap().i64().unwrap();
    assert_eq!(cook.get(0), Some(90));
    assert_eq!(cook.get(1), Some(45));
    assert_eq!(cook.get(2), Some(120));
    assert_eq!(cook.get(3), Some(0));
}

#[test]
fn null_duration_stays_null() {
    let df = recipes_df(vec![Some("PT30M"), None]);

    let normalized = normalize_recipes(&df).unwrap();

    let cook = normalized.column("CookTime").unwrap().i64().unwrap();
    assert_eq!(cook.get(0), Some(30));
    assert_eq!(cook.get(1), None);
}

#[test]
fn timestamps_are_canonicalized() {
    let df = reviews_df(
        vec![Some("2020-01-01T10:00:00Z")],
        vec![Some("2020-01-02T11:30:00Z")],
    );

    let normalized = normalize_reviews(&df).unwrap();

    let modified = normalized.column("DateModified").unwrap().str().unwrap();
    assert_eq!(modified.get(0), Some("2020-01-02T11:30:00"));
}

#[test]
fn malformed_timestamp_fails_the_run() {
    let df = reviews_df(
        vec![Some("2020-01-01 10:00:00")],
        vec![Some("2020-01-02T11:30:00Z")],
    );

    let error = normalize_reviews(&df).unwrap_err();

    let data_error = error.downcast_ref::<DataError>().expect("typed error");
    match data_error {
        DataError::MalformedTimestamp { column, value } => {
            assert_eq!(column, "DateSubmitted");
            assert_eq!(value, "2020-01-01 10:00:00");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn null_timestamp_is_not_an_error() {
    let df = reviews_df(vec![None], vec![Some("2020-01-02T11:30:00Z")]);

    let normalized = normalize_reviews(&df).unwrap();

    let submitted = normalized.column("DateSubmitted").unwrap().str().unwrap();
    assert_eq!(submitted.get(0), None);
}

#[test]
fn author_names_are_trimmed_and_bodies_dequoted() {
    let df = reviews_df(
        vec![Some("2020-01-01T10:00:00Z")],
        vec![Some("2020-01-01T10:00:00Z")],
    );

    let normalized = normalize_reviews(&df).unwrap();

    let names = normalized.column("AuthorName").unwrap().str().unwrap();
    assert_eq!(names.get(0), Some("alice"));
    let bodies = normalized.column("Review").unwrap().str().unwrap();
    assert_eq!(bodies.get(0), Some("the 'best' cake"));
}

#[test]
fn instructions_flatten_to_one_text() {
    let df = recipes_df(vec![Some("PT5M")]);

    let normalized = normalize_recipes(&df).unwrap();

    let instructions = normalized
        .column("RecipeInstructions")
        .unwrap()
        .str()
        .unwrap();
    assert_eq!(instructions.get(0), Some("Mix 'well'. Bake."));
}

#[test]
fn ingredient_part_elements_are_dequoted_in_place() {
    let df = recipes_df(vec![Some("PT5M")]);

    let normalized = normalize_recipes(&df).unwrap();

    let parts = normalized
        .column("RecipeIngredientParts")
        .unwrap()
        .list()
        .unwrap();
    let first = parts.get_as_series(0).unwrap();
    assert_eq!(first.str().unwrap().get(0), Some("'self-rising' flour"));
}

#[test]
fn caller_input_is_left_untouched() {
    let df = recipes_df(vec![Some("PT1H")]);

    let _ = normalize_recipes(&df).unwrap();

    // Still the raw string column on the caller's copy.
    let cook = df.column("CookTime").unwrap().str().unwrap();
    assert_eq!(cook.get(0), Some("PT1H"));
}
