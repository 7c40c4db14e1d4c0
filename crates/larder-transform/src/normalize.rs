//! Raw field normalization.
//!
//! Turns the loosely typed source columns into well-typed ones without
//! losing rows: `PT<H>H<M>M` duration strings become integer minutes,
//! timestamps are validated against the fixed source format, free text is
//! scrubbed of embedded double quotes, and the id columns are cast to
//! integers. Callers keep their input frame untouched; every normalizer
//! returns a new frame.
//!
//! A timestamp that fails the source format is a fatal
//! [`DataError::MalformedTimestamp`]; records with untrustworthy dates
//! cannot feed author resolution downstream.

use anyhow::Result;
use chrono::NaiveDateTime;
use polars::prelude::{
    AnyValue, DataFrame, DataType, IntoSeries, NamedFrom, Series, StringChunkedBuilder,
};

use larder_ingest::any_to_string;
use larder_model::DataError;

use crate::lists::row_list_values;

/// Source timestamp format; values are recorded in UTC with a literal `Z`.
const SOURCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Canonical timestamp format carried through the pipeline and into the
/// store. Fixed-width, so lexicographic order is chronological.
const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a `PT<H>H<M>M` duration string into integer minutes.
///
/// Either component may be missing and defaults to 0; a string with
/// neither component yields 0, not an error.
pub fn parse_duration(value: &str) -> i64 {
    let mut hours: i64 = 0;
    let mut minutes: i64 = 0;
    let mut current = String::new();
    for ch in value.trim().chars() {
        if ch.is_ascii_digit() {
            current.push(ch);
        } else {
            match ch {
                'H' => hours = current.parse().unwrap_or(0),
                'M' => minutes = current.parse().unwrap_or(0),
                _ => {}
            }
            current.clear();
        }
    }
    hours * 60 + minutes
}

/// Parse a timestamp in the fixed source format.
pub fn parse_timestamp(column: &str, value: &str) -> Result<NaiveDateTime, DataError> {
    NaiveDateTime::parse_from_str(value, SOURCE_TIMESTAMP_FORMAT).map_err(|_| {
        DataError::MalformedTimestamp {
            column: column.to_string(),
            value: value.to_string(),
        }
    })
}

/// Replace embedded double quotes with single quotes.
pub fn clean_quotes(value: &str) -> String {
    value.replace('"', "'")
}

/// Normalize the review log frame.
///
/// Validates both timestamp columns, casts the id columns to `Int64`,
/// trims author display names, and scrubs quotes from the review body.
pub fn normalize_reviews(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.clone();
    cast_int_column(&mut out, "ReviewId")?;
    cast_int_column(&mut out, "AuthorId")?;
    cast_int_column(&mut out, "RecipeId")?;
    canonicalize_timestamp_column(&mut out, "DateSubmitted")?;
    canonicalize_timestamp_column(&mut out, "DateModified")?;
    rewrite_text_column(&mut out, "AuthorName", |value| value.trim().to_string())?;
    rewrite_text_column(&mut out, "Review", clean_quotes)?;
    Ok(out)
}

/// Normalize the recipe catalog frame.
///
/// Durations become integer minutes, the publish timestamp is validated,
/// the id columns are cast, instruction steps are flattened to one text,
/// and free-text fields are scrubbed of quotes.
pub fn normalize_recipes(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.clone();
    cast_int_column(&mut out, "RecipeId")?;
    cast_int_column(&mut out, "AuthorId")?;
    for column in ["CookTime", "PrepTime", "TotalTime"] {
        duration_column_to_minutes(&mut out, column)?;
    }
    canonicalize_timestamp_column(&mut out, "DatePublished")?;
    rewrite_text_column(&mut out, "AuthorName", |value| value.trim().to_string())?;
    flatten_instructions(&mut out, "RecipeInstructions")?;
    for column in ["Name", "Description", "RecipeServings", "RecipeYield"] {
        rewrite_text_column(&mut out, column, clean_quotes)?;
    }
    clean_list_column(&mut out, "RecipeIngredientParts")?;
    Ok(out)
}

fn cast_int_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let casted = df.column(name)?.cast(&DataType::Int64)?;
    df.with_column(casted)?;
    Ok(())
}

/// Rewrite a duration string column as an `Int64` minute count.
/// Null stays null; any non-null value parses (worst case to 0).
fn duration_column_to_minutes(df: &mut DataFrame, name: &str) -> Result<()> {
    let column = df.column(name)?.clone();
    let mut minutes: Vec<Option<i64>> = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        match value {
            AnyValue::Null => minutes.push(None),
            other => minutes.push(Some(parse_duration(&any_to_string(other)))),
        }
    }
    df.with_column(Series::new(name.into(), minutes))?;
    Ok(())
}

/// Validate a timestamp column against the source format and rewrite it
/// in canonical form. Null and empty values stay null; a non-empty value
/// outside the format fails the run.
fn canonicalize_timestamp_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let column = df.column(name)?.clone();
    let mut builder = StringChunkedBuilder::new(name.into(), df.height());
    for idx in 0..df.height() {
        let raw = any_to_string(column.get(idx).unwrap_or(AnyValue::Null));
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            builder.append_null();
            continue;
        }
        let parsed = parse_timestamp(name, trimmed)?;
        builder.append_value(parsed.format(CANONICAL_TIMESTAMP_FORMAT).to_string());
    }
    df.with_column(builder.finish().into_series())?;
    Ok(())
}

/// Rewrite a text column value-by-value, coercing non-string values to
/// text on the way. Null stays null.
fn rewrite_text_column<F>(df: &mut DataFrame, name: &str, rewrite: F) -> Result<()>
where
    F: Fn(&str) -> String,
{
    let column = df.column(name)?.clone();
    let mut builder = StringChunkedBuilder::new(name.into(), df.height());
    for idx in 0..df.height() {
        match column.get(idx).unwrap_or(AnyValue::Null) {
            AnyValue::Null => builder.append_null(),
            other => builder.append_value(rewrite(&any_to_string(other))),
        }
    }
    df.with_column(builder.finish().into_series())?;
    Ok(())
}

/// Join list-valued instruction steps into a single space-separated text,
/// then scrub quotes. A plain string column passes through the scrub only.
fn flatten_instructions(df: &mut DataFrame, name: &str) -> Result<()> {
    let column = df.column(name)?.clone();
    if !matches!(column.dtype(), DataType::List(_)) {
        return rewrite_text_column(df, name, clean_quotes);
    }
    let mut builder = StringChunkedBuilder::new(name.into(), df.height());
    for idx in 0..df.height() {
        let steps = row_list_values(&column, idx)?;
        if steps.is_empty() {
            builder.append_null();
        } else {
            builder.append_value(clean_quotes(&steps.join(" ")));
        }
    }
    df.with_column(builder.finish().into_series())?;
    Ok(())
}

/// Scrub quotes inside every element of a list column, keeping the list
/// shape. A null list becomes an empty one; both contribute no rows when
/// exploded.
fn clean_list_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let column = df.column(name)?.clone();
    if !matches!(column.dtype(), DataType::List(_)) {
        return rewrite_text_column(df, name, clean_quotes);
    }
    let mut rows: Vec<Series> = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let values: Vec<String> = row_list_values(&column, idx)?
            .iter()
            .map(|value| clean_quotes(value))
            .collect();
        rows.push(Series::new("".into(), values));
    }
    df.with_column(Series::new(name.into(), rows.as_slice()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_hours_and_minutes() {
        assert_eq!(parse_duration("PT1H30M"), 90);
        assert_eq!(parse_duration("PT45M"), 45);
        assert_eq!(parse_duration("PT2H"), 120);
        assert_eq!(parse_duration(""), 0);
    }

    #[test]
    fn duration_ignores_unknown_designators() {
        assert_eq!(parse_duration("PT0S"), 0);
        assert_eq!(parse_duration("banana"), 0);
    }

    #[test]
    fn timestamp_requires_source_format() {
        assert!(parse_timestamp("DateModified", "2020-01-02T10:00:00Z").is_ok());
        let error = parse_timestamp("DateModified", "2020-01-02 10:00:00").unwrap_err();
        assert!(matches!(error, DataError::MalformedTimestamp { .. }));
    }

    #[test]
    fn quotes_become_apostrophes() {
        assert_eq!(clean_quotes(r#"a "great" cake"#), "a 'great' cake");
    }
}
