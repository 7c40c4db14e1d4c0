//! Row-wise access to list-valued columns.

use polars::prelude::{AnyValue, Column, PolarsResult};

use larder_ingest::any_to_string;

/// Collect one row's list elements as strings.
///
/// A null list yields no values. A plain string column is treated as a
/// single-element list so callers handle both encodings of the source
/// columns uniformly. Null elements inside a list are skipped.
pub(crate) fn row_list_values(column: &Column, idx: usize) -> PolarsResult<Vec<String>> {
    if let Ok(list) = column.list() {
        let Some(inner) = list.get_as_series(idx) else {
            return Ok(Vec::new());
        };
        let mut values = Vec::with_capacity(inner.len());
        for element_idx in 0..inner.len() {
            match inner.get(element_idx).unwrap_or(AnyValue::Null) {
                AnyValue::Null => {}
                other => values.push(any_to_string(other)),
            }
        }
        return Ok(values);
    }
    match column.get(idx).unwrap_or(AnyValue::Null) {
        AnyValue::Null => Ok(Vec::new()),
        other => {
            let value = any_to_string(other);
            if value.trim().is_empty() {
                Ok(Vec::new())
            } else {
                Ok(vec![value])
            }
        }
    }
}
