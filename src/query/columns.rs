use bson::{Bson, Document};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{GatewayError, Result};
use crate::metrics;

/// A type-homogeneous value column: one growable vector per supported
/// scalar kind. The variant is fixed once, from the first row's projected
/// value, and every later row either extracts into it or is dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValueColumn {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Bool(Vec<bool>),
    String(Vec<String>),
    Timestamp(Vec<DateTime<Utc>>),
}

impl ValueColumn {
    /// Picks the column kind from a sample value. Returns `None` for shapes
    /// no column can be built from (arrays, documents, null, binary, ...).
    fn for_sample(sample: &Bson, capacity: usize) -> Option<Self> {
        match sample {
            Bson::Int32(_) | Bson::Int64(_) => Some(Self::Int(Vec::with_capacity(capacity))),
            Bson::Double(_) => Some(Self::Float(Vec::with_capacity(capacity))),
            Bson::Boolean(_) => Some(Self::Bool(Vec::with_capacity(capacity))),
            Bson::String(_) => Some(Self::String(Vec::with_capacity(capacity))),
            Bson::DateTime(_) => Some(Self::Timestamp(Vec::with_capacity(capacity))),
            _ => None,
        }
    }

    /// Attempts the typed extraction for this column's kind. No cross-kind
    /// conversion: a double never lands in an integer column. Returns false
    /// when the value doesn't fit.
    fn push(&mut self, value: &Bson) -> bool {
        match (self, value) {
            (Self::Int(values), Bson::Int32(v)) => values.push(i64::from(*v)),
            (Self::Int(values), Bson::Int64(v)) => values.push(*v),
            (Self::Float(values), Bson::Double(v)) => values.push(*v),
            (Self::Bool(values), Bson::Boolean(v)) => values.push(*v),
            (Self::String(values), Bson::String(v)) => values.push(v.clone()),
            (Self::Timestamp(values), Bson::DateTime(v)) => values.push(v.to_chrono()),
            _ => return false,
        }
        true
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Int(values) => values.len(),
            Self::Float(values) => values.len(),
            Self::Bool(values) => values.len(),
            Self::String(values) => values.len(),
            Self::Timestamp(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Two parallel, equal-length sequences ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnPair {
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: ValueColumn,
}

/// Converts ordered rows into a [`ColumnPair`] for the projected field.
///
/// An empty row set fails with the empty-result error so callers can tell
/// "matched nothing" from a populated response; so does a first row whose
/// projected value is absent or of an unsupported shape, since no column
/// type can be inferred from it. After inference, a row that fails to yield
/// both a usable timestamp (only BSON datetimes are recognized) and a value
/// of the inferred kind is skipped silently. Timestamps and values only
/// ever grow in lock-step, and input order is preserved.
pub fn assemble(rows: &[Document], projection: &str) -> Result<ColumnPair> {
    let first = rows
        .first()
        .ok_or_else(|| GatewayError::NoData("query returned no rows".to_string()))?;

    let sample = first.get(projection).ok_or_else(|| {
        GatewayError::NoData(format!("first row carries no '{projection}' field"))
    })?;

    let mut values = ValueColumn::for_sample(sample, rows.len()).ok_or_else(|| {
        GatewayError::NoData(format!(
            "cannot build a column from a {:?} value",
            sample.element_type()
        ))
    })?;

    let mut timestamps = Vec::with_capacity(rows.len());
    for row in rows {
        let timestamp = match row.get("timestamp") {
            Some(Bson::DateTime(ts)) => ts.to_chrono(),
            _ => {
                metrics::record_skipped_row();
                debug!(?row, "skipping row without a usable timestamp");
                continue;
            }
        };

        let Some(value) = row.get(projection) else {
            metrics::record_skipped_row();
            debug!(?row, projection, "skipping row without the projected field");
            continue;
        };

        if values.push(value) {
            timestamps.push(timestamp);
        } else {
            metrics::record_skipped_row();
            debug!(?value, "skipping row with a mismatched value type");
        }
    }

    Ok(ColumnPair { timestamps, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use pretty_assertions::assert_eq;

    fn ts(millis: i64) -> bson::DateTime {
        bson::DateTime::from_millis(millis)
    }

    #[test]
    fn empty_rows_fail_with_no_data() {
        let err = assemble(&[], "cpu").unwrap_err();
        assert_eq!(err.kind(), "no_data");
    }

    #[test]
    fn integer_rows_build_an_integer_column() {
        let rows = vec![
            doc! { "timestamp": ts(1_000), "cpu": 5_i64 },
            doc! { "timestamp": ts(2_000), "cpu": 7_i64 },
        ];
        let pair = assemble(&rows, "cpu").unwrap();
        assert_eq!(pair.timestamps, vec![ts(1_000).to_chrono(), ts(2_000).to_chrono()]);
        assert_eq!(pair.values, ValueColumn::Int(vec![5, 7]));
    }

    #[test]
    fn int32_and_int64_share_the_integer_column() {
        let rows = vec![
            doc! { "timestamp": ts(1_000), "cpu": 5_i32 },
            doc! { "timestamp": ts(2_000), "cpu": 7_i64 },
        ];
        let pair = assemble(&rows, "cpu").unwrap();
        assert_eq!(pair.values, ValueColumn::Int(vec![5, 7]));
    }

    #[test]
    fn rows_without_timestamps_are_skipped() {
        let rows = vec![
            doc! { "timestamp": ts(1_000), "cpu": 5_i64 },
            doc! { "cpu": 6_i64 },
            doc! { "timestamp": "not-a-datetime", "cpu": 7_i64 },
        ];
        let pair = assemble(&rows, "cpu").unwrap();
        assert_eq!(pair.timestamps.len(), 1);
        assert_eq!(pair.values, ValueColumn::Int(vec![5]));
    }

    #[test]
    fn mismatched_value_types_are_dropped_not_converted() {
        let rows = vec![
            doc! { "timestamp": ts(1_000), "cpu": 5_i64 },
            doc! { "timestamp": ts(2_000), "cpu": 6.5_f64 },
            doc! { "timestamp": ts(3_000), "cpu": 7_i64 },
        ];
        let pair = assemble(&rows, "cpu").unwrap();
        assert_eq!(pair.values, ValueColumn::Int(vec![5, 7]));
        assert_eq!(pair.timestamps.len(), pair.values.len());
    }

    #[test]
    fn columns_always_grow_in_lock_step() {
        let rows = vec![
            doc! { "timestamp": ts(1_000), "cpu": "a" },
            doc! { "timestamp": ts(2_000) },
            doc! { "cpu": "b" },
            doc! { "timestamp": ts(4_000), "cpu": "c" },
        ];
        let pair = assemble(&rows, "cpu").unwrap();
        assert_eq!(pair.timestamps.len(), pair.values.len());
        assert_eq!(pair.values, ValueColumn::String(vec!["a".into(), "c".into()]));
    }

    #[test]
    fn first_row_without_the_field_is_no_data() {
        let rows = vec![doc! { "timestamp": ts(1_000), "mem": 1_i64 }];
        let err = assemble(&rows, "cpu").unwrap_err();
        assert_eq!(err.kind(), "no_data");
    }

    #[test]
    fn unsupported_first_value_shape_is_no_data() {
        let rows = vec![doc! { "timestamp": ts(1_000), "cpu": [1, 2, 3] }];
        let err = assemble(&rows, "cpu").unwrap_err();
        assert_eq!(err.kind(), "no_data");
    }

    #[test]
    fn float_bool_and_datetime_columns_extract() {
        let rows = vec![doc! { "timestamp": ts(1_000), "cpu": 0.5_f64 }];
        assert_eq!(
            assemble(&rows, "cpu").unwrap().values,
            ValueColumn::Float(vec![0.5])
        );

        let rows = vec![doc! { "timestamp": ts(1_000), "up": true }];
        assert_eq!(
            assemble(&rows, "up").unwrap().values,
            ValueColumn::Bool(vec![true])
        );

        let rows = vec![doc! { "timestamp": ts(1_000), "seen_at": ts(500) }];
        assert_eq!(
            assemble(&rows, "seen_at").unwrap().values,
            ValueColumn::Timestamp(vec![ts(500).to_chrono()])
        );
    }

    #[test]
    fn input_order_is_preserved() {
        let rows = vec![
            doc! { "timestamp": ts(3_000), "cpu": 3_i64 },
            doc! { "timestamp": ts(1_000), "cpu": 1_i64 },
            doc! { "timestamp": ts(2_000), "cpu": 2_i64 },
        ];
        let pair = assemble(&rows, "cpu").unwrap();
        assert_eq!(pair.values, ValueColumn::Int(vec![3, 1, 2]));
    }
}
