//! Rows of the weekly report and where they come from.

mod query;
mod source;

pub use query::*;
pub use source::*;

use mysql::prelude::FromValue;
use mysql::{FromValueError, Row, Value};
use thiserror::Error;

/// Column aliases selected by the summary query, in order.
pub const SUMMARY_COLUMNS: [&str; 5] = [
    "finished_by",
    "sprint_name",
    "module_name",
    "closed_by",
    "consumed",
];

/// Column aliases selected by the detail query, in order.
pub const DETAIL_COLUMNS: [&str; 12] = [
    "task_id",
    "sprint_name",
    "module_name",
    "task_name",
    "story_id",
    "finished_by",
    "closed_by",
    "finished_date",
    "closed_date",
    "estimate",
    "consumed",
    "remaining",
];

/// Hours spent per (finisher, sprint, module) on closed tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub finished_by: Option<String>,
    pub sprint: Option<String>,
    pub module: Option<String>,
    /// Distinct closers of the grouped tasks, joined with `,`.
    pub closed_by: Option<String>,
    pub consumed: f64,
}

/// A single closed or done task with the hours logged on it.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub task_id: u64,
    pub sprint: Option<String>,
    pub module: Option<String>,
    pub title: Option<String>,
    pub story_id: Option<u64>,
    pub finished_by: Option<String>,
    pub closed_by: Option<String>,
    pub finished_date: Option<String>,
    pub closed_date: Option<String>,
    pub estimate: Option<f64>,
    pub consumed: f64,
    pub remaining: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColumnError {
    #[error("column `{column}` is missing from the result")]
    Missing { column: &'static str },
    #[error("column `{column}` has the unexpected value {value}")]
    Invalid { column: &'static str, value: String },
}

/// Converts a result row of one of the report queries.
pub trait ReportRow: Sized {
    fn from_mysql_row(row: Row) -> Result<Self, ColumnError>;
}

fn take<T: FromValue>(row: &mut Row, column: &'static str) -> Result<T, ColumnError> {
    match row.take_opt(column) {
        Some(Ok(value)) => Ok(value),
        Some(Err(FromValueError(value))) => Err(ColumnError::Invalid {
            column,
            value: format!("{:?}", value),
        }),
        None => Err(ColumnError::Missing { column }),
    }
}

/// Reads an hour count. `FLOAT` columns arrive as `f32` and are widened
/// through their shortest decimal form, so `0.1` stays `0.1`. `DECIMAL`
/// results arrive as text.
fn take_hours(row: &mut Row, column: &'static str) -> Result<Option<f64>, ColumnError> {
    let invalid = |value: &Value| ColumnError::Invalid {
        column,
        value: format!("{:?}", value),
    };

    let value: Value = take(row, column)?;
    match value {
        Value::NULL => Ok(None),
        Value::Float(hours) => hours.to_string().parse().map(Some).map_err(|_| invalid(&value)),
        Value::Bytes(ref text) => core::str::from_utf8(text)
            .ok()
            .and_then(|text| text.trim().parse().ok())
            .map(Some)
            .ok_or_else(|| invalid(&value)),
        other => f64::from_value_opt(other)
            .map(Some)
            .map_err(|FromValueError(value)| invalid(&value)),
    }
}

fn take_required_hours(row: &mut Row, column: &'static str) -> Result<f64, ColumnError> {
    take_hours(row, column)?.ok_or(ColumnError::Invalid {
        column,
        value: "NULL".to_string(),
    })
}

impl ReportRow for SummaryRow {
    fn from_mysql_row(mut row: Row) -> Result<Self, ColumnError> {
        Ok(Self {
            finished_by: take(&mut row, "finished_by")?,
            sprint: take(&mut row, "sprint_name")?,
            module: take(&mut row, "module_name")?,
            closed_by: take(&mut row, "closed_by")?,
            consumed: take_required_hours(&mut row, "consumed")?,
        })
    }
}

impl ReportRow for DetailRow {
    fn from_mysql_row(mut row: Row) -> Result<Self, ColumnError> {
        Ok(Self {
            task_id: take(&mut row, "task_id")?,
            sprint: take(&mut row, "sprint_name")?,
            module: take(&mut row, "module_name")?,
            title: take(&mut row, "task_name")?,
            story_id: take(&mut row, "story_id")?,
            finished_by: take(&mut row, "finished_by")?,
            closed_by: take(&mut row, "closed_by")?,
            finished_date: take(&mut row, "finished_date")?,
            closed_date: take(&mut row, "closed_date")?,
            estimate: take_hours(&mut row, "estimate")?,
            consumed: take_required_hours(&mut row, "consumed")?,
            remaining: take_hours(&mut row, "remaining")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use mysql_common::constants::ColumnType;
    use mysql_common::packets::Column;
    use mysql_common::row::new_row;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> Value {
        Value::Bytes(value.as_bytes().to_vec())
    }

    fn make_row(columns: &[(&str, ColumnType, Value)]) -> Row {
        let (meta, values): (Vec<Column>, Vec<Value>) = columns
            .iter()
            .map(|(name, kind, value)| {
                (
                    Column::new(*kind).with_name(name.as_bytes()),
                    value.clone(),
                )
            })
            .unzip();

        new_row(values, Arc::from(meta))
    }

    fn detail_row(estimate: Value, remaining: Value) -> Row {
        use ColumnType::*;

        make_row(&[
            ("task_id", MYSQL_TYPE_LONG, Value::Int(1042)),
            ("sprint_name", MYSQL_TYPE_VAR_STRING, text("Sprint 12")),
            ("module_name", MYSQL_TYPE_VAR_STRING, Value::NULL),
            ("task_name", MYSQL_TYPE_VAR_STRING, text("Fix invoice rounding")),
            ("story_id", MYSQL_TYPE_LONG, Value::NULL),
            ("finished_by", MYSQL_TYPE_VAR_STRING, text("alice")),
            ("closed_by", MYSQL_TYPE_VAR_STRING, Value::NULL),
            ("finished_date", MYSQL_TYPE_VAR_STRING, text("2024-06-05 17:30:00")),
            ("closed_date", MYSQL_TYPE_VAR_STRING, Value::NULL),
            ("estimate", MYSQL_TYPE_FLOAT, estimate),
            ("consumed", MYSQL_TYPE_DOUBLE, Value::Double(7.5)),
            ("remaining", MYSQL_TYPE_FLOAT, remaining),
        ])
    }

    #[test]
    fn test_detail_row_with_nulls() {
        let row = DetailRow::from_mysql_row(detail_row(Value::Float(0.1), Value::NULL)).unwrap();

        assert_eq!(
            row,
            DetailRow {
                task_id: 1042,
                sprint: Some("Sprint 12".to_string()),
                module: None,
                title: Some("Fix invoice rounding".to_string()),
                story_id: None,
                finished_by: Some("alice".to_string()),
                closed_by: None,
                finished_date: Some("2024-06-05 17:30:00".to_string()),
                closed_date: None,
                estimate: Some(0.1),
                consumed: 7.5,
                remaining: None,
            }
        );
    }

    #[test]
    fn test_float_hours_keep_their_decimals() {
        let row =
            DetailRow::from_mysql_row(detail_row(Value::Float(1.3), Value::Float(0.7))).unwrap();

        assert_eq!(row.estimate, Some(1.3));
        assert_eq!(row.remaining, Some(0.7));
    }

    #[test]
    fn test_decimal_and_double_hours() {
        let row =
            DetailRow::from_mysql_row(detail_row(text("2.25"), Value::Double(0.5))).unwrap();

        assert_eq!(row.estimate, Some(2.25));
        assert_eq!(row.remaining, Some(0.5));
    }

    #[test]
    fn test_summary_row() {
        use ColumnType::*;

        let row = make_row(&[
            ("finished_by", MYSQL_TYPE_VAR_STRING, text("alice")),
            ("sprint_name", MYSQL_TYPE_VAR_STRING, text("Sprint 12")),
            ("module_name", MYSQL_TYPE_VAR_STRING, Value::NULL),
            ("closed_by", MYSQL_TYPE_BLOB, text("bob,carol")),
            ("consumed", MYSQL_TYPE_NEWDECIMAL, text("12.5")),
        ]);

        assert_eq!(
            SummaryRow::from_mysql_row(row).unwrap(),
            SummaryRow {
                finished_by: Some("alice".to_string()),
                sprint: Some("Sprint 12".to_string()),
                module: None,
                closed_by: Some("bob,carol".to_string()),
                consumed: 12.5,
            }
        );
    }

    #[test]
    fn test_missing_column() {
        use ColumnType::*;

        let row = make_row(&[
            ("finished_by", MYSQL_TYPE_VAR_STRING, text("alice")),
            ("sprint_name", MYSQL_TYPE_VAR_STRING, text("Sprint 12")),
            ("module_name", MYSQL_TYPE_VAR_STRING, text("Billing")),
            ("consumed", MYSQL_TYPE_DOUBLE, Value::Double(1.0)),
        ]);

        assert_eq!(
            SummaryRow::from_mysql_row(row),
            Err(ColumnError::Missing {
                column: "closed_by"
            })
        );
    }

    #[test]
    fn test_invalid_value_names_the_column() {
        use ColumnType::*;

        let row = make_row(&[
            ("finished_by", MYSQL_TYPE_VAR_STRING, text("alice")),
            ("sprint_name", MYSQL_TYPE_VAR_STRING, text("Sprint 12")),
            ("module_name", MYSQL_TYPE_VAR_STRING, text("Billing")),
            ("closed_by", MYSQL_TYPE_VAR_STRING, text("bob")),
            ("consumed", MYSQL_TYPE_VAR_STRING, text("a lot")),
        ]);

        let error = SummaryRow::from_mysql_row(row).unwrap_err();
        assert!(matches!(
            error,
            ColumnError::Invalid {
                column: "consumed",
                ..
            }
        ));
        assert!(error.to_string().contains("`consumed`"));
    }

    #[test]
    fn test_null_consumed_is_invalid() {
        use ColumnType::*;

        let row = make_row(&[
            ("finished_by", MYSQL_TYPE_VAR_STRING, Value::NULL),
            ("sprint_name", MYSQL_TYPE_VAR_STRING, Value::NULL),
            ("module_name", MYSQL_TYPE_VAR_STRING, Value::NULL),
            ("closed_by", MYSQL_TYPE_VAR_STRING, Value::NULL),
            ("consumed", MYSQL_TYPE_DOUBLE, Value::NULL),
        ]);

        assert_eq!(
            SummaryRow::from_mysql_row(row),
            Err(ColumnError::Invalid {
                column: "consumed",
                value: "NULL".to_string(),
            })
        );
    }
}
