//! CSV export of failed import rows.
//!
//! Each failed row keeps its original raw fields so the user can correct
//! and re-upload; an `error_message` column is appended with the reason.
//! A job with zero failures exports an empty-but-valid result so the UI
//! can always offer the download action.

use serde::Serialize;
use serde_json::Value;

/// Name of the appended reason column.
pub const ERROR_MESSAGE_COLUMN: &str = "error_message";

/// A failed row handed to the exporter.
#[derive(Debug, Clone)]
pub struct FailedRow {
    /// Original row payload as uploaded, keyed by source column name.
    pub raw_data: Value,
    /// Human-readable validation or commit failure.
    pub error: String,
}

/// Materialized export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub csv: String,
    pub total_rows: usize,
}

/// Build the correction CSV for a job's failed rows.
///
/// Column order is the sorted union of every row's raw keys, followed by
/// the trailing [`ERROR_MESSAGE_COLUMN`]. Rows missing a key get an
/// empty cell. Zero rows yields `{ csv: "", total_rows: 0 }`, never an
/// error.
pub fn generate_csv(rows: &[FailedRow]) -> Result<ExportResult, crate::error::CoreError> {
    if rows.is_empty() {
        return Ok(ExportResult {
            csv: String::new(),
            total_rows: 0,
        });
    }

    let mut columns: Vec<String> = rows
        .iter()
        .filter_map(|r| r.raw_data.as_object())
        .flat_map(|obj| obj.keys().cloned())
        .collect();
    columns.sort();
    columns.dedup();

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = columns.iter().map(String::as_str).collect();
    header.push(ERROR_MESSAGE_COLUMN);
    writer
        .write_record(&header)
        .map_err(|e| crate::error::CoreError::Internal(format!("csv write failed: {e}")))?;

    for row in rows {
        let mut record: Vec<String> = columns
            .iter()
            .map(|col| {
                row.raw_data
                    .get(col)
                    .map(cell_text)
                    .unwrap_or_default()
            })
            .collect();
        record.push(row.error.clone());
        writer
            .write_record(&record)
            .map_err(|e| crate::error::CoreError::Internal(format!("csv write failed: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::CoreError::Internal(format!("csv flush failed: {e}")))?;
    let csv = String::from_utf8(bytes)
        .map_err(|e| crate::error::CoreError::Internal(format!("csv not utf-8: {e}")))?;

    Ok(ExportResult {
        csv,
        total_rows: rows.len(),
    })
}

/// Render a JSON cell value as CSV text. Strings are unquoted; other
/// values keep their JSON form.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_failed_rows_is_empty_but_valid() {
        let result = generate_csv(&[]).unwrap();
        assert_eq!(result.csv, "");
        assert_eq!(result.total_rows, 0);
    }

    #[test]
    fn columns_are_sorted_union_plus_error_message() {
        let rows = vec![
            FailedRow {
                raw_data: json!({"upid": "UP-1", "product_name": "Tee"}),
                error: "missing size".to_string(),
            },
            FailedRow {
                raw_data: json!({"product_name": "Hoodie", "color": "Coral"}),
                error: "unmapped color".to_string(),
            },
        ];
        let result = generate_csv(&rows).unwrap();
        let mut lines = result.csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "color,product_name,upid,error_message"
        );
        assert_eq!(lines.next().unwrap(), ",Tee,UP-1,missing size");
        assert_eq!(lines.next().unwrap(), "Coral,Hoodie,,unmapped color");
        assert_eq!(result.total_rows, 2);
    }

    #[test]
    fn non_string_cells_keep_json_form() {
        let rows = vec![FailedRow {
            raw_data: json!({"quantity": 3, "active": true}),
            error: "bad row".to_string(),
        }];
        let result = generate_csv(&rows).unwrap();
        let mut lines = result.csv.lines();
        assert_eq!(lines.next().unwrap(), "active,quantity,error_message");
        assert_eq!(lines.next().unwrap(), "true,3,bad row");
    }

    #[test]
    fn cells_with_commas_are_quoted() {
        let rows = vec![FailedRow {
            raw_data: json!({"description": "Soft, cotton tee"}),
            error: "too long".to_string(),
        }];
        let result = generate_csv(&rows).unwrap();
        assert!(result.csv.contains("\"Soft, cotton tee\""));
    }
}
