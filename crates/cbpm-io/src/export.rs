//! # Record Export
//!
//! Writes lists of records to CSV or JSON files for spreadsheets and
//! backups.
//!
//! ## CSV Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  header  = field names of the first record, in declaration order       │
//! │  row i   = record i's values in header order                           │
//! │                                                                         │
//! │  null / missing field   → empty cell                                    │
//! │  string                 → as is                                         │
//! │  number / bool          → Display form (4500, 2.5, true)               │
//! │  array / object         → compact JSON                                  │
//! │  line endings           → CRLF                                          │
//! │                                                                         │
//! │  Fails, writing nothing, when the list is empty, a record is not a     │
//! │  map, or a later record has a field the header lacks.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each format comes as a `Result` function (`write_csv`, `write_json`) and a
//! `bool` wrapper (`export_to_csv`, `export_to_json`) that logs the error.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{IoError, IoResult};

// =============================================================================
// CSV
// =============================================================================

/// Writes `records` to `path` as CSV.
pub fn write_csv<T: Serialize>(records: &[T], path: &Path) -> IoResult<()> {
    let (header, rows) = tabulate(records)?;

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_path(path)?;
    writer.write_record(&header)?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    debug!(?path, rows = rows.len(), "CSV export written");
    Ok(())
}

/// [`write_csv`], reporting success as a `bool`.
///
/// ## Example
/// ```rust
/// use cbpm_io::export::export_to_csv;
/// use serde_json::json;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("stock.csv");
///
/// assert!(export_to_csv(&[json!({"material": "Ciment", "quantity": 40})], &path));
/// assert!(!export_to_csv::<serde_json::Value>(&[], &path));
/// ```
pub fn export_to_csv<T: Serialize>(records: &[T], path: &Path) -> bool {
    match write_csv(records, path) {
        Ok(()) => true,
        Err(e) => {
            warn!(?path, error = %e, "CSV export failed");
            false
        }
    }
}

/// Converts records into a header and rows of cells, validating every
/// record before anything is written.
fn tabulate<T: Serialize>(records: &[T]) -> IoResult<(Vec<String>, Vec<Vec<String>>)> {
    if records.is_empty() {
        return Err(IoError::EmptyExport);
    }

    let maps = records
        .iter()
        .enumerate()
        .map(|(index, record)| match serde_json::to_value(record)? {
            Value::Object(map) => Ok(map),
            _ => Err(IoError::NotARecord { index }),
        })
        .collect::<IoResult<Vec<Map<String, Value>>>>()?;

    let header: Vec<String> = maps[0].keys().cloned().collect();

    let rows = maps
        .iter()
        .enumerate()
        .map(|(index, map)| {
            if let Some(extra) = map.keys().find(|key| !header.contains(key)) {
                return Err(IoError::FieldMismatch {
                    index,
                    field: extra.clone(),
                });
            }
            Ok(header
                .iter()
                .map(|field| map.get(field).map(cell).unwrap_or_default())
                .collect())
        })
        .collect::<IoResult<Vec<Vec<String>>>>()?;

    Ok((header, rows))
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

// =============================================================================
// JSON
// =============================================================================

/// Writes `data` to `path` as pretty-printed UTF-8 JSON.
///
/// Serialization finishes before the file is created, so a value that
/// fails to serialize leaves no file behind.
pub fn write_json<T: Serialize + ?Sized>(data: &T, path: &Path) -> IoResult<()> {
    let mut contents = serde_json::to_vec_pretty(data)?;
    contents.push(b'\n');
    fs::write(path, contents)?;

    debug!(?path, "JSON export written");
    Ok(())
}

/// [`write_json`], reporting success as a `bool`.
pub fn export_to_json<T: Serialize + ?Sized>(data: &T, path: &Path) -> bool {
    match write_json(data, path) {
        Ok(()) => true,
        Err(e) => {
            warn!(?path, error = %e, "JSON export failed");
            false
        }
    }
}

/// Reads back a file written by [`write_json`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> IoResult<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cbpm_core::datetime::parse_date;
    use cbpm_core::reporting::{inventory_report_at, InventoryReport};
    use cbpm_core::types::{InventoryLine, MaterialCategory};
    use serde_json::json;
    use tempfile::tempdir;

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_csv_header_follows_first_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let records = vec![
            json!({"name": "Ciment", "qty": 40, "price": 4500.5}),
            json!({"name": "Fer 12", "qty": 3}),
        ];

        write_csv(&records, &path).unwrap();
        assert_eq!(
            read(&path),
            "name,qty,price\r\nCiment,40,4500.5\r\nFer 12,3,\r\n"
        );
    }

    #[test]
    fn test_csv_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cells.csv");
        let records = vec![json!({
            "note": null,
            "active": true,
            "tags": ["a", "b"],
            "city": "Yaoundé, Centre"
        })];

        write_csv(&records, &path).unwrap();
        assert_eq!(
            read(&path),
            "note,active,tags,city\r\n,true,\"[\"\"a\"\",\"\"b\"\"]\",\"Yaoundé, Centre\"\r\n"
        );
    }

    #[test]
    fn test_csv_failures_write_nothing() {
        let dir = tempdir().unwrap();

        let empty = dir.path().join("empty.csv");
        assert!(matches!(
            write_csv::<Value>(&[], &empty),
            Err(IoError::EmptyExport)
        ));
        assert!(!empty.exists());

        let extra = dir.path().join("extra.csv");
        let records = vec![json!({"a": 1}), json!({"a": 2, "b": 3})];
        assert!(matches!(
            write_csv(&records, &extra),
            Err(IoError::FieldMismatch { index: 1, ref field }) if field == "b"
        ));
        assert!(!extra.exists());

        let scalar = dir.path().join("scalar.csv");
        assert!(matches!(
            write_csv(&[json!(1)], &scalar),
            Err(IoError::NotARecord { index: 0 })
        ));
        assert!(!export_to_csv(&[json!("text")], &scalar));
    }

    #[test]
    fn test_csv_from_typed_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.csv");
        let mut line = InventoryLine::new("akwa", "cement", 12.0, 4_500.0).unwrap();
        line.category = Some(MaterialCategory::Cement);

        assert!(export_to_csv(&[line], &path));
        let contents = read(&path);
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("store_id,material_id,quantity,price,material_name,category,last_updated")
        );
        assert_eq!(lines.next(), Some("akwa,cement,12.0,4500.0,,Cement,"));
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let data = json!([
            {"ville": "Ngaoundéré", "montant": 1250000, "payé": false},
            {"ville": "Douala", "montant": 4500.75, "payé": true, "notes": null}
        ]);

        assert!(export_to_json(&data, &path));
        let back: Value = read_json(&path).unwrap();
        assert_eq!(back, data);

        // Non-ASCII is written as-is, two-space indent
        let text = read(&path);
        assert!(text.contains("Ngaoundéré"));
        assert!(text.contains("\n  {"));
    }

    #[test]
    fn test_json_round_trip_of_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        let lines = vec![InventoryLine::new("akwa", "cement", 3.0, 4_500.0).unwrap()];
        let report = inventory_report_at(&lines, parse_date("2025-03-14").unwrap());

        write_json(&report, &path).unwrap();
        let back: InventoryReport = read_json(&path).unwrap();
        assert_eq!(report, back);
    }

    #[test]
    fn test_json_serialization_failure_writes_nothing() {
        use std::collections::HashMap;

        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        // JSON object keys must be strings
        let data: HashMap<(u8, u8), &str> = HashMap::from([((1, 2), "x")]);

        assert!(matches!(write_json(&data, &path), Err(IoError::Json(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_json_bad_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("data.json");
        assert!(!export_to_json(&json!({}), &path));
        assert!(matches!(read_json::<Value>(&path), Err(IoError::Io(_))));
    }
}
