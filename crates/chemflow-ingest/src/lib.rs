//! JSON table loading for chemflow.
//!
//! Two file shapes are accepted:
//! - an array of objects, one object per row (columns in first-seen order);
//! - `{ "columns": [...], "rows": [...] }`, where rows are objects or positional
//!   arrays. The column list survives even when there are no rows, which keeps
//!   the "empty-shaped table" semantics of the linker intact.
//!
//! Cells are converted with [`CellValue::from_json`]: strings are trimmed and
//! blank strings become empty cells.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use chemflow_core::{CellValue, NaicsTitles, SourceRecord, Sources, Table};

#[derive(Debug, Deserialize)]
struct ColumnarTable {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Value>,
}

fn record_from_object(object: &Map<String, Value>) -> SourceRecord {
    let mut record = SourceRecord::new();
    for (column, value) in object {
        record.insert(column, CellValue::from_json(value));
    }
    record
}

/// Convert a parsed JSON document into a [`Table`].
pub fn table_from_json(value: &Value) -> Result<Table> {
    match value {
        Value::Array(rows) => {
            let mut table = Table::new();
            for (i, row) in rows.iter().enumerate() {
                let object = row
                    .as_object()
                    .ok_or_else(|| anyhow!("row {i} is not a JSON object"))?;
                table.push(record_from_object(object));
            }
            table.normalize_rows();
            Ok(table)
        }
        Value::Object(_) => {
            let columnar: ColumnarTable = serde_json::from_value(value.clone())
                .context("expected `{ \"columns\": [...], \"rows\": [...] }`")?;
            let mut table = Table::with_columns(columnar.columns.iter().cloned());
            for (i, row) in columnar.rows.iter().enumerate() {
                let record = match row {
                    Value::Object(object) => record_from_object(object),
                    Value::Array(cells) => {
                        if cells.len() > columnar.columns.len() {
                            bail!(
                                "row {i} has {} cells but only {} columns are declared",
                                cells.len(),
                                columnar.columns.len()
                            );
                        }
                        let mut record = SourceRecord::new();
                        for (column, cell) in columnar.columns.iter().zip(cells) {
                            record.insert(column, CellValue::from_json(cell));
                        }
                        record
                    }
                    other => bail!("row {i} is neither an object nor an array: {other}"),
                };
                table.push(record);
            }
            table.normalize_rows();
            Ok(table)
        }
        _ => Err(anyhow!("a table must be a JSON array or object")),
    }
}

/// Read and parse one table file.
pub fn load_table(path: &Path) -> Result<Table> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read table {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse JSON in {}", path.display()))?;
    let table = table_from_json(&value)
        .with_context(|| format!("unsupported table layout in {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "loaded table"
    );
    Ok(table)
}

/// Locations of every source table for one run.
#[derive(Debug, Clone, Default)]
pub struct SourcePaths {
    pub inventory: PathBuf,
    pub industrial: PathBuf,
    pub consumer: PathBuf,
    pub compositions: Vec<PathBuf>,
    pub crosswalk: Option<PathBuf>,
    pub naics_titles: Option<PathBuf>,
}

/// Load every table named in `paths`. Optional tables that are not given are empty.
pub fn load_sources(paths: &SourcePaths) -> Result<Sources> {
    let compositions = paths
        .compositions
        .iter()
        .map(|path| load_table(path))
        .collect::<Result<Vec<_>>>()?;
    let crosswalk = match &paths.crosswalk {
        Some(path) => load_table(path)?,
        None => Table::new(),
    };
    let naics_titles = match &paths.naics_titles {
        Some(path) => NaicsTitles::from_table(&load_table(path)?),
        None => NaicsTitles::new(),
    };

    let sources = Sources {
        inventory: load_table(&paths.inventory)?,
        industrial: load_table(&paths.industrial)?,
        consumer: load_table(&paths.consumer)?,
        compositions,
        crosswalk,
        naics_titles,
    };
    tracing::info!(
        inventory = sources.inventory.len(),
        industrial = sources.industrial.len(),
        consumer = sources.consumer.len(),
        compositions = sources.compositions.len(),
        crosswalk = sources.crosswalk.len(),
        naics_titles = sources.naics_titles.len(),
        "loaded sources"
    );
    Ok(sources)
}

/// Identifier embedded in a file's name. A miss is a hard error.
pub fn identifier_for(path: &Path, pattern: &str) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("{} has no usable file name", path.display()))?;
    Ok(chemflow_core::identifier_from_filename(file_name, pattern)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_of_objects() {
        let table = table_from_json(&json!([
            {"76. CAS NUMBER": " 50-00-0 ", "41. PRIMARY NAICS CODE": 325199.0},
            {"76. CAS NUMBER": "67-64-1", "RECYCLED": null}
        ]))
        .unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.has_column("RECYCLED"));
        let row = &table.rows()[0];
        assert_eq!(row.text("76. CAS NUMBER").as_deref(), Some("50-00-0"));
        assert_eq!(row.text("41. PRIMARY NAICS CODE").as_deref(), Some("325199"));
        assert!(row.has_column("RECYCLED"));
    }

    #[test]
    fn columnar_keeps_shape_without_rows() {
        let table = table_from_json(&json!({"columns": ["CHEMICAL ID", "EPA FACILITY REGISTRY ID"]})).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 2);
    }

    #[test]
    fn columnar_positional_rows() {
        let table = table_from_json(&json!({
            "columns": ["CHEMICAL ID", "EPA FACILITY REGISTRY ID"],
            "rows": [["50-00-0", "110000001"], ["50-00-0"]]
        }))
        .unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.rows()[1].has_column("EPA FACILITY REGISTRY ID"));
        assert!(table.rows()[1].is_blank("EPA FACILITY REGISTRY ID"));
    }

    #[test]
    fn rejects_scalars_and_wide_rows() {
        assert!(table_from_json(&json!(42)).is_err());
        assert!(table_from_json(&json!({"columns": ["a"], "rows": [[1, 2]]})).is_err());
        assert!(table_from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn identifier_from_path() {
        let path = Path::new("/data/cdr/CDR_50-00-0.json");
        assert_eq!(
            identifier_for(path, chemflow_core::DEFAULT_FILENAME_PATTERN).unwrap(),
            "50-00-0"
        );
        assert!(identifier_for(Path::new("/data/notes.json"), chemflow_core::DEFAULT_FILENAME_PATTERN).is_err());
    }
}
