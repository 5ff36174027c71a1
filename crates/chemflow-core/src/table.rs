//! Tabular record model.
//!
//! Source tables are loosely typed spreadsheets: columns vary per source and are
//! not guaranteed to be present. A [`SourceRecord`] keeps only the columns its
//! table declares; "missing" (column absent) and "blank" (column present, no
//! value) are distinct states, and every stage checks instead of assuming.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};

/// One scalar cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Text cell, trimmed; whitespace-only input becomes [`CellValue::Empty`].
    pub fn text(s: impl AsRef<str>) -> Self {
        let trimmed = s.as_ref().trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => CellValue::Empty,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => n
                    .as_f64()
                    .filter(|f| f.is_finite())
                    .map(CellValue::Float)
                    .unwrap_or(CellValue::Empty),
            },
            Value::String(s) => CellValue::text(s),
            other => CellValue::text(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Borrow the text of a text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// String rendering used for comparisons and category keys.
    ///
    /// Integral floats render without a fractional part so that `325199.0`
    /// read from a spreadsheet equals the textual code `"325199"`.
    pub fn to_code_string(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) if f.is_nan() => None,
            CellValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
                Some(format!("{}", *f as i64))
            }
            CellValue::Float(f) => Some(f.to_string()),
            CellValue::Text(s) => Some(s.clone()),
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => a.to_bits() == b.to_bits(),
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Empty => {}
            CellValue::Bool(b) => b.hash(state),
            CellValue::Int(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

/// One row of a source table: column name → cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRecord {
    cells: BTreeMap<String, CellValue>,
}

impl SourceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper, mostly for tests and fixtures.
    pub fn with(mut self, column: &str, value: impl Into<CellValue>) -> Self {
        self.insert(column, value.into());
        self
    }

    pub fn insert(&mut self, column: &str, value: CellValue) {
        self.cells.insert(column.to_string(), value);
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Cell of a present column; `None` when the column is missing.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Non-blank code string of a column, missing and blank both yield `None`.
    pub fn text(&self, column: &str) -> Option<String> {
        self.cells.get(column).and_then(CellValue::to_code_string)
    }

    pub fn is_blank(&self, column: &str) -> bool {
        self.cells.get(column).map_or(true, CellValue::is_empty)
    }

    /// Move `from` to `to`. When `to` already holds a non-blank value it is kept.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        let Some(value) = self.cells.remove(from) else {
            return;
        };
        match self.cells.get(to) {
            Some(existing) if !existing.is_empty() => {}
            _ => {
                self.cells.insert(to.to_string(), value);
            }
        }
    }

    /// Make sure every listed column is present, inserting blanks.
    pub fn fill_columns<'a>(&mut self, columns: impl IntoIterator<Item = &'a String>) {
        for column in columns {
            self.cells.entry(column.clone()).or_insert(CellValue::Empty);
        }
    }

    /// Copy every cell of `other` that is missing or blank here.
    pub fn absorb(&mut self, other: &SourceRecord) {
        for (column, value) in &other.cells {
            match self.cells.get(column) {
                Some(existing) if !existing.is_empty() => {}
                _ => {
                    self.cells.insert(column.clone(), value.clone());
                }
            }
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> + '_ {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Ordered column list plus rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<SourceRecord>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty-shaped table: columns, no rows.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Table::new();
        for column in columns {
            table.add_column(column.into());
        }
        table
    }

    /// Build from rows, inferring the column list in first-seen order.
    pub fn from_rows(rows: impl IntoIterator<Item = SourceRecord>) -> Self {
        let mut table = Table::new();
        for row in rows {
            table.push(row);
        }
        table
    }

    fn add_column(&mut self, column: String) {
        if !self.columns.iter().any(|c| *c == column) {
            self.columns.push(column);
        }
    }

    /// Append a row, widening the column list with any columns it introduces.
    pub fn push(&mut self, row: SourceRecord) {
        for column in row.columns() {
            if !self.has_column(column) {
                self.columns.push(column.to_string());
            }
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn rows(&self) -> &[SourceRecord] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [SourceRecord] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<SourceRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Empty-shaped copy of this table.
    pub fn shape(&self) -> Table {
        Table::with_columns(self.columns.iter().cloned())
    }

    /// Row-wise concatenation; the column list is the union in first-seen order.
    pub fn concat<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Table {
        let mut out = Table::new();
        for table in tables {
            for column in &table.columns {
                out.add_column(column.clone());
            }
            out.rows.extend(table.rows.iter().cloned());
        }
        out
    }

    /// Rows whose `column` renders exactly as `value`. A missing column matches nothing.
    pub fn filter_eq(&self, column: &str, value: &str) -> Table {
        let mut out = self.shape();
        if !self.has_column(column) {
            return out;
        }
        out.rows = self
            .rows
            .iter()
            .filter(|row| row.text(column).as_deref() == Some(value))
            .cloned()
            .collect();
        out
    }

    /// Rename a column in the header and every row.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if from == to || !self.has_column(from) {
            return;
        }
        self.columns.retain(|c| c != from);
        self.add_column(to.to_string());
        for row in &mut self.rows {
            row.rename_column(from, to);
        }
    }

    /// Fill every row with blanks for the declared columns.
    pub fn normalize_rows(&mut self) {
        let columns = self.columns.clone();
        for row in &mut self.rows {
            row.fill_columns(columns.iter());
        }
    }

    /// Remove rows equal on every column, keeping the first occurrence.
    pub fn drop_duplicates(&mut self) {
        let mut seen: HashSet<SourceRecord> = HashSet::with_capacity(self.rows.len());
        self.rows.retain(|row| seen.insert(row.clone()));
    }
}
