//! Record linker: joins reporting-inventory rows with use-submission rows for one
//! chemical identifier.
//!
//! Three branches, tried in order:
//! 1. the inventory knows the identifier → left join on the facility registry key,
//!    every inventory row survives;
//! 2. only the use submissions know it → use rows padded with the (blank)
//!    inventory columns;
//! 3. nobody knows it → the empty-shaped inventory frame.
//!
//! All branches finish the same way: rename into the unified vocabulary, normalize
//! labels, tag each record with its [`UseType`], and drop exact duplicates.

use serde::{Deserialize, Serialize};

use crate::columns::{
    self, CONSUMER_FUNCTION, CONSUMER_PRODUCT, INDUSTRIAL_FUNCTION, INDUSTRIAL_PROCESS,
    INV_CAS_NUMBER, INV_FRS_FACILITY_ID, INV_NAICS_CODES, INV_PRIMARY_NAICS, RAW_CONSUMER_PRODUCT,
    RAW_INDUSTRIAL_PROCESS, USE_CHEMICAL_ID, USE_FACILITY_REGISTRY_ID,
};
use crate::table::{CellValue, SourceRecord, Table};

/// Whether a record describes industrial or consumer/commercial handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UseType {
    Industrial,
    ConsumerCommercial,
    #[default]
    Unknown,
}

impl UseType {
    /// Suffix carried by facility codes.
    pub fn suffix(self) -> &'static str {
        match self {
            UseType::Industrial => "(I)",
            UseType::ConsumerCommercial => "(C)",
            UseType::Unknown => "",
        }
    }

    pub fn is_known(self) -> bool {
        self != UseType::Unknown
    }

    pub fn label(self) -> &'static str {
        match self {
            UseType::Industrial => "Industrial",
            UseType::ConsumerCommercial => "Consumer and Commercial",
            UseType::Unknown => "",
        }
    }

    /// Derive the use type from which column set carries data on this row.
    pub fn of_record(record: &SourceRecord) -> UseType {
        if !record.is_blank(INDUSTRIAL_PROCESS) || !record.is_blank(INDUSTRIAL_FUNCTION) {
            UseType::Industrial
        } else if !record.is_blank(CONSUMER_PRODUCT) || !record.is_blank(CONSUMER_FUNCTION) {
            UseType::ConsumerCommercial
        } else {
            UseType::Unknown
        }
    }
}

/// Which branch produced the linked view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkOutcome {
    /// Inventory rows matched (possibly with no use-submission counterpart).
    Joined,
    /// Only use-submission rows matched.
    UseOnly,
    /// The identifier is unknown to every source.
    NoIdentifierMatch,
}

/// One linked row. Carries every column of its view (blank where the originating
/// row had nothing), so column presence can be checked per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedRecord {
    fields: SourceRecord,
    use_type: UseType,
}

impl LinkedRecord {
    pub fn new(fields: SourceRecord) -> Self {
        let use_type = UseType::of_record(&fields);
        Self { fields, use_type }
    }

    pub fn fields(&self) -> &SourceRecord {
        &self.fields
    }

    pub fn use_type(&self) -> UseType {
        self.use_type
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.fields.has_column(column)
    }

    pub fn text(&self, column: &str) -> Option<String> {
        self.fields.text(column)
    }

    /// Facility identity: inventory FRS id first, registry id second.
    pub fn facility_identity(&self) -> Option<String> {
        self.text(INV_FRS_FACILITY_ID)
            .or_else(|| self.text(USE_FACILITY_REGISTRY_ID))
    }
}

/// Output of the linker.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedView {
    pub identifier: String,
    pub outcome: LinkOutcome,
    pub columns: Vec<String>,
    pub records: Vec<LinkedRecord>,
}

impl LinkedView {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Reorder records by facility identity (stable; records without one go last).
    pub fn sort_by_facility(&mut self) {
        self.records.sort_by(|a, b| {
            match (a.facility_identity(), b.facility_identity()) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
    }
}

/// Use-submission inputs: the industrial processing-and-use set and the
/// consumer/commercial-use set.
#[derive(Debug, Clone, Copy)]
pub struct UseTables<'a> {
    pub industrial: &'a Table,
    pub consumer: &'a Table,
}

/// Link inventory and use-submission rows for `identifier`. Never fails; an unknown
/// identifier yields an empty view shaped like the inventory table.
pub fn link_records(identifier: &str, inventory: &Table, uses: UseTables<'_>) -> LinkedView {
    let identifier = identifier.trim();
    let use_rows = Table::concat([uses.industrial, uses.consumer]);

    let inventory_hits = inventory.filter_eq(INV_CAS_NUMBER, identifier);
    let use_hits = use_rows.filter_eq(USE_CHEMICAL_ID, identifier);

    let (mut table, outcome) = if !inventory_hits.is_empty() {
        (left_join(&inventory_hits, &use_hits), LinkOutcome::Joined)
    } else if !use_hits.is_empty() {
        (pad_with_shape(&inventory.shape(), &use_hits), LinkOutcome::UseOnly)
    } else {
        (inventory.shape(), LinkOutcome::NoIdentifierMatch)
    };

    unify_vocabulary(&mut table);
    table.normalize_rows();
    table.drop_duplicates();

    tracing::info!(
        identifier,
        ?outcome,
        inventory_rows = inventory_hits.len(),
        use_rows = use_hits.len(),
        linked = table.len(),
        "linked records"
    );

    let columns = table.columns().to_vec();
    let records = table.into_rows().into_iter().map(LinkedRecord::new).collect();
    LinkedView {
        identifier: identifier.to_string(),
        outcome,
        columns,
        records,
    }
}

/// Left join on `74. FRS FACILITY ID` = `EPA FACILITY REGISTRY ID`, one output row per
/// (inventory, use) pair; unmatched inventory rows are kept with blank use fields.
fn left_join(left: &Table, right: &Table) -> Table {
    let mut out = Table::with_columns(left.columns().iter().chain(right.columns()).cloned());
    for inv in left.rows() {
        let key = inv.text(INV_FRS_FACILITY_ID);
        let mut matched = false;
        if let Some(key) = key.as_deref() {
            for use_row in right.rows() {
                if use_row.text(USE_FACILITY_REGISTRY_ID).as_deref() == Some(key) {
                    let mut merged = inv.clone();
                    merged.absorb(use_row);
                    out.push(merged);
                    matched = true;
                }
            }
        }
        if !matched {
            out.push(inv.clone());
        }
    }
    out
}

/// Field-wise concatenation of an empty-shaped frame with data rows.
fn pad_with_shape(shape: &Table, rows: &Table) -> Table {
    let mut out = Table::concat([shape, rows]);
    out.normalize_rows();
    out
}

fn unify_vocabulary(table: &mut Table) {
    let industrial = table.has_column(RAW_INDUSTRIAL_PROCESS);
    let consumer = table.has_column(RAW_CONSUMER_PRODUCT);

    if industrial {
        for (from, to) in columns::industrial_renames() {
            table.rename_column(from, to);
        }
    }
    if consumer {
        for (from, to) in columns::consumer_renames() {
            table.rename_column(from, to);
        }
    }
    if table.has_column(INV_PRIMARY_NAICS) {
        table.rename_column(INV_PRIMARY_NAICS, INV_NAICS_CODES[0]);
    }

    normalize_function_labels(table);
}

/// `Intermediate` and `Intermediates` name the same function category.
fn normalize_function_labels(table: &mut Table) {
    for row in table.rows_mut() {
        for column in [INDUSTRIAL_FUNCTION, CONSUMER_FUNCTION] {
            if row.get(column).and_then(CellValue::as_str) == Some("Intermediate") {
                row.insert(column, CellValue::text("Intermediates"));
            }
        }
    }
}
