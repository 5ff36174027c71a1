//! Per-facility summaries: site/worker/concentration figures, production
//! volumes, and the inventory's reported-activity flags.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::columns::{
    INV_REPORTED_ACTIVITIES, MAX_CONCENTRATION, MAX_CONCENTRATION_CODE, SITES, SITES_CODE,
    VOLUME_COLUMNS, WORKERS, WORKERS_CODE,
};
use crate::registry::FacilityCode;
use crate::table::SourceRecord;

pub const NKRA: &str = "NKRA";
const NKRA_LONG: &str = "Not Known or Reasonably Ascertainable";

/// A figure with its range code (`S1`, `W3`, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodedValue {
    pub value: String,
    pub code: String,
}

impl CodedValue {
    /// Blank or not-known figures collapse to `NKRA` with the zero code.
    fn read(record: &SourceRecord, value_column: &str, code_column: &str, unknown_code: &str) -> Self {
        match record.text(value_column) {
            Some(value) if value != NKRA && value != NKRA_LONG => Self {
                code: record
                    .text(code_column)
                    .unwrap_or_else(|| unknown_code.to_string()),
                value,
            },
            _ => Self {
                value: NKRA.to_string(),
                code: unknown_code.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacilitySummary {
    pub facility: FacilityCode,
    pub identity: String,
    pub sites: CodedValue,
    pub workers: CodedValue,
    pub max_concentration: CodedValue,
    /// Production-volume columns present on the record, by column name.
    pub volumes: BTreeMap<String, String>,
}

impl FacilitySummary {
    pub fn of_record(facility: FacilityCode, identity: &str, record: &SourceRecord) -> Self {
        let volumes = VOLUME_COLUMNS
            .iter()
            .filter_map(|&column| record.text(column).map(|v| (column.to_string(), v)))
            .collect();
        Self {
            facility,
            identity: identity.to_string(),
            sites: CodedValue::read(record, SITES, SITES_CODE, "S0"),
            workers: CodedValue::read(record, WORKERS, WORKERS_CODE, "W0"),
            max_concentration: CodedValue::read(record, MAX_CONCENTRATION, MAX_CONCENTRATION_CODE, "M0"),
            volumes,
        }
    }
}

/// Facility summaries keyed by code; the first record seen for a facility wins.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FacilitySummaries {
    by_facility: BTreeMap<FacilityCode, FacilitySummary>,
}

impl FacilitySummaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, facility: FacilityCode, identity: &str, record: &SourceRecord) {
        self.by_facility
            .entry(facility)
            .or_insert_with(|| FacilitySummary::of_record(facility, identity, record));
    }

    pub fn get(&self, facility: FacilityCode) -> Option<&FacilitySummary> {
        self.by_facility.get(&facility)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FacilitySummary> + '_ {
        self.by_facility.values()
    }

    pub fn len(&self) -> usize {
        self.by_facility.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_facility.is_empty()
    }
}

/// Inventory activity flags per facility; later records overwrite earlier ones.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ReportedActivities {
    by_facility: BTreeMap<FacilityCode, BTreeMap<String, String>>,
}

impl ReportedActivities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, facility: FacilityCode, record: &SourceRecord) {
        let flags = self.by_facility.entry(facility).or_default();
        for column in INV_REPORTED_ACTIVITIES {
            if !record.has_column(column) {
                continue;
            }
            match record.text(column) {
                Some(value) => {
                    flags.insert(column.to_string(), value);
                }
                None => {
                    flags.remove(column);
                }
            }
        }
    }

    pub fn flags(&self, facility: FacilityCode) -> Option<&BTreeMap<String, String>> {
        self.by_facility.get(&facility)
    }

    pub fn is_empty(&self) -> bool {
        self.by_facility.values().all(BTreeMap::is_empty)
    }
}

/// Legend for the range codes used in summaries.
pub fn code_legend() -> Vec<(&'static str, &'static str)> {
    vec![
        ("S0", "Not Known"),
        ("S1", "< 10 sites"),
        ("S2", "10 - 24 sites"),
        ("S3", "25 - 99 sites"),
        ("W0", "Not Known"),
        ("W1", "< 10 workers"),
        ("W2", "10 - 24 workers"),
        ("W3", "25 - 49 workers"),
        ("W4", "50 - 99 workers"),
        ("W5", "100 - 499 workers"),
        ("M0", "Not Known"),
        ("M1", "< 1% wt"),
        ("M2", "1 - < 30% wt"),
        ("M3", "30 - < 60% wt"),
        ("M4", "60 - < 90% wt"),
        ("M5", "90% + wt"),
    ]
}
