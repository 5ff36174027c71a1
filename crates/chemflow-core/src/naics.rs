//! NAICS matcher: attaches crosswalk rows to linked records by declared industry code.
//!
//! Each record declares up to six industry codes (inventory layout) or three
//! (site layout). The site codes are the ones compared against the crosswalk
//! whenever the view carries them; the inventory codes are what gets indexed
//! unless they are blank throughout. A compared code is truncated to six
//! characters and must be all digits; it is then checked against every code
//! slot of every crosswalk entry. What happens when several crosswalk rows match
//! one code is a [`MatchPolicy`] decision.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::columns::{INV_NAICS_CODES, SITE_NAICS_CODES};
use crate::crosswalk::{CrosswalkEntry, ProductAttributes, Taxonomy};
use crate::linker::{LinkedRecord, LinkedView};

/// Resolution of more than one crosswalk match for the same declared code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    KeepFirst,
    /// Last match in scan order wins.
    #[default]
    KeepLast,
    KeepAll,
}

impl std::str::FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "keep_first" | "first" => Ok(Self::KeepFirst),
            "keep_last" | "last" => Ok(Self::KeepLast),
            "keep_all" | "all" => Ok(Self::KeepAll),
            other => Err(format!(
                "unknown match policy `{other}` (expected keep-first|keep-last|keep-all)"
            )),
        }
    }
}

/// Which columns carry the declared industry codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeLayout {
    /// `41. NAICS CODE 1` … `46. NAICS CODE 6`.
    Inventory,
    /// `NAICS Code 1` … `NAICS Code 3`.
    Site,
}

impl CodeLayout {
    /// Codes compared against the crosswalk: the site layout whenever all three
    /// `NAICS Code n` columns are present, regardless of their values.
    pub fn for_matching(view: &LinkedView) -> Self {
        let site_present = SITE_NAICS_CODES.iter().all(|column| {
            view.has_column(column) || view.records.iter().any(|r| r.has_column(column))
        });
        if site_present {
            CodeLayout::Site
        } else {
            CodeLayout::Inventory
        }
    }

    /// Codes indexed as declared: the inventory layout when any inventory code
    /// column carries a value in the view.
    pub fn for_indexing(view: &LinkedView) -> Self {
        let inventory_used = view.records.iter().any(|record| {
            INV_NAICS_CODES
                .iter()
                .any(|column| record.text(column).is_some())
        });
        if inventory_used {
            CodeLayout::Inventory
        } else {
            CodeLayout::Site
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            CodeLayout::Inventory => &INV_NAICS_CODES,
            CodeLayout::Site => &SITE_NAICS_CODES,
        }
    }
}

/// Truncate a declared code to six characters (char-safe).
pub fn truncate_code(code: &str) -> String {
    code.chars().take(6).collect()
}

/// A truncated code is usable only when it is non-empty and all ASCII digits.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit())
}

/// One declared industry code of a record, as read (already truncated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredCode {
    /// 1-based classification slot.
    pub slot: usize,
    pub code: String,
}

/// A crosswalk row matched for one declared code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NaicsMatch {
    pub code: String,
    pub description: Option<String>,
    pub taxonomy: Taxonomy,
    pub product: ProductAttributes,
}

impl NaicsMatch {
    /// Category key `"<code> - <description>"`; only when a description exists.
    pub fn category_key(&self) -> Option<String> {
        self.description
            .as_ref()
            .map(|description| format!("{} - {}", self.code, description))
    }
}

/// A linked record with its declared codes and the matches kept per slot.
///
/// `declared` follows [`CodeLayout::for_indexing`] while the `matches` slots
/// follow [`CodeLayout::for_matching`]; in a joined view the two differ.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedRecord {
    pub record: LinkedRecord,
    pub declared: Vec<DeclaredCode>,
    pub matches: BTreeMap<usize, Vec<NaicsMatch>>,
}

impl AnnotatedRecord {
    /// Record without any matching step applied.
    pub fn bare(record: LinkedRecord) -> Self {
        Self {
            record,
            declared: Vec::new(),
            matches: BTreeMap::new(),
        }
    }

    pub fn matches_for(&self, slot: usize) -> &[NaicsMatch] {
        self.matches.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Counters for the non-fatal conditions met while matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    pub records: usize,
    pub declared_codes: usize,
    pub invalid_codes: usize,
    pub matched_slots: usize,
    pub ambiguous_slots: usize,
}

/// Match every record of `view` against the crosswalk entries.
pub fn match_industry_codes(
    view: &LinkedView,
    crosswalk: &[CrosswalkEntry],
    policy: MatchPolicy,
) -> (Vec<AnnotatedRecord>, MatchReport) {
    let matching = CodeLayout::for_matching(view);
    let indexing = CodeLayout::for_indexing(view);
    let mut report = MatchReport {
        records: view.len(),
        ..MatchReport::default()
    };

    let annotated = view
        .records
        .iter()
        .map(|record| {
            let mut out = annotate(record, matching, crosswalk, policy, &mut report);
            out.declared = declared_codes(record, indexing);
            out
        })
        .collect();

    tracing::info!(
        ?matching,
        ?indexing,
        ?policy,
        records = report.records,
        declared = report.declared_codes,
        invalid = report.invalid_codes,
        matched = report.matched_slots,
        ambiguous = report.ambiguous_slots,
        "matched industry codes"
    );
    (annotated, report)
}

fn annotate(
    record: &LinkedRecord,
    layout: CodeLayout,
    crosswalk: &[CrosswalkEntry],
    policy: MatchPolicy,
    report: &mut MatchReport,
) -> AnnotatedRecord {
    let mut out = AnnotatedRecord::bare(record.clone());

    for DeclaredCode { slot, code } in declared_codes(record, layout) {
        report.declared_codes += 1;
        if !is_valid_code(&code) {
            report.invalid_codes += 1;
            tracing::debug!(slot, code = %code, "skipping non-numeric industry code");
            continue;
        }

        let found = scan(&code, crosswalk);
        if found.is_empty() {
            continue;
        }
        report.matched_slots += 1;
        if found.len() > 1 {
            report.ambiguous_slots += 1;
            tracing::debug!(
                slot,
                code = %code,
                candidates = found.len(),
                ?policy,
                "ambiguous crosswalk match"
            );
        }

        let kept = match policy {
            MatchPolicy::KeepAll => found,
            MatchPolicy::KeepFirst => found.into_iter().take(1).collect(),
            MatchPolicy::KeepLast => found.into_iter().last().into_iter().collect(),
        };
        out.matches.insert(slot, kept);
    }
    out
}

/// Non-blank codes of `layout`, truncated, with their 1-based slot.
fn declared_codes(record: &LinkedRecord, layout: CodeLayout) -> Vec<DeclaredCode> {
    layout
        .columns()
        .iter()
        .enumerate()
        .filter_map(|(index, column)| {
            record.text(column).map(|raw| DeclaredCode {
                slot: index + 1,
                code: truncate_code(&raw),
            })
        })
        .collect()
}

/// Matches in scan order: crosswalk code slot first, entry order second.
fn scan(code: &str, crosswalk: &[CrosswalkEntry]) -> Vec<NaicsMatch> {
    let mut found = Vec::new();
    for slot in 0..3 {
        for entry in crosswalk {
            let naics = &entry.naics[slot];
            if naics.code.as_deref() == Some(code) {
                found.push(NaicsMatch {
                    code: code.to_string(),
                    description: naics.description.clone(),
                    taxonomy: entry.taxonomy.clone(),
                    product: entry.product.clone(),
                });
            }
        }
    }
    found
}
