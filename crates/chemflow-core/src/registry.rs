//! Facility identity registry.
//!
//! Assigns each external facility identifier a canonical code `FRS<n><suffix>`.
//! The integer part is handed out once, in order of first sight, and never
//! changes. The suffix follows the use type observed for the facility:
//!
//! - a determined observation (`(I)` / `(C)`) replaces whatever suffix is there
//!   when it differs, so a facility first seen with an unknown use type is
//!   corrected later in the pass;
//! - an unknown observation never clears a determined suffix;
//! - a switch between industrial and consumer keeps the last one seen and raises
//!   a sticky conflict flag.
//!
//! Assignment depends on iteration order; callers that need reproducible codes
//! must feed records in a stable order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::linker::UseType;

/// Stable identity of a canonical facility code: its sequence number.
///
/// Memberships hold this, not the rendered label, so a suffix correction made
/// late in the pass is reflected everywhere the facility already appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityCode(u32);

impl FacilityCode {
    pub fn number(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FacilityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FRS{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacilityEntry {
    pub code: FacilityCode,
    pub identity: String,
    pub use_type: UseType,
    /// Seen as both industrial and consumer/commercial.
    pub conflicting_use_type: bool,
}

impl FacilityEntry {
    pub fn label(&self) -> String {
        format!("{}{}", self.code, self.use_type.suffix())
    }
}

/// One legend line: rendered code ↔ external identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub number: u32,
    pub code: String,
    pub identity: String,
    pub conflicting_use_type: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FacilityRegistry {
    entries: Vec<FacilityEntry>,
    by_identity: HashMap<String, usize>,
}

impl FacilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry's only mutator: look up or assign the code for `identity`,
    /// applying the suffix-correction rule for the observed `use_type`.
    pub fn get_or_assign(&mut self, identity: &str, use_type: UseType) -> FacilityCode {
        if let Some(&index) = self.by_identity.get(identity) {
            let entry = &mut self.entries[index];
            if use_type.is_known() && use_type != entry.use_type {
                if entry.use_type.is_known() {
                    entry.conflicting_use_type = true;
                    tracing::debug!(
                        identity,
                        from = entry.use_type.label(),
                        to = use_type.label(),
                        "facility observed with conflicting use types"
                    );
                }
                entry.use_type = use_type;
            }
            return entry.code;
        }

        let code = FacilityCode(self.entries.len() as u32 + 1);
        self.by_identity
            .insert(identity.to_string(), self.entries.len());
        self.entries.push(FacilityEntry {
            code,
            identity: identity.to_string(),
            use_type,
            conflicting_use_type: false,
        });
        code
    }

    pub fn lookup(&self, identity: &str) -> Option<FacilityCode> {
        self.by_identity
            .get(identity)
            .map(|&index| self.entries[index].code)
    }

    pub fn entry(&self, code: FacilityCode) -> Option<&FacilityEntry> {
        let index = code.0.checked_sub(1)? as usize;
        self.entries.get(index)
    }

    /// Rendered label (`FRS3(C)`); unknown codes render without a suffix.
    pub fn label(&self, code: FacilityCode) -> String {
        self.entry(code)
            .map(FacilityEntry::label)
            .unwrap_or_else(|| code.to_string())
    }

    pub fn entries(&self) -> &[FacilityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &FacilityEntry> + '_ {
        self.entries.iter().filter(|e| e.conflicting_use_type)
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        self.entries
            .iter()
            .map(|e| LegendEntry {
                number: e.code.number(),
                code: e.label(),
                identity: e.identity.clone(),
                conflicting_use_type: e.conflicting_use_type,
            })
            .collect()
    }
}

impl Serialize for FacilityRegistry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.legend().serialize(serializer)
    }
}
