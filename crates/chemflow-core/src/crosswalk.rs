//! Crosswalk resolver: attaches NAICS codes to product-composition rows through the
//! three-level product-use taxonomy (PUC).
//!
//! Matching happens on normalized taxonomy levels (trimmed, lower-cased, missing
//! treated as empty). Two matches are unioned:
//!
//! - **direct**: general category, product family and product type all equal;
//! - **fallback**: for product rows with an empty product type only, the product
//!   family doubles as the product type (`family == crosswalk family` and
//!   `family == crosswalk type`).
//!
//! Entries without any NAICS code are discarded and exact duplicates collapse.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::columns::{
    CENTRAL_WEIGHT_FRACTION, COMPONENT, CROSSWALK_CODES, CROSSWALK_DESCRIPTIONS, CROSSWALK_LEVELS,
    DOCUMENT_DATE, DOCUMENT_SUBTITLE, DOCUMENT_TITLE, LOWER_WEIGHT_FRACTION, PRODUCT_NAME,
    PRODUCT_RAW_CAS, PUC_FAMILY, PUC_GENERAL, PUC_ID, PUC_KIND, PUC_TYPE, RAW_CENTRAL_COMP,
    RAW_MAX_COMP, RAW_MIN_COMP, UNIT_TYPE, UPPER_WEIGHT_FRACTION, WEIGHT_FRACTION_TYPE,
};
use crate::table::{SourceRecord, Table};

/// Normalized three-level product-use taxonomy key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Taxonomy {
    pub general: String,
    pub family: String,
    pub kind: String,
}

impl Taxonomy {
    fn normalize(value: Option<String>) -> String {
        value.map(|v| v.trim().to_lowercase()).unwrap_or_default()
    }

    /// Taxonomy of a product-composition row (unified column names).
    pub fn of_product(row: &SourceRecord) -> Self {
        Self {
            general: Self::normalize(row.text(PUC_GENERAL)),
            family: Self::normalize(row.text(PUC_FAMILY)),
            kind: Self::normalize(row.text(PUC_TYPE)),
        }
    }

    /// Taxonomy of a crosswalk row; `PUC_level1..3` headers win over unified names.
    pub fn of_crosswalk(row: &SourceRecord) -> Self {
        let level = |i: usize| {
            let (raw, unified) = CROSSWALK_LEVELS[i];
            Self::normalize(row.text(raw).or_else(|| row.text(unified)))
        };
        Self {
            general: level(0),
            family: level(1),
            kind: level(2),
        }
    }

    /// Key under which a product row with an empty type is looked up in the fallback.
    fn fallback_key(&self) -> Option<Taxonomy> {
        if !self.kind.is_empty() {
            return None;
        }
        Some(Taxonomy {
            general: self.general.clone(),
            family: self.family.clone(),
            kind: self.family.clone(),
        })
    }
}

/// Product attributes copied from the composition row onto every NAICS match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductAttributes {
    pub document_title: Option<String>,
    pub document_subtitle: Option<String>,
    pub document_date: Option<String>,
    pub product_name: Option<String>,
    pub puc_kind: Option<String>,
    pub raw_min_comp: Option<String>,
    pub raw_max_comp: Option<String>,
    pub raw_central_comp: Option<String>,
    pub unit_type: Option<String>,
    pub lower_weight_fraction: Option<String>,
    pub upper_weight_fraction: Option<String>,
    pub central_weight_fraction: Option<String>,
    pub weight_fraction_type: Option<String>,
    pub component: Option<String>,
    pub puc_id: Option<String>,
}

impl ProductAttributes {
    pub fn of_product(row: &SourceRecord) -> Self {
        Self {
            document_title: row.text(DOCUMENT_TITLE),
            document_subtitle: row.text(DOCUMENT_SUBTITLE),
            document_date: row.text(DOCUMENT_DATE),
            product_name: row.text(PRODUCT_NAME),
            puc_kind: row.text(PUC_KIND),
            raw_min_comp: row.text(RAW_MIN_COMP),
            raw_max_comp: row.text(RAW_MAX_COMP),
            raw_central_comp: row.text(RAW_CENTRAL_COMP),
            unit_type: row.text(UNIT_TYPE),
            lower_weight_fraction: row.text(LOWER_WEIGHT_FRACTION),
            upper_weight_fraction: row.text(UPPER_WEIGHT_FRACTION),
            central_weight_fraction: row.text(CENTRAL_WEIGHT_FRACTION),
            weight_fraction_type: row.text(WEIGHT_FRACTION_TYPE),
            component: row.text(COMPONENT),
            puc_id: row.text(PUC_ID),
        }
    }
}

/// One `(code, description)` slot of a crosswalk entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaicsSlot {
    pub code: Option<String>,
    pub description: Option<String>,
}

/// A product row joined with the crosswalk row(s) that classify it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrosswalkEntry {
    pub taxonomy: Taxonomy,
    pub naics: [NaicsSlot; 3],
    pub product: ProductAttributes,
}

impl CrosswalkEntry {
    pub fn has_any_code(&self) -> bool {
        self.naics.iter().any(|slot| slot.code.is_some())
    }
}

/// Product-composition rows for `identifier`, scanned across every composition table.
pub fn select_products<'a>(tables: impl IntoIterator<Item = &'a Table>, identifier: &str) -> Vec<SourceRecord> {
    let identifier = identifier.trim();
    let mut out = Vec::new();
    for (index, table) in tables.into_iter().enumerate() {
        let hits = table.filter_eq(PRODUCT_RAW_CAS, identifier);
        if !hits.is_empty() {
            tracing::debug!(table = index, rows = hits.len(), "product composition rows matched");
        }
        out.extend(hits.into_rows());
    }
    out
}

fn naics_slots(row: &SourceRecord) -> [NaicsSlot; 3] {
    std::array::from_fn(|i| NaicsSlot {
        code: row.text(CROSSWALK_CODES[i]),
        description: row.text(CROSSWALK_DESCRIPTIONS[i]),
    })
}

/// Resolve product rows against the PUC → NAICS crosswalk table.
pub fn resolve_crosswalk(products: &[SourceRecord], crosswalk: &Table) -> Vec<CrosswalkEntry> {
    let keyed: Vec<(Taxonomy, [NaicsSlot; 3])> = crosswalk
        .rows()
        .iter()
        .map(|row| (Taxonomy::of_crosswalk(row), naics_slots(row)))
        .collect();

    let mut direct = Vec::new();
    let mut fallback = Vec::new();
    for product in products {
        let taxonomy = Taxonomy::of_product(product);
        let attributes = ProductAttributes::of_product(product);

        for (key, slots) in &keyed {
            if *key == taxonomy {
                direct.push(CrosswalkEntry {
                    taxonomy: taxonomy.clone(),
                    naics: slots.clone(),
                    product: attributes.clone(),
                });
            }
        }

        if let Some(fallback_key) = taxonomy.fallback_key() {
            for (key, slots) in &keyed {
                if *key == fallback_key {
                    fallback.push(CrosswalkEntry {
                        taxonomy: taxonomy.clone(),
                        naics: slots.clone(),
                        product: attributes.clone(),
                    });
                }
            }
        }
    }

    let candidates = direct.len() + fallback.len();
    let mut seen = HashSet::new();
    let entries: Vec<CrosswalkEntry> = direct
        .into_iter()
        .chain(fallback)
        .filter(CrosswalkEntry::has_any_code)
        .filter(|entry| seen.insert(entry.clone()))
        .collect();

    tracing::info!(
        products = products.len(),
        candidates,
        entries = entries.len(),
        "resolved crosswalk"
    );
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crosswalk() -> Table {
        Table::from_rows([
            SourceRecord::new()
                .with("PUC_level1", "Home maintenance")
                .with("PUC_level2", "Adhesives")
                .with("PUC_level3", "Glue")
                .with("NAICS 1", "325520")
                .with("NAICS 1 Description", "Adhesive Manufacturing"),
            SourceRecord::new()
                .with("PUC_level1", "Home maintenance")
                .with("PUC_level2", "Paint")
                .with("PUC_level3", "Paint")
                .with("NAICS 2", 325510i64)
                .with("NAICS 2 Description", "Paint and Coating Manufacturing"),
            SourceRecord::new()
                .with("PUC_level1", "Personal care")
                .with("PUC_level2", "Soap")
                .with("PUC_level3", ""),
        ])
    }

    fn product(general: &str, family: &str, kind: &str, name: &str) -> SourceRecord {
        SourceRecord::new()
            .with(PRODUCT_RAW_CAS, "50-00-0")
            .with(PUC_GENERAL, general)
            .with(PUC_FAMILY, family)
            .with(PUC_TYPE, kind)
            .with(PRODUCT_NAME, name)
    }

    #[test]
    fn direct_match_is_case_and_space_insensitive() {
        let products = [product(" home MAINTENANCE", "adhesives ", "GLUE", "Super Glue")];
        let entries = resolve_crosswalk(&products, &crosswalk());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].naics[0].code.as_deref(), Some("325520"));
        assert_eq!(entries[0].product.product_name.as_deref(), Some("Super Glue"));
    }

    #[test]
    fn blank_type_falls_back_to_family() {
        let products = [product("Home maintenance", "Paint", "", "Wall Paint")];
        let entries = resolve_crosswalk(&products, &crosswalk());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].naics[1].code.as_deref(), Some("325510"));
        assert_eq!(entries[0].taxonomy.kind, "");
    }

    #[test]
    fn entries_without_codes_are_discarded() {
        let products = [product("Personal care", "Soap", "", "Bar Soap")];
        assert!(resolve_crosswalk(&products, &crosswalk()).is_empty());
    }

    #[test]
    fn duplicate_products_collapse() {
        let p = product("Home maintenance", "Adhesives", "Glue", "Super Glue");
        let entries = resolve_crosswalk(&[p.clone(), p], &crosswalk());
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn products_are_selected_across_tables() {
        let a = Table::from_rows([product("a", "b", "c", "x")]);
        let b = Table::from_rows([
            product("a", "b", "c", "y"),
            SourceRecord::new().with(PRODUCT_RAW_CAS, "67-64-1"),
        ]);
        assert_eq!(select_products([&a, &b], "50-00-0").len(), 2);
    }
}
