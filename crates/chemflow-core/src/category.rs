//! Category index: dimension → category value → set of facility codes.
//!
//! Filled in the single pass over annotated records, one record at a time, with
//! the facility code the registry handed out for that record. Insertion is
//! idempotent; re-adding a record changes nothing.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::columns::{
    ACTIVITY, CONSUMER_FUNCTION, CONSUMER_OTHER_FUNCTION, CONSUMER_OTHER_PRODUCT,
    CONSUMER_PRODUCT, INDUSTRIAL_FUNCTION, INDUSTRIAL_OTHER_FUNCTION, INDUSTRIAL_OTHER_PROCESS,
    INDUSTRIAL_PROCESS, RECYCLED,
};
use crate::crosswalk::{ProductAttributes, Taxonomy};
use crate::naics::AnnotatedRecord;
use crate::registry::{FacilityCode, FacilityRegistry};
use crate::table::SourceRecord;

pub const CBI: &str = "CBI";
pub const MANUFACTURE: &str = "Manufacture";
pub const IMPORT: &str = "Import";

/// Activity categories in feedback-target order.
pub const ACTIVITIES: [&str; 3] = [CBI, MANUFACTURE, IMPORT];

pub const RECYCLING: &str = "Recycling";
pub const DISPOSAL: &str = "Disposal";

const OTHER_LABELS: [&str; 2] = ["Other", "Other (specify)"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Dimension {
    Activity,
    IndustrialProcess,
    ConsumerProduct,
    Function,
    Naics,
    EndOfLife,
    Product,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::Activity,
        Dimension::IndustrialProcess,
        Dimension::ConsumerProduct,
        Dimension::Function,
        Dimension::Naics,
        Dimension::EndOfLife,
        Dimension::Product,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Activity => "Manufacturing/Import",
            Dimension::IndustrialProcess => "Industrial Process or Use Operation",
            Dimension::ConsumerProduct => "Consumer and Commercial Product Use Category",
            Dimension::Function => "Function",
            Dimension::Naics => "NAICS Codes and Descriptions",
            Dimension::EndOfLife => "Industrial End-of-Life",
            Dimension::Product => "Product Use Information",
        }
    }

    /// Short tag used in node ids.
    pub fn tag(self) -> &'static str {
        match self {
            Dimension::Activity => "activity",
            Dimension::IndustrialProcess => "process",
            Dimension::ConsumerProduct => "consumer",
            Dimension::Function => "function",
            Dimension::Naics => "naics",
            Dimension::EndOfLife => "eol",
            Dimension::Product => "product",
        }
    }
}

/// `RECYCLED` flag → end-of-life category.
pub fn end_of_life_category(flag: &str) -> Option<&'static str> {
    match flag {
        "Yes" => Some(RECYCLING),
        "No" => Some(DISPOSAL),
        "CBI" => Some(CBI),
        _ => None,
    }
}

/// One product-use row: a kept crosswalk match with a product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductUse {
    pub product_name: String,
    pub facility: FacilityCode,
    pub slot: usize,
    pub naics_code: String,
    pub naics_description: Option<String>,
    pub taxonomy: Taxonomy,
    pub attributes: ProductAttributes,
}

pub type Members = BTreeSet<FacilityCode>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryIndex {
    dimensions: BTreeMap<Dimension, BTreeMap<String, Members>>,
}

impl CategoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the membership was new.
    pub fn insert(&mut self, dimension: Dimension, category: impl Into<String>, code: FacilityCode) -> bool {
        self.dimensions
            .entry(dimension)
            .or_default()
            .entry(category.into())
            .or_default()
            .insert(code)
    }

    pub fn members(&self, dimension: Dimension, category: &str) -> Option<&Members> {
        self.dimensions.get(&dimension)?.get(category)
    }

    pub fn has_members(&self, dimension: Dimension, category: &str) -> bool {
        self.members(dimension, category)
            .is_some_and(|members| !members.is_empty())
    }

    /// Categories of one dimension in key order.
    pub fn categories(&self, dimension: Dimension) -> impl Iterator<Item = (&str, &Members)> + '_ {
        self.dimensions
            .get(&dimension)
            .into_iter()
            .flat_map(|categories| categories.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Industrial process ∪ consumer product category.
    pub fn process_or_use(&self) -> BTreeMap<String, Members> {
        let mut out: BTreeMap<String, Members> = BTreeMap::new();
        for dimension in [Dimension::IndustrialProcess, Dimension::ConsumerProduct] {
            for (category, members) in self.categories(dimension) {
                out.entry(category.to_string())
                    .or_default()
                    .extend(members.iter().copied());
            }
        }
        out
    }

    /// Every facility appearing in a process/consumer category.
    pub fn use_facilities(&self) -> Members {
        self.process_or_use().into_values().flatten().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.values().all(|c| c.values().all(BTreeSet::is_empty))
    }

    pub fn membership_count(&self) -> usize {
        self.dimensions
            .values()
            .flat_map(|c| c.values())
            .map(BTreeSet::len)
            .sum()
    }

    /// Index one annotated record under `code`; returns its product-use rows.
    pub fn add_record(&mut self, annotated: &AnnotatedRecord, code: FacilityCode) -> Vec<ProductUse> {
        let fields = annotated.record.fields();

        if fields.has_column(ACTIVITY) {
            let activity = fields.text(ACTIVITY).unwrap_or_else(|| CBI.to_string());
            if ACTIVITIES.contains(&activity.as_str()) {
                self.insert(Dimension::Activity, activity, code);
            }
        }

        if let Some(process) = substitute_other(fields, INDUSTRIAL_PROCESS, INDUSTRIAL_OTHER_PROCESS) {
            self.insert(Dimension::IndustrialProcess, process, code);
        }
        if let Some(product) = substitute_other(fields, CONSUMER_PRODUCT, CONSUMER_OTHER_PRODUCT) {
            self.insert(Dimension::ConsumerProduct, product, code);
        }
        for (column, other) in [
            (INDUSTRIAL_FUNCTION, INDUSTRIAL_OTHER_FUNCTION),
            (CONSUMER_FUNCTION, CONSUMER_OTHER_FUNCTION),
        ] {
            if let Some(function) = substitute_other(fields, column, other) {
                self.insert(Dimension::Function, function, code);
            }
        }

        let mut products = Vec::new();
        for declared in &annotated.declared {
            self.insert(Dimension::Naics, declared.code.clone(), code);
        }
        for (&slot, kept) in &annotated.matches {
            for m in kept {
                if let Some(key) = m.category_key() {
                    self.insert(Dimension::Naics, key, code);
                }
                if let Some(name) = &m.product.product_name {
                    self.insert(Dimension::Product, name.clone(), code);
                    products.push(ProductUse {
                        product_name: name.clone(),
                        facility: code,
                        slot,
                        naics_code: m.code.clone(),
                        naics_description: m.description.clone(),
                        taxonomy: m.taxonomy.clone(),
                        attributes: m.product.clone(),
                    });
                }
            }
        }

        if let Some(category) = fields.text(RECYCLED).as_deref().and_then(end_of_life_category) {
            self.insert(Dimension::EndOfLife, category, code);
        }

        products
    }

    /// The index with facility codes rendered through the registry.
    pub fn render(&self, registry: &FacilityRegistry) -> BTreeMap<&'static str, BTreeMap<String, Vec<String>>> {
        self.dimensions
            .iter()
            .map(|(dimension, categories)| {
                let rendered = categories
                    .iter()
                    .map(|(category, members)| {
                        let labels = members.iter().map(|&c| registry.label(c)).collect();
                        (category.clone(), labels)
                    })
                    .collect();
                (dimension.label(), rendered)
            })
            .collect()
    }
}

/// Category value of `column`, with `Other`/`Other (specify)` replaced by the
/// companion free-text column when that column exists.
fn substitute_other(fields: &SourceRecord, column: &str, other_column: &str) -> Option<String> {
    let value = fields.text(column)?;
    if OTHER_LABELS.contains(&value.as_str()) && fields.has_column(other_column) {
        return fields.text(other_column);
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linker::{LinkedRecord, UseType};

    fn annotated(record: SourceRecord) -> AnnotatedRecord {
        AnnotatedRecord::bare(LinkedRecord::new(record))
    }

    fn code(registry: &mut FacilityRegistry, id: &str) -> FacilityCode {
        registry.get_or_assign(id, UseType::Industrial)
    }

    #[test]
    fn blank_activity_is_cbi_and_unknown_activities_are_dropped() {
        let mut reg = FacilityRegistry::new();
        let mut index = CategoryIndex::new();
        let a = code(&mut reg, "1");
        let b = code(&mut reg, "2");
        index.add_record(&annotated(SourceRecord::new().with(ACTIVITY, "")), a);
        index.add_record(&annotated(SourceRecord::new().with(ACTIVITY, "Export")), b);
        assert!(index.members(Dimension::Activity, CBI).unwrap().contains(&a));
        assert_eq!(index.categories(Dimension::Activity).count(), 1);
    }

    #[test]
    fn missing_activity_column_skips_dimension() {
        let mut reg = FacilityRegistry::new();
        let mut index = CategoryIndex::new();
        let a = code(&mut reg, "1");
        index.add_record(&annotated(SourceRecord::new().with(INDUSTRIAL_PROCESS, "Repackaging")), a);
        assert_eq!(index.categories(Dimension::Activity).count(), 0);
        assert!(index.has_members(Dimension::IndustrialProcess, "Repackaging"));
    }

    #[test]
    fn other_is_replaced_by_free_text() {
        let mut reg = FacilityRegistry::new();
        let mut index = CategoryIndex::new();
        let a = code(&mut reg, "1");
        let record = SourceRecord::new()
            .with(INDUSTRIAL_PROCESS, "Other (specify)")
            .with(INDUSTRIAL_OTHER_PROCESS, "Etching")
            .with(CONSUMER_FUNCTION, "Other")
            .with(CONSUMER_OTHER_FUNCTION, "")
            .with(INDUSTRIAL_FUNCTION, "Other");
        index.add_record(&annotated(record), a);
        assert!(index.has_members(Dimension::IndustrialProcess, "Etching"));
        // blank free text indexes nothing; a missing companion column keeps the label
        let functions: Vec<_> = index.categories(Dimension::Function).map(|(k, _)| k).collect();
        assert_eq!(functions, vec!["Other"]);
    }

    #[test]
    fn end_of_life_accepts_only_known_flags() {
        let mut reg = FacilityRegistry::new();
        let mut index = CategoryIndex::new();
        let a = code(&mut reg, "1");
        let b = code(&mut reg, "2");
        index.add_record(&annotated(SourceRecord::new().with(RECYCLED, "Yes")), a);
        index.add_record(&annotated(SourceRecord::new().with(RECYCLED, "Maybe")), b);
        assert!(index.has_members(Dimension::EndOfLife, RECYCLING));
        assert_eq!(index.membership_count(), 1);
    }

    #[test]
    fn re_adding_a_record_is_idempotent() {
        let mut reg = FacilityRegistry::new();
        let mut index = CategoryIndex::new();
        let a = code(&mut reg, "1");
        let record = annotated(
            SourceRecord::new()
                .with(ACTIVITY, "Manufacture")
                .with(INDUSTRIAL_FUNCTION, "Solvents")
                .with(RECYCLED, "No"),
        );
        index.add_record(&record, a);
        let once = index.clone();
        index.add_record(&record, a);
        assert_eq!(index, once);
    }

    #[test]
    fn process_or_use_unions_both_sub_dimensions() {
        let mut reg = FacilityRegistry::new();
        let mut index = CategoryIndex::new();
        let a = code(&mut reg, "1");
        let b = code(&mut reg, "2");
        index.insert(Dimension::IndustrialProcess, "Repackaging", a);
        index.insert(Dimension::ConsumerProduct, "Repackaging", b);
        index.insert(Dimension::ConsumerProduct, "Paints", b);
        let union = index.process_or_use();
        assert_eq!(union["Repackaging"].len(), 2);
        assert_eq!(index.use_facilities().len(), 2);
    }
}
