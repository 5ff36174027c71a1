//! One identifier, end to end: link → products → crosswalk → match → single
//! indexing pass → graphs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::{CategoryIndex, ProductUse};
use crate::crosswalk::{resolve_crosswalk, select_products};
use crate::graph::{
    build_detailed_graph, build_section_graph, FlowGraph, GraphOptions, NaicsTitles, SectionGraph,
};
use crate::linker::{link_records, LinkOutcome, UseTables};
use crate::naics::{match_industry_codes, AnnotatedRecord, MatchPolicy, MatchReport};
use crate::registry::{FacilityRegistry, LegendEntry};
use crate::summary::{FacilitySummaries, ReportedActivities};
use crate::table::Table;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub match_policy: MatchPolicy,
    pub graph: GraphOptions,
    /// Sort linked records by facility identity before the pass, so facility
    /// codes do not depend on source row order.
    pub presort: bool,
}

/// Already-parsed source tables.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub inventory: Table,
    pub industrial: Table,
    pub consumer: Table,
    pub compositions: Vec<Table>,
    pub crosswalk: Table,
    pub naics_titles: NaicsTitles,
}

/// Everything the single pass produces.
#[derive(Debug, Clone, Default)]
pub struct FlowBuild {
    pub registry: FacilityRegistry,
    pub index: CategoryIndex,
    pub products: Vec<ProductUse>,
    pub summaries: FacilitySummaries,
    pub activities: ReportedActivities,
    pub graph: FlowGraph,
    /// Records without any facility identity.
    pub skipped_records: usize,
}

/// Run the single pass over annotated records and assemble the detailed graph.
///
/// Records are visited in the given order; the registry assigns codes in that
/// order, so identical input yields identical codes and graph.
pub fn build_flow_graph(annotated: &[AnnotatedRecord], options: &GraphOptions) -> FlowBuild {
    let mut build = FlowBuild::default();

    for record in annotated {
        let Some(identity) = record.record.facility_identity() else {
            build.skipped_records += 1;
            continue;
        };
        let code = build
            .registry
            .get_or_assign(&identity, record.record.use_type());
        let products = build.index.add_record(record, code);
        build.products.extend(products);
        build
            .summaries
            .observe(code, &identity, record.record.fields());
        build.activities.observe(code, record.record.fields());
    }

    if build.skipped_records > 0 {
        tracing::warn!(
            skipped = build.skipped_records,
            "records without a facility identifier were skipped"
        );
    }
    let conflicts = build.registry.conflicts().count();
    if conflicts > 0 {
        tracing::warn!(conflicts, "facilities reported with both use types");
    }

    build.graph = build_detailed_graph(&build.index, &build.registry, options);
    tracing::info!(
        facilities = build.registry.len(),
        memberships = build.index.membership_count(),
        products = build.products.len(),
        "indexed linked records"
    );
    build
}

/// Serializable result for one identifier.
#[derive(Debug, Clone, Serialize)]
pub struct CrossReference {
    pub identifier: String,
    pub outcome: LinkOutcome,
    pub linked_records: usize,
    pub product_rows: usize,
    pub crosswalk_entries: usize,
    pub match_report: MatchReport,
    pub skipped_records: usize,
    pub legend: Vec<LegendEntry>,
    pub categories: BTreeMap<&'static str, BTreeMap<String, Vec<String>>>,
    pub products: Vec<ProductUse>,
    pub summaries: FacilitySummaries,
    pub reported_activities: ReportedActivities,
    pub graph: FlowGraph,
    pub sections: SectionGraph,
    #[serde(skip)]
    pub registry: FacilityRegistry,
    #[serde(skip)]
    pub index: CategoryIndex,
}

impl CrossReference {
    pub fn is_empty(&self) -> bool {
        self.linked_records == 0
    }
}

/// Cross-reference every source for `identifier`. Never fails: an unknown
/// identifier yields an empty result with [`LinkOutcome::NoIdentifierMatch`].
pub fn cross_reference(identifier: &str, sources: &Sources, config: &PipelineConfig) -> CrossReference {
    let mut view = link_records(
        identifier,
        &sources.inventory,
        UseTables {
            industrial: &sources.industrial,
            consumer: &sources.consumer,
        },
    );
    if config.presort {
        view.sort_by_facility();
    }

    let products = select_products(&sources.compositions, &view.identifier);
    let crosswalk = resolve_crosswalk(&products, &sources.crosswalk);
    let (annotated, match_report) = match_industry_codes(&view, &crosswalk, config.match_policy);

    let build = build_flow_graph(&annotated, &config.graph);
    let sections = build_section_graph(&build.index, &sources.naics_titles, &config.graph);

    CrossReference {
        identifier: view.identifier.clone(),
        outcome: view.outcome,
        linked_records: view.len(),
        product_rows: products.len(),
        crosswalk_entries: crosswalk.len(),
        match_report,
        skipped_records: build.skipped_records,
        legend: build.registry.legend(),
        categories: build.index.render(&build.registry),
        products: build.products,
        summaries: build.summaries,
        reported_activities: build.activities,
        graph: build.graph,
        sections,
        registry: build.registry,
        index: build.index,
    }
}
