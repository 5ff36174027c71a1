//! Chemflow core: cross-source record linkage and categorical flow graphs for
//! chemical facilities.
//!
//! Given one chemical identifier and already-parsed regulatory tables, the core
//! produces every facility known to handle the chemical, indexed by activity,
//! process/use operation, function, industry classification, product and
//! end-of-life, plus a directed graph connecting those dimensions through
//! shared facilities.
//!
//! Stages, leaves first:
//! 1. `linker`: inventory ⋈ use submissions, unified vocabulary, use type
//! 2. `crosswalk`: product composition → PUC → NAICS, with blank-type fallback
//! 3. `naics`: declared industry codes matched against crosswalk entries
//! 4. `registry`: canonical facility codes with retroactive suffix correction
//! 5. `category`: per-dimension membership sets
//! 6. `graph`: detailed flow graph and simplified section graph
//!
//! `pipeline` wires them together for one identifier.

pub mod casrn;
pub mod category;
pub mod columns;
pub mod crosswalk;
pub mod error;
pub mod graph;
pub mod linker;
pub mod naics;
pub mod pipeline;
pub mod registry;
pub mod summary;
pub mod table;

// Re-export key types
pub use casrn::{identifier_from_filename, Casrn, DEFAULT_FILENAME_PATTERN};
pub use category::{CategoryIndex, Dimension, ProductUse};
pub use crosswalk::{resolve_crosswalk, select_products, CrosswalkEntry};
pub use error::{CoreError, CoreResult};
pub use graph::{EdgeStyle, FlowGraph, GraphEdge, GraphNode, GraphOptions, NaicsTitles, NodeKind, SectionGraph};
pub use linker::{link_records, LinkOutcome, LinkedRecord, LinkedView, UseTables, UseType};
pub use naics::{match_industry_codes, AnnotatedRecord, MatchPolicy, MatchReport};
pub use pipeline::{build_flow_graph, cross_reference, CrossReference, FlowBuild, PipelineConfig, Sources};
pub use registry::{FacilityCode, FacilityRegistry};
pub use summary::{FacilitySummaries, FacilitySummary, ReportedActivities};
pub use table::{CellValue, SourceRecord, Table};
