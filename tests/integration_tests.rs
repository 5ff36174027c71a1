//! Integration tests for the complete chemflow pipeline
//!
//! JSON files on disk → chemflow-ingest → chemflow-core → serialized result.
//!
//! Run with: cargo test --test integration_tests

use chemflow_core::category::Dimension;
use chemflow_core::graph::category_id;
use chemflow_core::{cross_reference, LinkOutcome, MatchPolicy, PipelineConfig};
use chemflow_ingest::{identifier_for, load_sources, SourcePaths};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    path
}

fn fixture(dir: &Path) -> SourcePaths {
    let inventory = write(
        dir,
        "tri_2020.json",
        serde_json::json!([
            {
                "76. CAS NUMBER": "50-00-0",
                "74. FRS FACILITY ID": "110000001",
                "41. PRIMARY NAICS CODE": 325199,
                "ACTIVITY": "Manufacture",
                "RECYCLED": "Yes",
                "89. PRODUCE THE CHEMICAL": "Yes"
            },
            {
                "76. CAS NUMBER": "50-00-0",
                "74. FRS FACILITY ID": "110000002",
                "41. PRIMARY NAICS CODE": "325510",
                "ACTIVITY": null,
                "RECYCLED": "No"
            }
        ]),
    );
    let industrial = write(
        dir,
        "CDR_50-00-0_industrial.json",
        serde_json::json!({
            "columns": [
                "CHEMICAL ID", "EPA FACILITY REGISTRY ID",
                "INDUSTRIAL TYPE OF PROCESS OR USE OPERATION", "INDUSTRIAL FUNCTION CATEGORY",
                "INDUSTRIAL SITES", "IND SITES CODE"
            ],
            "rows": [
                ["50-00-0", "110000001", "Processing as a reactant", "Intermediate", "< 10", "S1"]
            ]
        }),
    );
    let consumer = write(
        dir,
        "CDR_50-00-0_consumer.json",
        serde_json::json!({
            "columns": [
                "CHEMICAL ID", "EPA FACILITY REGISTRY ID",
                "CONSUMER / COMMERCIAL PRODUCT CATEGORY", "CONS / COMM FUNCTION CATEGORY",
                "CONS / COMM PROD CAT OTHER DESC"
            ],
            "rows": [
                ["50-00-0", "110000002", "Other (specify)", "Solvents", "Wood finishing"]
            ]
        }),
    );
    let composition = write(
        dir,
        "chemexpo_part1.json",
        serde_json::json!([
            {
                "Raw CAS": "50-00-0",
                "PUC General Category": "Home maintenance",
                "PUC Product Family": "Paint",
                "PUC Product Type": "",
                "Product Name": "Interior Latex Paint",
                "Raw Central Comp": "0.1"
            }
        ]),
    );
    let crosswalk = write(
        dir,
        "puc_naics.json",
        serde_json::json!([
            {
                "PUC_level1": "Home maintenance",
                "PUC_level2": "Paint",
                "PUC_level3": "Paint",
                "NAICS 1": "325510",
                "NAICS 1 Description": "Paint and Coating Manufacturing"
            }
        ]),
    );
    let titles = write(
        dir,
        "naics_2022.json",
        serde_json::json!([
            {"2022 NAICS US   Code": 325510, "2022 NAICS US Title": "Paint and Coating Manufacturing"}
        ]),
    );

    SourcePaths {
        inventory,
        industrial,
        consumer,
        compositions: vec![composition],
        crosswalk: Some(crosswalk),
        naics_titles: Some(titles),
    }
}

// ============================================================================
// Files → result
// ============================================================================

#[test]
fn test_trace_from_json_files() {
    let dir = tempdir().unwrap();
    let paths = fixture(dir.path());
    let identifier = identifier_for(&paths.industrial, chemflow_core::DEFAULT_FILENAME_PATTERN).unwrap();
    assert_eq!(identifier, "50-00-0");

    let sources = load_sources(&paths).unwrap();
    let result = cross_reference(&identifier, &sources, &PipelineConfig::default());

    assert_eq!(result.outcome, LinkOutcome::Joined);
    assert_eq!(result.linked_records, 2);
    let labels: Vec<_> = result.legend.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(labels, vec!["FRS1(I)", "FRS2(C)"]);

    // Blank activity falls back to CBI.
    assert!(result.index.has_members(Dimension::Activity, "CBI"));
    assert!(result.index.has_members(Dimension::ConsumerProduct, "Wood finishing"));
    // Product family doubles as type for the crosswalk fallback; the matched
    // NAICS line of the second facility carries the product.
    assert_eq!(result.products.len(), 1);
    assert_eq!(result.products[0].product_name, "Interior Latex Paint");
    assert!(result
        .index
        .has_members(Dimension::Naics, "325510 - Paint and Coating Manufacturing"));

    let naics = category_id(Dimension::Naics, "325510");
    let naics_node = result.sections.node(&naics).unwrap();
    assert_eq!(naics_node.label, "325510 - Paint and Coating Manufacturing");
    assert!(result
        .sections
        .has_edge(&naics, &category_id(Dimension::Product, "Interior Latex Paint")));
}

#[test]
fn test_result_json_shape() {
    let dir = tempdir().unwrap();
    let sources = load_sources(&fixture(dir.path())).unwrap();
    let config = PipelineConfig {
        match_policy: MatchPolicy::KeepAll,
        ..PipelineConfig::default()
    };
    let result = cross_reference("50-00-0", &sources, &config);
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["identifier"], "50-00-0");
    assert_eq!(json["outcome"], "Joined");
    assert!(json["graph"]["nodes"].as_array().unwrap().len() > 3);
    assert!(json["sections"]["edges"].is_array());
    assert_eq!(json["summaries"]["1"]["sites"]["code"], "S1");
    assert_eq!(json["summaries"]["2"]["sites"]["value"], "NKRA");
    assert_eq!(
        json["reported_activities"]["1"]["89. PRODUCE THE CHEMICAL"],
        "Yes"
    );
}

#[test]
fn test_config_round_trips_through_json() {
    let config: PipelineConfig =
        serde_json::from_str(r#"{"graph": {"restrict_to_use_facilities": true}}"#).unwrap();
    assert_eq!(config.match_policy, MatchPolicy::KeepLast);
    assert!(config.graph.restrict_to_use_facilities);
    assert!(!config.presort);
}
