use anyhow::Result;
use chemflow_ingest::{load_sources, load_table, SourcePaths};
use std::fs;
use std::path::{Path, PathBuf};

fn write(dir: &Path, name: &str, text: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, text)?;
    Ok(path)
}

#[test]
fn loads_every_source_and_leaves_optional_ones_empty() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let inventory = write(
        dir.path(),
        "tri.json",
        r#"[{"76. CAS NUMBER": "50-00-0", "74. FRS FACILITY ID": "110000001", "ACTIVITY": "Manufacture"}]"#,
    )?;
    let industrial = write(
        dir.path(),
        "cdr_industrial.json",
        r#"{"columns": ["CHEMICAL ID", "EPA FACILITY REGISTRY ID", "INDUSTRIAL TYPE OF PROCESS OR USE OPERATION"],
            "rows": [["50-00-0", "110000001", "Processing as a reactant"]]}"#,
    )?;
    let consumer = write(
        dir.path(),
        "cdr_consumer.json",
        r#"{"columns": ["CHEMICAL ID", "EPA FACILITY REGISTRY ID", "CONSUMER / COMMERCIAL PRODUCT CATEGORY"]}"#,
    )?;
    let titles = write(
        dir.path(),
        "naics_titles.json",
        r#"[{"2022 NAICS US   Code": 325199, "2022 NAICS US Title": "All Other Basic Organic Chemical Manufacturing"}]"#,
    )?;

    let sources = load_sources(&SourcePaths {
        inventory,
        industrial,
        consumer,
        compositions: Vec::new(),
        crosswalk: None,
        naics_titles: Some(titles),
    })?;

    assert_eq!(sources.inventory.len(), 1);
    assert_eq!(sources.industrial.len(), 1);
    assert!(sources.consumer.is_empty());
    assert_eq!(sources.consumer.columns().len(), 3);
    assert!(sources.crosswalk.is_empty());
    assert_eq!(
        sources.naics_titles.title("325199"),
        Some("All Other Basic Organic Chemical Manufacturing")
    );
    Ok(())
}

#[test]
fn malformed_json_names_the_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write(dir.path(), "broken.json", "[{")?;
    let err = load_table(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.json"));
    Ok(())
}

#[test]
fn missing_file_is_an_error() {
    let err = load_table(Path::new("/nonexistent/chemflow/tri.json")).unwrap_err();
    assert!(err.to_string().contains("failed to read table"));
}
