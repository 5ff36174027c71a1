//! Graph rendering: Graphviz DOT text and JSON.
//!
//! DOT output groups category nodes into one cluster per dimension; hubs are
//! small circles and facility leaves plain boxes. Turning the DOT into an image
//! is left to Graphviz.

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use chemflow_core::{Dimension, EdgeStyle, FlowGraph, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Dot,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "dot" | "gv" | "graphviz" => Ok(Self::Dot),
            other => Err(anyhow!("unknown output format `{other}` (expected json|dot)")),
        }
    }
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace("\r\n", "\\n")
        .replace(['\n', '\r'], "\\n")
}

fn cluster_color(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Activity => "lightblue",
        Dimension::IndustrialProcess | Dimension::ConsumerProduct => "lightgreen",
        Dimension::Function => "lightcyan",
        Dimension::Naics => "lightgoldenrodyellow",
        Dimension::EndOfLife => "lightpink",
        Dimension::Product => "lightgrey",
    }
}

fn edge_attrs(style: EdgeStyle) -> &'static str {
    match style {
        EdgeStyle::Flow => "color=\"black\", style=\"bold\"",
        EdgeStyle::EndOfLife => "color=\"pink\", style=\"bold\"",
        EdgeStyle::Recycled => "color=\"darkgreen\", style=\"bold\"",
        EdgeStyle::Membership => "color=\"gray50\", style=\"dashed\", arrowhead=\"none\"",
    }
}

pub fn render_dot(graph: &FlowGraph, title: &str) -> String {
    let mut out = String::new();
    out.push_str("digraph chemflow {\n");
    out.push_str("  rankdir=TB;\n");
    out.push_str(&format!("  label=\"{}\";\n", dot_escape(title)));
    out.push_str("  labelloc=\"t\";\n");
    out.push_str("  node [shape=box, style=filled, fillcolor=white, fontname=\"Helvetica\"];\n");
    out.push_str("  edge [fontname=\"Helvetica\"];\n\n");

    let mut clusters: BTreeMap<Dimension, Vec<String>> = BTreeMap::new();
    let mut loose = Vec::new();
    for node in &graph.nodes {
        let id = dot_escape(&node.id);
        let label = dot_escape(&node.label);
        match node.kind {
            NodeKind::Category(dimension) => clusters
                .entry(dimension)
                .or_default()
                .push(format!("    \"{id}\" [label=\"{label}\"];")),
            NodeKind::Hub(_) => loose.push(format!(
                "  \"{id}\" [label=\"\", shape=circle, width=0.25, fillcolor=lightblue];"
            )),
            NodeKind::Facility => loose.push(format!("  \"{id}\" [label=\"{label}\"];")),
        }
    }

    for (i, (dimension, lines)) in clusters.iter().enumerate() {
        out.push_str(&format!("  subgraph cluster_{i} {{\n"));
        out.push_str(&format!("    label=\"{}\";\n", dot_escape(dimension.label())));
        out.push_str(&format!(
            "    style=filled;\n    color=\"{}\";\n",
            cluster_color(*dimension)
        ));
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("  }\n");
    }
    for line in &loose {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');

    for edge in &graph.edges {
        out.push_str(&format!(
            "  \"{}\" -> \"{}\" [{}];\n",
            dot_escape(&edge.source),
            dot_escape(&edge.target),
            edge_attrs(edge.style)
        ));
    }
    out.push_str("}\n");
    out
}

pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chemflow_core::graph::{category_id, facility_id};
    use chemflow_core::{CategoryIndex, FacilityRegistry, GraphOptions, UseType};

    #[test]
    fn format_parsing() {
        assert_eq!(OutputFormat::parse(" DOT ").unwrap(), OutputFormat::Dot);
        assert!(OutputFormat::parse("png").is_err());
    }

    #[test]
    fn line_breaks_are_escaped() {
        assert_eq!(dot_escape("Wood\nfinishing"), "Wood\\nfinishing");
        assert_eq!(dot_escape("a\r\nb\rc"), "a\\nb\\nc");

        let mut registry = FacilityRegistry::new();
        let code = registry.get_or_assign("110000001", UseType::ConsumerCommercial);
        let mut index = CategoryIndex::new();
        index.insert(Dimension::ConsumerProduct, "Wood\nfinishing", code);
        let graph = chemflow_core::graph::build_detailed_graph(&index, &registry, &GraphOptions::default());
        let dot = render_dot(&graph, "t");
        assert!(dot.lines().all(|line| !line.starts_with("finishing")));
        assert!(dot.contains("label=\"Wood\\nfinishing\""));
    }

    #[test]
    fn dot_quotes_and_clusters() {
        let mut registry = FacilityRegistry::new();
        let code = registry.get_or_assign("110000001", UseType::Industrial);
        let mut index = CategoryIndex::new();
        index.insert(Dimension::Function, "Solvents \"neat\"", code);
        let graph = chemflow_core::graph::build_detailed_graph(&index, &registry, &GraphOptions::default());

        let dot = render_dot(&graph, "Qualitative Mapping (CAS No. 50-00-0)");
        assert!(dot.starts_with("digraph chemflow {"));
        assert!(dot.contains("label=\"Function\""));
        assert!(dot.contains("Solvents \\\"neat\\\""));
        let function = dot_escape(&category_id(Dimension::Function, "Solvents \"neat\""));
        assert!(dot.contains(&format!("\"{function}\" -> \"{}\"", facility_id(code))));
        assert!(dot.contains("FRS1(I)"));
    }
}
