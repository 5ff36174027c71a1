//! Flow graph assembly.
//!
//! Two pure builders over a finished [`CategoryIndex`]:
//!
//! - [`build_detailed_graph`]: category nodes grouped per dimension, joined
//!   through hub (convergence) nodes, with one leaf per facility code and a
//!   membership edge from every category node to each of its facilities.
//!   Recycling feeds back into the first populated activity through the
//!   `ToManufacture` hub.
//! - [`build_section_graph`]: category nodes only, NAICS values merged by their
//!   six-digit prefix, with an edge between two categories of adjacent stages
//!   whenever they share a facility.
//!
//! Both graphs drop a repeated `(source, target)` pair and keep insertion order,
//! so the same index always yields the same graph.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::category::{CategoryIndex, Dimension, Members, ACTIVITIES, CBI, RECYCLING};
use crate::columns::{NAICS_TITLE, NAICS_TITLE_CODE};
use crate::naics::truncate_code;
use crate::registry::{FacilityCode, FacilityRegistry};
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hub {
    ToProcess,
    ToFunction,
    ToEndOfLife,
    ToNaics,
    ToProduct,
    ToManufacture,
}

impl Hub {
    fn tag(self) -> &'static str {
        match self {
            Hub::ToProcess => "to_process",
            Hub::ToFunction => "to_function",
            Hub::ToEndOfLife => "to_end_of_life",
            Hub::ToNaics => "to_naics",
            Hub::ToProduct => "to_product",
            Hub::ToManufacture => "to_manufacture",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "of", rename_all = "snake_case")]
pub enum NodeKind {
    Category(Dimension),
    Hub(Hub),
    Facility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    /// Facilities behind a category node; zero for hubs and leaves.
    pub members: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    Flow,
    EndOfLife,
    Recycled,
    Membership,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub style: EdgeStyle,
}

/// Options for graph assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// Only facilities present in a process/consumer category become leaves and
    /// contribute membership.
    ///
    /// Off by default, so every indexed facility is drawn. Turning it on yields
    /// the published diagrams, which only show facilities that reported an
    /// industrial process or a consumer/commercial product use.
    pub restrict_to_use_facilities: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    #[serde(skip)]
    node_index: HashMap<String, usize>,
    #[serde(skip)]
    edge_keys: HashSet<(String, String)>,
}

/// Category-only diagram.
pub type SectionGraph = FlowGraph;

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edge_keys
            .contains(&(source.to_string(), target.to_string()))
    }

    /// Adds the node unless its id is already present; returns the id.
    pub fn add_node(&mut self, id: String, kind: NodeKind, label: String, members: usize) -> String {
        if !self.node_index.contains_key(&id) {
            self.node_index.insert(id.clone(), self.nodes.len());
            self.nodes.push(GraphNode {
                id: id.clone(),
                kind,
                label,
                members,
            });
        }
        id
    }

    /// Adds the edge unless `(source, target)` is already present. Returns whether it was added.
    pub fn add_edge(&mut self, source: &str, target: &str, style: EdgeStyle) -> bool {
        if !self
            .edge_keys
            .insert((source.to_string(), target.to_string()))
        {
            return false;
        }
        self.edges.push(GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            style,
        });
        true
    }

    pub fn edges_from<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == source)
    }

    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &GraphNode> + '_ {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    fn hub(&mut self, hub: Hub) -> String {
        self.add_node(hub_id(hub), NodeKind::Hub(hub), String::new(), 0)
    }
}

pub fn category_id(dimension: Dimension, category: &str) -> String {
    format!("{}:{}", dimension.tag(), category)
}

pub fn hub_id(hub: Hub) -> String {
    format!("hub:{}", hub.tag())
}

pub fn facility_id(code: FacilityCode) -> String {
    format!("facility:{}", code.number())
}

/// Node label of a non-NAICS category; `CBI` is spelled out wherever it appears.
fn category_label(dimension: Dimension, category: &str) -> String {
    match dimension {
        Dimension::Activity | Dimension::EndOfLife if category == CBI => {
            "Confidential Business Information".to_string()
        }
        _ => category.to_string(),
    }
}

/// Detailed graph with hubs and facility leaves.
pub fn build_detailed_graph(
    index: &CategoryIndex,
    registry: &FacilityRegistry,
    options: &GraphOptions,
) -> FlowGraph {
    let mut g = FlowGraph::new();
    let allowed = options
        .restrict_to_use_facilities
        .then(|| index.use_facilities());
    let keep = |members: &Members| -> Vec<FacilityCode> {
        members
            .iter()
            .copied()
            .filter(|c| allowed.as_ref().map_or(true, |a| a.contains(c)))
            .collect()
    };

    // Category nodes, remembered with their kept members for the membership pass.
    let mut category_nodes: Vec<(String, Vec<FacilityCode>)> = Vec::new();
    let mut add_category = |g: &mut FlowGraph, dimension: Dimension, category: &str, members: &Members| {
        let kept = keep(members);
        let label = category_label(dimension, category);
        let id = g.add_node(
            category_id(dimension, category),
            NodeKind::Category(dimension),
            label,
            kept.len(),
        );
        category_nodes.push((id.clone(), kept));
        id
    };

    let empty = Members::new();
    for activity in ACTIVITIES {
        let members = index.members(Dimension::Activity, activity).unwrap_or(&empty);
        let id = add_category(&mut g, Dimension::Activity, activity, members);
        if !keep(members).is_empty() {
            let to_process = g.hub(Hub::ToProcess);
            g.add_edge(&id, &to_process, EdgeStyle::Flow);
        }
    }

    for dimension in [Dimension::IndustrialProcess, Dimension::ConsumerProduct] {
        for (category, members) in index.categories(dimension) {
            let id = add_category(&mut g, dimension, category, members);
            let to_process = g.hub(Hub::ToProcess);
            let to_function = g.hub(Hub::ToFunction);
            g.add_edge(&to_process, &id, EdgeStyle::Flow);
            g.add_edge(&id, &to_function, EdgeStyle::Flow);
        }
    }

    for (category, members) in index.categories(Dimension::Function) {
        let id = add_category(&mut g, Dimension::Function, category, members);
        let to_function = g.hub(Hub::ToFunction);
        let to_eol = g.hub(Hub::ToEndOfLife);
        let to_naics = g.hub(Hub::ToNaics);
        g.add_edge(&to_function, &id, EdgeStyle::Flow);
        g.add_edge(&id, &to_eol, EdgeStyle::EndOfLife);
        g.add_edge(&id, &to_naics, EdgeStyle::Flow);
    }

    for (category, members) in index.categories(Dimension::EndOfLife) {
        let id = add_category(&mut g, Dimension::EndOfLife, category, members);
        let to_eol = g.hub(Hub::ToEndOfLife);
        g.add_edge(&to_eol, &id, EdgeStyle::EndOfLife);
    }

    for (category, members) in index.categories(Dimension::Naics) {
        let id = add_category(&mut g, Dimension::Naics, category, members);
        let to_naics = g.hub(Hub::ToNaics);
        let to_product = g.hub(Hub::ToProduct);
        g.add_edge(&to_naics, &id, EdgeStyle::Flow);
        g.add_edge(&id, &to_product, EdgeStyle::Flow);
    }

    for (category, members) in index.categories(Dimension::Product) {
        let id = add_category(&mut g, Dimension::Product, category, members);
        let to_product = g.hub(Hub::ToProduct);
        g.add_edge(&to_product, &id, EdgeStyle::Flow);
    }

    for (node, members) in &category_nodes {
        for &code in members {
            let leaf = g.add_node(facility_id(code), NodeKind::Facility, registry.label(code), 0);
            g.add_edge(node, &leaf, EdgeStyle::Membership);
        }
    }

    let populated = |dimension: Dimension, category: &str| {
        index
            .members(dimension, category)
            .is_some_and(|members| !keep(members).is_empty())
    };
    if populated(Dimension::EndOfLife, RECYCLING) {
        let target = ACTIVITIES
            .into_iter()
            .find(|activity| populated(Dimension::Activity, activity));
        if let Some(activity) = target {
            let to_manufacture = g.hub(Hub::ToManufacture);
            let recycling = category_id(Dimension::EndOfLife, RECYCLING);
            g.add_edge(&recycling, &to_manufacture, EdgeStyle::Recycled);
            g.add_edge(
                &to_manufacture,
                &category_id(Dimension::Activity, activity),
                EdgeStyle::Recycled,
            );
        }
    }

    tracing::info!(
        nodes = g.nodes.len(),
        edges = g.edges.len(),
        restricted = options.restrict_to_use_facilities,
        "assembled flow graph"
    );
    g
}

// -----------------------------------------------------------------------------
// Section graph
// -----------------------------------------------------------------------------

/// NAICS code → official title, for labelling merged NAICS sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NaicsTitles {
    titles: HashMap<String, String>,
}

impl NaicsTitles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, title: impl Into<String>) {
        self.titles.insert(code.into(), title.into());
    }

    /// Reads the code and title columns of a NAICS titles table; rows missing either are skipped.
    pub fn from_table(table: &Table) -> Self {
        let mut titles = Self::new();
        for row in table.rows() {
            if let (Some(code), Some(title)) = (row.text(NAICS_TITLE_CODE), row.text(NAICS_TITLE)) {
                titles.insert(code, title);
            }
        }
        titles
    }

    pub fn title(&self, code: &str) -> Option<&str> {
        if code == CBI {
            return Some("Confidential Business Information");
        }
        self.titles.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// NAICS categories merged by six-character prefix.
fn merged_naics(index: &CategoryIndex) -> BTreeMap<String, Members> {
    let mut merged: BTreeMap<String, Members> = BTreeMap::new();
    for (category, members) in index.categories(Dimension::Naics) {
        merged
            .entry(truncate_code(category))
            .or_default()
            .extend(members.iter().copied());
    }
    merged
}

struct Stage {
    dimension: Dimension,
    sections: Vec<(String, Members)>,
}

impl Stage {
    fn of(index: &CategoryIndex, dimension: Dimension, allowed: Option<&Members>) -> Self {
        let sections = index
            .categories(dimension)
            .map(|(category, members)| (category.to_string(), members.clone()))
            .collect();
        Self::filtered(dimension, sections, allowed)
    }

    fn filtered(dimension: Dimension, sections: Vec<(String, Members)>, allowed: Option<&Members>) -> Self {
        let sections = sections
            .into_iter()
            .map(|(category, members)| match allowed {
                Some(allowed) => (category, members.intersection(allowed).copied().collect()),
                None => (category, members),
            })
            .filter(|(_, members): &(String, Members)| !members.is_empty())
            .collect();
        Self { dimension, sections }
    }
}

fn connect(g: &mut FlowGraph, from: &Stage, to: &Stage, style: EdgeStyle) {
    for (source, source_members) in &from.sections {
        for (target, target_members) in &to.sections {
            if !source_members.is_disjoint(target_members) {
                g.add_edge(
                    &category_id(from.dimension, source),
                    &category_id(to.dimension, target),
                    style,
                );
            }
        }
    }
}

/// Simplified diagram: category sections linked by shared facilities.
pub fn build_section_graph(
    index: &CategoryIndex,
    titles: &NaicsTitles,
    options: &GraphOptions,
) -> SectionGraph {
    let allowed = options
        .restrict_to_use_facilities
        .then(|| index.use_facilities());
    let allowed = allowed.as_ref();

    let activities = Stage::filtered(
        Dimension::Activity,
        ACTIVITIES
            .iter()
            .filter_map(|a| {
                index
                    .members(Dimension::Activity, a)
                    .map(|m| (a.to_string(), m.clone()))
            })
            .collect(),
        allowed,
    );
    // Process and consumer sections define the allowed set, so they are never filtered.
    let processes = Stage::of(index, Dimension::IndustrialProcess, None);
    let consumers = Stage::of(index, Dimension::ConsumerProduct, None);
    let functions = Stage::of(index, Dimension::Function, allowed);
    let naics = Stage::filtered(Dimension::Naics, merged_naics(index).into_iter().collect(), allowed);
    let products = Stage::of(index, Dimension::Product, allowed);
    let end_of_life = Stage::of(index, Dimension::EndOfLife, allowed);

    let mut g = FlowGraph::new();
    for stage in [&activities, &processes, &consumers, &functions, &naics, &products, &end_of_life] {
        for (category, members) in &stage.sections {
            let label = match stage.dimension {
                Dimension::Naics => match titles.title(category) {
                    Some(title) => format!("{category} - {title}"),
                    None => category.clone(),
                },
                dimension => category_label(dimension, category),
            };
            g.add_node(
                category_id(stage.dimension, category),
                NodeKind::Category(stage.dimension),
                label,
                members.len(),
            );
        }
    }

    connect(&mut g, &activities, &processes, EdgeStyle::Flow);
    connect(&mut g, &activities, &consumers, EdgeStyle::Flow);
    connect(&mut g, &processes, &functions, EdgeStyle::Flow);
    connect(&mut g, &consumers, &functions, EdgeStyle::Flow);
    connect(&mut g, &functions, &end_of_life, EdgeStyle::EndOfLife);
    connect(&mut g, &functions, &naics, EdgeStyle::Flow);
    connect(&mut g, &naics, &products, EdgeStyle::Flow);

    let recycling = end_of_life
        .sections
        .iter()
        .any(|(category, _)| category == RECYCLING);
    if recycling {
        let source = category_id(Dimension::EndOfLife, RECYCLING);
        for (activity, _) in &activities.sections {
            g.add_edge(&source, &category_id(Dimension::Activity, activity), EdgeStyle::Recycled);
        }
    }

    tracing::info!(
        nodes = g.nodes.len(),
        edges = g.edges.len(),
        "assembled section graph"
    );
    g
}
