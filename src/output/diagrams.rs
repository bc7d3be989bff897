// Diagram generation for Codeatlas
//
// Builds Mermaid flowcharts from node and edge lists. Edge endpoints that
// were never declared as nodes are materialized with their id as label.

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{Error, ExtractError};

/// A node in a diagram
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// A node referenced only by an edge; labelled with its id
    pub fn implicit(id: &str) -> Self {
        Self::new(id, id)
    }
}

/// A directed edge between node ids
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

impl GraphEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Flowchart orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TD")]
    TopDown,
    #[serde(rename = "LR")]
    LeftRight,
    #[serde(rename = "BT")]
    BottomUp,
    #[serde(rename = "RL")]
    RightLeft,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopDown => "TD",
            Self::LeftRight => "LR",
            Self::BottomUp => "BT",
            Self::RightLeft => "RL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TD" | "TB" => Ok(Self::TopDown),
            "LR" => Ok(Self::LeftRight),
            "BT" => Ok(Self::BottomUp),
            "RL" => Ok(Self::RightLeft),
            other => Err(Error::config_validation(format!(
                "Unknown diagram direction '{}' (expected TD, LR, BT or RL)",
                other
            ))),
        }
    }
}

/// Diagram generator for creating Mermaid diagrams
#[derive(Debug, Clone)]
pub struct DiagramGenerator {
    /// Largest graph, implicit nodes included, that will be rendered
    max_nodes: usize,
    direction: Direction,
}

impl DiagramGenerator {
    /// Create a generator with no node limit
    pub fn new() -> Self {
        Self {
            max_nodes: usize::MAX,
            direction: Direction::TopDown,
        }
    }

    /// Set maximum node count
    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = max;
        self
    }

    /// Set layout direction
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Render a flowchart, or an empty string if it cannot be built
    pub fn build_graph(&self, nodes: &[GraphNode], edges: &[GraphEdge]) -> String {
        match self.try_build_graph(nodes, edges) {
            Ok(text) => text,
            Err(e) => {
                warn!("{}", e);
                String::new()
            }
        }
    }

    /// Render a flowchart. An empty node list renders as an empty string.
    pub fn try_build_graph(
        &self,
        nodes: &[GraphNode],
        edges: &[GraphEdge],
    ) -> Result<String, ExtractError> {
        if nodes.is_empty() {
            return Ok(String::new());
        }

        let all_nodes = materialize_nodes(nodes, edges);
        if all_nodes.len() > self.max_nodes {
            return Err(ExtractError::DiagramBuild(format!(
                "{} nodes exceeds the limit of {}",
                all_nodes.len(),
                self.max_nodes
            )));
        }
        debug!(
            "Building diagram with {} nodes ({} implicit)",
            all_nodes.len(),
            all_nodes.len().saturating_sub(nodes.len())
        );

        let mut graph: DiGraph<&GraphNode, ()> = DiGraph::with_capacity(all_nodes.len(), edges.len());
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();
        for node in &all_nodes {
            index.insert(node.id.as_str(), graph.add_node(node));
        }
        for edge in edges {
            match (index.get(edge.from.as_str()), index.get(edge.to.as_str())) {
                (Some(&a), Some(&b)) => {
                    graph.update_edge(a, b, ());
                }
                _ => {
                    return Err(ExtractError::DiagramBuild(format!(
                        "edge {} -> {} has no endpoint node",
                        edge.from, edge.to
                    )))
                }
            }
        }

        self.render(&graph)
            .map_err(|e| ExtractError::DiagramBuild(e.to_string()))
    }

    fn render(&self, graph: &DiGraph<&GraphNode, ()>) -> Result<String, fmt::Error> {
        let mut out = String::new();
        writeln!(out, "graph {}", self.direction)?;

        let mut used = HashSet::new();
        let mut ids: HashMap<NodeIndex, String> = HashMap::new();
        for idx in graph.node_indices() {
            let node = graph[idx];
            let id = unique_id(&node.id, &mut used);
            writeln!(out, "    {}[\"{}\"]", id, escape_label(&node.label))?;
            ids.insert(idx, id);
        }

        for edge in graph.edge_indices() {
            let (a, b) = graph.edge_endpoints(edge).ok_or(fmt::Error)?;
            match (ids.get(&a), ids.get(&b)) {
                (Some(from), Some(to)) => writeln!(out, "    {} --> {}", from, to)?,
                _ => return Err(fmt::Error),
            }
        }

        Ok(out)
    }
}

impl Default for DiagramGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a top-down flowchart with default settings
pub fn build_graph(nodes: &[GraphNode], edges: &[GraphEdge]) -> String {
    DiagramGenerator::new().build_graph(nodes, edges)
}

/// Explicit nodes (first label wins) followed by implicit edge endpoints,
/// in first-reference order
fn materialize_nodes(nodes: &[GraphNode], edges: &[GraphEdge]) -> Vec<GraphNode> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut all = Vec::with_capacity(nodes.len());

    for node in nodes {
        if seen.insert(node.id.as_str()) {
            all.push(node.clone());
        }
    }
    for edge in edges {
        for endpoint in [edge.from.as_str(), edge.to.as_str()] {
            if seen.insert(endpoint) {
                all.push(GraphNode::implicit(endpoint));
            }
        }
    }
    all
}

/// Sanitize a string for use as a Mermaid node ID
fn sanitize_id(s: &str) -> String {
    let id: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if id.is_empty() {
        "node".to_string()
    } else if id.eq_ignore_ascii_case("end") {
        format!("{}_", id)
    } else {
        id
    }
}

/// Sanitized id, suffixed until it no longer collides
fn unique_id(s: &str, used: &mut HashSet<String>) -> String {
    let base = sanitize_id(s);
    let mut id = base.clone();
    let mut n = 1;
    while used.contains(&id) {
        id = format!("{}_{}", base, n);
        n += 1;
    }
    used.insert(id.clone());
    id
}

fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> GraphNode {
        GraphNode::new(id, id)
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(build_graph(&[], &[]), "");
        assert_eq!(build_graph(&[], &[GraphEdge::new("a", "b")]), "");
    }

    #[test]
    fn test_implicit_node_materialized() {
        let text = build_graph(&[node("A")], &[GraphEdge::new("A", "B")]);
        assert_eq!(text, "graph TD\n    A[\"A\"]\n    B[\"B\"]\n    A --> B\n");
        assert_eq!(text.matches("-->").count(), 1);
    }

    #[test]
    fn test_large_graph_renders_every_node() {
        let nodes: Vec<GraphNode> = (0..101).map(|i| node(&format!("n{}", i))).collect();
        let edges = vec![GraphEdge::new("n0", "n100")];
        let text = build_graph(&nodes, &edges);
        assert_eq!(text.lines().count(), 1 + 101 + 1);
        assert!(text.contains("    n100[\"n100\"]\n"));

        let nodes: Vec<GraphNode> = (0..60).map(|i| node(&format!("a{}", i))).collect();
        let edges: Vec<GraphEdge> = (0..60)
            .map(|i| GraphEdge::new(format!("a{}", i), format!("b{}", i)))
            .collect();
        let text = build_graph(&nodes, &edges);
        assert!(text.contains("    b59[\"b59\"]\n"));
        assert_eq!(text.matches("-->").count(), 60);
    }

    #[test]
    fn test_explicit_labels_kept() {
        let nodes = vec![GraphNode::new("app.py::main@3", "main"), GraphNode::new("app.py::main@3", "dup")];
        let text = build_graph(&nodes, &[]);
        assert!(text.contains("app_py__main_3[\"main\"]"));
        assert!(!text.contains("dup"));
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let edges = vec![GraphEdge::new("a", "b"), GraphEdge::new("a", "b"), GraphEdge::new("b", "a")];
        let text = build_graph(&[node("a")], &edges);
        assert_eq!(text.matches("a --> b").count(), 1);
        assert_eq!(text.matches("b --> a").count(), 1);
    }

    #[test]
    fn test_colliding_ids_disambiguated() {
        let text = build_graph(&[node("a.b"), node("a-b")], &[GraphEdge::new("a.b", "a-b")]);
        assert!(text.contains("    a_b[\"a.b\"]"));
        assert!(text.contains("    a_b_1[\"a-b\"]"));
        assert!(text.contains("    a_b --> a_b_1"));
    }

    #[test]
    fn test_reserved_word_and_quotes() {
        let text = build_graph(&[GraphNode::new("end", "say \"hi\"")], &[]);
        assert!(text.contains("end_[\"say #quot;hi#quot;\"]"));
    }

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("my.module"), "my_module");
        assert_eq!(sanitize_id("MyClass"), "MyClass");
        assert_eq!(sanitize_id("foo-bar"), "foo_bar");
        assert_eq!(sanitize_id(""), "node");
    }

    #[test]
    fn test_max_nodes_limit() {
        let gen = DiagramGenerator::new().with_max_nodes(2);
        let nodes = vec![node("a"), node("b")];
        let edges = vec![GraphEdge::new("a", "c")];

        assert!(matches!(
            gen.try_build_graph(&nodes, &edges),
            Err(ExtractError::DiagramBuild(_))
        ));
        assert_eq!(gen.build_graph(&nodes, &edges), "");
        assert!(gen.try_build_graph(&nodes, &[]).is_ok());
    }

    #[test]
    fn test_with_direction() {
        let gen = DiagramGenerator::new().with_direction(Direction::LeftRight);
        assert!(gen.build_graph(&[node("x")], &[]).starts_with("graph LR\n"));
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("td".parse::<Direction>().unwrap(), Direction::TopDown);
        assert_eq!("TB".parse::<Direction>().unwrap(), Direction::TopDown);
        assert_eq!("RL".parse::<Direction>().unwrap(), Direction::RightLeft);
        assert!("diagonal".parse::<Direction>().is_err());
    }
}
