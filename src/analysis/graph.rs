// Call and import graphs derived from the repository model

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use crate::error::Error;
use crate::model::{AnalysisResult, Entity, RepositoryModel};
use crate::output::{DiagramGenerator, GraphEdge, GraphNode};

/// Which relationship a diagram shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    #[default]
    Calls,
    Imports,
}

impl GraphKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::Imports => "imports",
        }
    }

    /// Section heading for rendered output
    pub fn title(&self) -> &'static str {
        match self {
            Self::Calls => "Call Graph",
            Self::Imports => "Import Graph",
        }
    }
}

impl FromStr for GraphKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calls" | "call" => Ok(Self::Calls),
            "imports" | "import" => Ok(Self::Imports),
            other => Err(Error::config_validation(format!(
                "Unknown graph kind '{}' (expected calls or imports)",
                other
            ))),
        }
    }
}

/// Diagram-ready nodes and edges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl CodeGraph {
    /// Derive the requested graph from a model
    pub fn build(model: &RepositoryModel, kind: GraphKind) -> Self {
        match kind {
            GraphKind::Calls => Self::calls(model),
            GraphKind::Imports => Self::imports(model),
        }
    }

    /// One node per entity, one edge per distinct (owner, callee) pair.
    ///
    /// Callees resolve to an entity of the same name in the caller's file;
    /// anything else stays a bare name and is drawn as an implicit node.
    pub fn calls(model: &RepositoryModel) -> Self {
        let mut graph = Self::default();
        let mut seen = HashSet::new();

        for (path, result) in model.files() {
            for entity in result.entities() {
                graph
                    .nodes
                    .push(GraphNode::new(entity_node_id(path, entity), entity.name.clone()));
            }

            let by_name = index_by_name(result);
            for call in &result.calls {
                let owner = match result.owner_of(call) {
                    Some(owner) => owner,
                    None => continue,
                };
                let from = entity_node_id(path, owner);
                let to = match resolve(&by_name, &call.callee_name) {
                    Some(target) => entity_node_id(path, target),
                    None => call.callee_name.clone(),
                };
                if seen.insert((from.clone(), to.clone())) {
                    graph.edges.push(GraphEdge::new(from, to));
                }
            }
        }

        graph
    }

    /// One node per file, one edge per distinct (file, module) pair
    pub fn imports(model: &RepositoryModel) -> Self {
        let mut graph = Self::default();
        let mut seen = HashSet::new();

        for (path, result) in model.files() {
            let id = path.display().to_string();
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| id.clone());
            graph.nodes.push(GraphNode::new(id.clone(), label));

            for import in &result.imports {
                if seen.insert((id.clone(), import.module_path.clone())) {
                    graph
                        .edges
                        .push(GraphEdge::new(id.clone(), import.module_path.clone()));
                }
            }
        }

        graph
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render as Mermaid text; empty when the graph cannot be drawn
    pub fn render(&self, generator: &DiagramGenerator) -> String {
        generator.build_graph(&self.nodes, &self.edges)
    }
}

/// Diagram id of an entity: `path::name@line`
pub fn entity_node_id(path: &Path, entity: &Entity) -> String {
    format!("{}::{}@{}", path.display(), entity.name, entity.start.line)
}

fn index_by_name(result: &AnalysisResult) -> HashMap<&str, Vec<&Entity>> {
    let mut index: HashMap<&str, Vec<&Entity>> = HashMap::new();
    for entity in result.entities() {
        index.entry(entity.name.as_str()).or_default().push(entity);
    }
    index
}

/// Unique match, else the first function of that name
fn resolve<'a>(index: &HashMap<&str, Vec<&'a Entity>>, name: &str) -> Option<&'a Entity> {
    let candidates = index.get(name)?;
    match candidates.as_slice() {
        [only] => Some(*only),
        many => many
            .iter()
            .find(|e| e.is_function())
            .or_else(|| many.first())
            .copied(),
    }
}
