// Entity extraction: turns one file's capture groups into an AnalysisResult

mod docstring;

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{ExtractError, Result};
use crate::model::{AnalysisResult, CallSite, Entity, EntityId, EntityKind, ImportRecord, Language};
use crate::parser::{adapter_for, CaptureGroup, GrammarAdapter, NodeIndex, NodeRole, ParseTree, QueryKind};

pub use docstring::{leading_docstring, strip_quotes};

/// Extracts entities, call sites and imports from source text
pub struct EntityExtractor {
    adapter: Box<dyn GrammarAdapter>,
}

impl EntityExtractor {
    /// Create an extractor over an adapter
    pub fn new(adapter: Box<dyn GrammarAdapter>) -> Self {
        Self { adapter }
    }

    /// Create an extractor with the built-in adapter for a language
    pub fn for_language(language: Language) -> Result<Self> {
        Ok(Self::new(adapter_for(language)?))
    }

    pub fn language(&self) -> Language {
        self.adapter.language()
    }

    /// Analyze source text; a file that fails to parse yields an empty result
    pub fn analyze(&mut self, text: &str) -> AnalysisResult {
        analyze_with(self.adapter.as_mut(), text)
    }

    /// Analyze source text, reporting a syntax error instead of degrading
    pub fn try_analyze(&mut self, text: &str) -> std::result::Result<AnalysisResult, ExtractError> {
        try_analyze_with(self.adapter.as_mut(), text)
    }
}

/// Analyze with a borrowed adapter, degrading to an empty result on failure
pub fn analyze_with(adapter: &mut dyn GrammarAdapter, text: &str) -> AnalysisResult {
    let language = adapter.language();
    match try_analyze_with(adapter, text) {
        Ok(result) => result,
        Err(e) => {
            warn!("Skipping {} source: {}", language.display_name(), e);
            AnalysisResult::empty(language)
        }
    }
}

/// Analyze with a borrowed adapter
pub fn try_analyze_with(
    adapter: &mut dyn GrammarAdapter,
    text: &str,
) -> std::result::Result<AnalysisResult, ExtractError> {
    let tree = adapter.parse(text)?;
    let adapter: &dyn GrammarAdapter = adapter;

    let mut result = AnalysisResult::empty(adapter.language());
    result.functions = definitions(adapter, &tree, QueryKind::Functions);
    result.types = definitions(adapter, &tree, QueryKind::Classes);

    let owners: HashMap<NodeIndex, &Entity> = result
        .entities()
        .map(|e| (NodeIndex(e.id.0), e))
        .collect();
    let calls = call_sites(adapter, &tree, &owners);
    let imports = import_records(adapter, &tree);

    result.calls = calls;
    result.imports = imports;
    Ok(result)
}

/// Log and drop a match whose required capture is missing
fn incomplete(kind: QueryKind, tree: &ParseTree, node: NodeIndex) {
    let line = tree.node(node).map(|n| n.start.line).unwrap_or(0);
    debug!(
        "{}",
        ExtractError::IncompleteMatch {
            query: kind.name(),
            line
        }
    );
}

/// Non-empty text of an optional capture
fn capture_text(tree: &ParseTree, index: Option<NodeIndex>) -> Option<&str> {
    index.map(|i| tree.text(i)).filter(|t| !t.is_empty())
}

fn definitions(adapter: &dyn GrammarAdapter, tree: &ParseTree, kind: QueryKind) -> Vec<Entity> {
    let entity_kind = match kind {
        QueryKind::Functions => EntityKind::Function,
        _ => EntityKind::TypeDefinition,
    };

    let mut entities = Vec::new();
    for group in adapter.query(tree, kind) {
        let (node, name, params, body) = match group {
            CaptureGroup::Definition {
                node,
                name,
                params,
                body,
            } => (node, name, params, body),
            _ => continue,
        };

        let name = match capture_text(tree, name) {
            Some(name) => name,
            None => {
                incomplete(kind, tree, node);
                continue;
            }
        };
        let syntax = match tree.node(node) {
            Some(syntax) => syntax,
            None => continue,
        };

        let signature = match entity_kind {
            EntityKind::Function => {
                format!("{}{}", name, params.map(|p| tree.text(p)).unwrap_or(""))
            }
            EntityKind::TypeDefinition => String::new(),
        };

        entities.push(Entity {
            id: EntityId(node.0),
            kind: entity_kind,
            name: name.to_string(),
            signature,
            docstring: body
                .and_then(|b| leading_docstring(tree, b))
                .unwrap_or_default(),
            body_text: tree.text(node).to_string(),
            start: syntax.start,
            end: syntax.end,
        });
    }
    entities
}

/// Innermost enclosing definition that produced an entity.
///
/// Anonymous scopes (lambdas, closures, function expressions) are walked past.
fn owner<'a>(
    tree: &ParseTree,
    call: NodeIndex,
    owners: &HashMap<NodeIndex, &'a Entity>,
) -> Option<&'a Entity> {
    tree.ancestors(call)
        .filter(|a| tree.role(*a).is_definition())
        .find_map(|a| owners.get(&a).copied())
}

fn call_sites(
    adapter: &dyn GrammarAdapter,
    tree: &ParseTree,
    owners: &HashMap<NodeIndex, &Entity>,
) -> Vec<CallSite> {
    let mut calls = Vec::new();
    for group in adapter.query(tree, QueryKind::Calls) {
        let (node, callee) = match group {
            CaptureGroup::Call { node, callee } => (node, callee),
            _ => continue,
        };

        let callee_name = match capture_text(tree, callee) {
            Some(name) => name,
            None => {
                incomplete(QueryKind::Calls, tree, node);
                continue;
            }
        };
        let location = match tree.node(node) {
            Some(syntax) => syntax.start,
            None => continue,
        };

        let owner = owner(tree, node, owners);
        calls.push(CallSite {
            callee_name: callee_name.to_string(),
            location,
            owner: owner.map(|e| e.id),
            owner_name: owner.map(|e| e.name.clone()),
        });
    }
    calls
}

fn import_records(adapter: &dyn GrammarAdapter, tree: &ParseTree) -> Vec<ImportRecord> {
    let mut records = Vec::new();
    for group in adapter.query(tree, QueryKind::Imports) {
        let (node, modules, names) = match group {
            CaptureGroup::Import {
                node,
                modules,
                names,
            } => (node, modules, names),
            _ => continue,
        };

        let location = match tree.node(node) {
            Some(syntax) => syntax.start,
            None => continue,
        };
        let modules: Vec<&str> = modules
            .iter()
            .map(|m| tree.text(*m))
            .map(|t| if docstring::is_quoted(t) { strip_quotes(t) } else { t })
            .filter(|t| !t.is_empty())
            .collect();
        if modules.is_empty() {
            incomplete(QueryKind::Imports, tree, node);
            continue;
        }

        for module in modules {
            if names.is_empty() {
                records.push(ImportRecord::module(module, location));
            }
            let names = names
                .iter()
                .filter(|n| tree.role(**n) != NodeRole::Comment)
                .map(|n| tree.text(*n))
                .filter(|n| !n.is_empty());
            for name in names {
                records.push(ImportRecord::from_import(module, name, location));
            }
        }
    }
    records
}
