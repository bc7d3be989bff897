// Query-driven grammar engine shared by all language adapters

use std::collections::BTreeMap;
use tracing::{debug, warn};
use tree_sitter::{Parser, Query, QueryCursor};

use crate::error::{ExtractError, Result};
use crate::model::{Language, Location};
use crate::parser::tree::{NodeIndex, NodeRole, ParseTree};

/// The four structural queries every grammar provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Functions,
    Classes,
    Calls,
    Imports,
}

impl QueryKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Functions => "function",
            Self::Classes => "class",
            Self::Calls => "call",
            Self::Imports => "import",
        }
    }

    /// Capture name that anchors a match of this query
    fn anchor(&self) -> &'static str {
        match self {
            Self::Functions | Self::Classes => "definition",
            Self::Calls => "call",
            Self::Imports => "import",
        }
    }
}

/// Captures of one query, correlated by their anchor node.
///
/// Several pattern matches can share an anchor (e.g. one per imported name);
/// they are merged into a single group. Any capture other than the anchor
/// may be absent when the grammar allows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureGroup {
    Definition {
        node: NodeIndex,
        name: Option<NodeIndex>,
        params: Option<NodeIndex>,
        body: Option<NodeIndex>,
    },
    Call {
        node: NodeIndex,
        callee: Option<NodeIndex>,
    },
    Import {
        node: NodeIndex,
        modules: Vec<NodeIndex>,
        names: Vec<NodeIndex>,
    },
}

impl CaptureGroup {
    fn new(kind: QueryKind, node: NodeIndex) -> Self {
        match kind {
            QueryKind::Functions | QueryKind::Classes => Self::Definition {
                node,
                name: None,
                params: None,
                body: None,
            },
            QueryKind::Calls => Self::Call { node, callee: None },
            QueryKind::Imports => Self::Import {
                node,
                modules: Vec::new(),
                names: Vec::new(),
            },
        }
    }

    /// The anchor node
    pub fn node(&self) -> NodeIndex {
        match self {
            Self::Definition { node, .. } | Self::Call { node, .. } | Self::Import { node, .. } => {
                *node
            }
        }
    }

    fn set(&mut self, capture: &str, index: NodeIndex) {
        match (self, capture) {
            (Self::Definition { name, .. }, "name") => {
                name.get_or_insert(index);
            }
            (Self::Definition { params, .. }, "params") => {
                params.get_or_insert(index);
            }
            (Self::Definition { body, .. }, "body") => {
                body.get_or_insert(index);
            }
            (Self::Call { callee, .. }, "callee") => {
                callee.get_or_insert(index);
            }
            (Self::Import { modules, .. }, "module") => {
                if !modules.contains(&index) {
                    modules.push(index);
                }
            }
            (Self::Import { names, .. }, "name") => {
                if !names.contains(&index) {
                    names.push(index);
                }
            }
            (_, other) => debug!("Ignoring unexpected capture @{}", other),
        }
    }

    /// Put multi-valued captures in document order
    fn sort(&mut self) {
        if let Self::Import { modules, names, .. } = self {
            modules.sort();
            names.sort();
        }
    }
}

/// Capability interface every language adapter provides
pub trait GrammarAdapter: Send {
    fn language(&self) -> Language;

    /// Parse source text. Fails with [`ExtractError::Syntax`] if the tree
    /// contains error or missing nodes.
    fn parse(&mut self, text: &str) -> std::result::Result<ParseTree, ExtractError>;

    /// Run one structural query, returning groups in document order
    fn query(&self, tree: &ParseTree, kind: QueryKind) -> Vec<CaptureGroup>;
}

/// Query source text for one grammar
pub struct QuerySources {
    pub functions: &'static str,
    pub classes: &'static str,
    pub calls: &'static str,
    pub imports: &'static str,
}

/// Parser, compiled queries and node classifier for one tree-sitter grammar
pub struct TreeSitterGrammar {
    language: Language,
    parser: Parser,
    functions: Query,
    classes: Query,
    calls: Query,
    imports: Query,
    classify: fn(&str) -> NodeRole,
}

impl TreeSitterGrammar {
    /// Load a grammar and compile its queries
    pub fn new(
        language: Language,
        grammar: tree_sitter::Language,
        sources: &QuerySources,
        classify: fn(&str) -> NodeRole,
    ) -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&grammar)?;

        Ok(Self {
            language,
            parser,
            functions: Query::new(&grammar, sources.functions)?,
            classes: Query::new(&grammar, sources.classes)?,
            calls: Query::new(&grammar, sources.calls)?,
            imports: Query::new(&grammar, sources.imports)?,
            classify,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn parse(&mut self, text: &str) -> std::result::Result<ParseTree, ExtractError> {
        let tree = match self.parser.parse(text, None) {
            Some(tree) => tree,
            None => {
                warn!("{} parser produced no tree", self.language.display_name());
                return Err(ExtractError::Syntax { line: 1, column: 0 });
            }
        };

        let tree = ParseTree::build(text, tree, self.classify);
        match tree.first_error() {
            Some(Location { line, column }) => Err(ExtractError::Syntax { line, column }),
            None => Ok(tree),
        }
    }

    fn compiled(&self, kind: QueryKind) -> &Query {
        match kind {
            QueryKind::Functions => &self.functions,
            QueryKind::Classes => &self.classes,
            QueryKind::Calls => &self.calls,
            QueryKind::Imports => &self.imports,
        }
    }

    pub fn query(&self, tree: &ParseTree, kind: QueryKind) -> Vec<CaptureGroup> {
        let query = self.compiled(kind);
        let names = query.capture_names();
        let anchor_name = kind.anchor();

        let mut groups: BTreeMap<NodeIndex, CaptureGroup> = BTreeMap::new();
        let mut cursor = QueryCursor::new();

        for m in cursor.matches(query, tree.tree().root_node(), tree.source().as_bytes()) {
            let mut anchor = None;
            let mut fields = Vec::new();

            for capture in m.captures {
                let index = match tree.index_of(&capture.node) {
                    Some(index) => index,
                    None => continue,
                };
                let name = names.get(capture.index as usize).copied().unwrap_or("");
                if name == anchor_name {
                    anchor = Some(index);
                } else {
                    fields.push((name, index));
                }
            }

            let anchor = match anchor {
                Some(anchor) => anchor,
                None => {
                    debug!("{} match without @{} capture", kind.name(), anchor_name);
                    continue;
                }
            };

            let group = groups
                .entry(anchor)
                .or_insert_with(|| CaptureGroup::new(kind, anchor));
            for (name, index) in fields {
                group.set(name, index);
            }
        }

        groups
            .into_values()
            .map(|mut group| {
                group.sort();
                group
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCES: QuerySources = QuerySources {
        functions: "(function_definition name: (identifier) @name parameters: (parameters) @params body: (block) @body) @definition",
        classes: "(class_definition name: (identifier) @name body: (block) @body) @definition",
        calls: "(call function: (identifier) @callee) @call",
        imports: "(import_statement name: (dotted_name) @module) @import",
    };

    fn classify(kind: &str) -> NodeRole {
        match kind {
            "function_definition" => NodeRole::Function,
            _ => NodeRole::Other,
        }
    }

    fn grammar() -> TreeSitterGrammar {
        TreeSitterGrammar::new(
            Language::Python,
            tree_sitter_python::language(),
            &SOURCES,
            classify,
        )
        .unwrap()
    }

    #[test]
    fn test_grammar_new() {
        assert_eq!(grammar().language(), Language::Python);
    }

    #[test]
    fn test_bad_query_is_rejected() {
        let sources = QuerySources {
            functions: "(no_such_node) @definition",
            ..SOURCES
        };
        let result = TreeSitterGrammar::new(
            Language::Python,
            tree_sitter_python::language(),
            &sources,
            classify,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_syntax_error_location() {
        let mut grammar = grammar();
        let err = grammar.parse("x = 1\ndef f(:\n").unwrap_err();
        match err {
            ExtractError::Syntax { line, .. } => assert!(line >= 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_groups_in_document_order() {
        let mut grammar = grammar();
        let tree = grammar.parse("def b():\n    pass\n\ndef a():\n    pass\n").unwrap();
        let groups = grammar.query(&tree, QueryKind::Functions);
        assert_eq!(groups.len(), 2);

        let names: Vec<_> = groups
            .iter()
            .map(|g| match g {
                CaptureGroup::Definition { name: Some(n), .. } => tree.text(*n).to_string(),
                other => panic!("unexpected group: {other:?}"),
            })
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_multiple_matches_merge_by_anchor() {
        let mut grammar = grammar();
        let tree = grammar.parse("import os, sys\n").unwrap();
        let groups = grammar.query(&tree, QueryKind::Imports);
        assert_eq!(groups.len(), 1);
        match &groups[0] {
            CaptureGroup::Import { modules, names, .. } => {
                let modules: Vec<_> = modules.iter().map(|m| tree.text(*m)).collect();
                assert_eq!(modules, vec!["os", "sys"]);
                assert!(names.is_empty());
            }
            other => panic!("unexpected group: {other:?}"),
        }
    }
}
