// Python grammar adapter using tree-sitter

use crate::error::{ExtractError, Result};
use crate::model::Language;
use crate::parser::grammar::{CaptureGroup, GrammarAdapter, QueryKind, QuerySources, TreeSitterGrammar};
use crate::parser::tree::{NodeRole, ParseTree};

const QUERIES: QuerySources = QuerySources {
    functions: r#"
        (function_definition
            name: (identifier) @name
            parameters: (parameters) @params
            body: (block) @body) @definition
    "#,
    classes: r#"
        (class_definition
            name: (identifier) @name
            body: (block) @body) @definition
    "#,
    calls: r#"
        (call function: (identifier) @callee) @call
        (call function: (attribute attribute: (identifier) @callee)) @call
    "#,
    imports: r#"
        (import_statement name: (dotted_name) @module) @import
        (import_statement name: (aliased_import name: (dotted_name) @module)) @import
        (import_from_statement module_name: (_) @module) @import
        (import_from_statement
            module_name: (_) @module
            name: (dotted_name) @name) @import
        (import_from_statement
            module_name: (_) @module
            name: (aliased_import name: (dotted_name) @name)) @import
    "#,
};

fn classify(kind: &str) -> NodeRole {
    match kind {
        "function_definition" | "lambda" => NodeRole::Function,
        "class_definition" => NodeRole::TypeDefinition,
        "expression_statement" => NodeRole::ExpressionStatement,
        "string" => NodeRole::StringLiteral,
        "comment" => NodeRole::Comment,
        _ => NodeRole::Other,
    }
}

/// Adapter for Python source files
pub struct PythonAdapter {
    grammar: TreeSitterGrammar,
}

impl PythonAdapter {
    /// Create a new Python adapter
    pub fn new() -> Result<Self> {
        let grammar = TreeSitterGrammar::new(
            Language::Python,
            tree_sitter_python::language(),
            &QUERIES,
            classify,
        )?;
        Ok(Self { grammar })
    }
}

impl GrammarAdapter for PythonAdapter {
    fn language(&self) -> Language {
        self.grammar.language()
    }

    fn parse(&mut self, text: &str) -> std::result::Result<ParseTree, ExtractError> {
        self.grammar.parse(text)
    }

    fn query(&self, tree: &ParseTree, kind: QueryKind) -> Vec<CaptureGroup> {
        self.grammar.query(tree, kind)
    }
}
