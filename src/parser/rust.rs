// Rust grammar adapter using tree-sitter

use crate::error::{ExtractError, Result};
use crate::model::Language;
use crate::parser::grammar::{CaptureGroup, GrammarAdapter, QueryKind, QuerySources, TreeSitterGrammar};
use crate::parser::tree::{NodeRole, ParseTree};

const QUERIES: QuerySources = QuerySources {
    functions: r#"
        (function_item
            name: (identifier) @name
            parameters: (parameters) @params
            body: (block) @body) @definition
    "#,
    classes: r#"
        (struct_item name: (type_identifier) @name) @definition
        (enum_item name: (type_identifier) @name body: (enum_variant_list) @body) @definition
        (trait_item name: (type_identifier) @name body: (declaration_list) @body) @definition
        (union_item name: (type_identifier) @name) @definition
        (type_item name: (type_identifier) @name) @definition
    "#,
    calls: r#"
        (call_expression function: (identifier) @callee) @call
        (call_expression function: (scoped_identifier name: (identifier) @callee)) @call
        (call_expression function: (field_expression field: (field_identifier) @callee)) @call
    "#,
    imports: r#"
        (use_declaration argument: (identifier) @module) @import
        (use_declaration
            argument: (scoped_identifier
                path: (_) @module
                name: (identifier) @name)) @import
        (use_declaration argument: (scoped_use_list path: (_) @module)) @import
        (use_declaration
            argument: (scoped_use_list
                path: (_) @module
                list: (use_list (_) @name))) @import
        (use_declaration argument: (use_as_clause path: (_) @module)) @import
        (use_declaration argument: (use_wildcard (_) @module)) @import
    "#,
};

fn classify(kind: &str) -> NodeRole {
    match kind {
        "function_item" | "closure_expression" => NodeRole::Function,
        "struct_item" | "enum_item" | "trait_item" | "union_item" | "type_item" => {
            NodeRole::TypeDefinition
        }
        "expression_statement" => NodeRole::ExpressionStatement,
        "string_literal" | "raw_string_literal" => NodeRole::StringLiteral,
        "line_comment" | "block_comment" => NodeRole::Comment,
        _ => NodeRole::Other,
    }
}

/// Adapter for Rust source files
pub struct RustAdapter {
    grammar: TreeSitterGrammar,
}

impl RustAdapter {
    /// Create a new Rust adapter
    pub fn new() -> Result<Self> {
        let grammar =
            TreeSitterGrammar::new(Language::Rust, tree_sitter_rust::language(), &QUERIES, classify)?;
        Ok(Self { grammar })
    }
}

impl GrammarAdapter for RustAdapter {
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
