// JavaScript/TypeScript grammar adapter using tree-sitter

use crate::error::{ExtractError, Result};
use crate::model::Language;
use crate::parser::grammar::{CaptureGroup, GrammarAdapter, QueryKind, QuerySources, TreeSitterGrammar};
use crate::parser::tree::{NodeRole, ParseTree};

const FUNCTIONS: &str = r#"
    (function_declaration
        name: (identifier) @name
        parameters: (formal_parameters) @params
        body: (statement_block) @body) @definition
    (generator_function_declaration
        name: (identifier) @name
        parameters: (formal_parameters) @params
        body: (statement_block) @body) @definition
    (method_definition
        name: (_) @name
        parameters: (formal_parameters) @params
        body: (statement_block) @body) @definition
    (variable_declarator
        name: (identifier) @name
        value: (arrow_function
            parameters: (formal_parameters) @params
            body: (_) @body) @definition)
    (variable_declarator
        name: (identifier) @name
        value: (arrow_function body: (_) @body) @definition)
    (variable_declarator
        name: (identifier) @name
        value: (_
            parameters: (formal_parameters) @params
            body: (statement_block) @body) @definition)
    (pair
        key: (property_identifier) @name
        value: (_
            parameters: (formal_parameters) @params
            body: (statement_block) @body) @definition)
"#;

const CALLS: &str = r#"
    (call_expression function: (identifier) @callee) @call
    (call_expression function: (member_expression property: (_) @callee)) @call
"#;

const IMPORTS: &str = r#"
    (import_statement source: (string) @module) @import
    (import_statement
        (import_clause (identifier) @name)
        source: (string) @module) @import
    (import_statement
        (import_clause (named_imports (import_specifier name: (_) @name)))
        source: (string) @module) @import
    (import_statement
        (import_clause (namespace_import (identifier) @name))
        source: (string) @module) @import
"#;

const JS_QUERIES: QuerySources = QuerySources {
    functions: FUNCTIONS,
    classes: r#"
        (class_declaration name: (_) @name body: (class_body) @body) @definition
    "#,
    calls: CALLS,
    imports: IMPORTS,
};

const TS_QUERIES: QuerySources = QuerySources {
    functions: FUNCTIONS,
    classes: r#"
        (class_declaration name: (_) @name body: (class_body) @body) @definition
        (abstract_class_declaration name: (_) @name body: (class_body) @body) @definition
        (interface_declaration name: (_) @name body: (_) @body) @definition
        (type_alias_declaration name: (_) @name) @definition
    "#,
    calls: CALLS,
    imports: IMPORTS,
};

/// Supported JavaScript dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsVariant {
    JavaScript,
    TypeScript,
    Tsx,
}

impl JsVariant {
    /// Check if this is a TypeScript variant
    pub fn is_typescript(&self) -> bool {
        matches!(self, Self::TypeScript | Self::Tsx)
    }

    fn language(&self) -> Language {
        match self {
            Self::JavaScript => Language::JavaScript,
            Self::TypeScript => Language::TypeScript,
            Self::Tsx => Language::Tsx,
        }
    }

    fn grammar(&self) -> tree_sitter::Language {
        match self {
            Self::JavaScript => tree_sitter_javascript::language(),
            Self::TypeScript => tree_sitter_typescript::language_typescript(),
            Self::Tsx => tree_sitter_typescript::language_tsx(),
        }
    }
}

fn classify(kind: &str) -> NodeRole {
    match kind {
        "function_declaration"
        | "generator_function_declaration"
        | "function"
        | "function_expression"
        | "generator_function"
        | "arrow_function"
        | "method_definition" => NodeRole::Function,
        "class_declaration"
        | "class"
        | "abstract_class_declaration"
        | "interface_declaration"
        | "type_alias_declaration" => NodeRole::TypeDefinition,
        "expression_statement" => NodeRole::ExpressionStatement,
        "string" | "template_string" => NodeRole::StringLiteral,
        "comment" => NodeRole::Comment,
        _ => NodeRole::Other,
    }
}

/// Adapter for JavaScript, TypeScript and TSX source files
pub struct JavaScriptAdapter {
    variant: JsVariant,
    grammar: TreeSitterGrammar,
}

impl JavaScriptAdapter {
    /// Create a new adapter for the given dialect
    pub fn new(variant: JsVariant) -> Result<Self> {
        let queries = if variant.is_typescript() {
            &TS_QUERIES
        } else {
            &JS_QUERIES
        };
        let grammar = TreeSitterGrammar::new(variant.language(), variant.grammar(), queries, classify)?;
        Ok(Self { variant, grammar })
    }

    pub fn variant(&self) -> JsVariant {
        self.variant
    }
}

impl GrammarAdapter for JavaScriptAdapter {
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
