// Go grammar adapter using tree-sitter

use crate::error::{ExtractError, Result};
use crate::model::Language;
use crate::parser::grammar::{CaptureGroup, GrammarAdapter, QueryKind, QuerySources, TreeSitterGrammar};
use crate::parser::tree::{NodeRole, ParseTree};

const QUERIES: QuerySources = QuerySources {
    functions: r#"
        (function_declaration
            name: (identifier) @name
            parameters: (parameter_list) @params
            body: (block) @body) @definition
        (method_declaration
            name: (field_identifier) @name
            parameters: (parameter_list) @params
            body: (block) @body) @definition
    "#,
    classes: r#"
        (type_spec name: (type_identifier) @name type: (_) @body) @definition
    "#,
    calls: r#"
        (call_expression function: (identifier) @callee) @call
        (call_expression function: (selector_expression field: (field_identifier) @callee)) @call
    "#,
    imports: r#"
        (import_spec path: (_) @module) @import
    "#,
};

fn classify(kind: &str) -> NodeRole {
    match kind {
        "function_declaration" | "method_declaration" | "func_literal" => NodeRole::Function,
        "type_spec" => NodeRole::TypeDefinition,
        "expression_statement" => NodeRole::ExpressionStatement,
        "interpreted_string_literal" | "raw_string_literal" => NodeRole::StringLiteral,
        "comment" => NodeRole::Comment,
        _ => NodeRole::Other,
    }
}

/// Adapter for Go source files
pub struct GoAdapter {
    grammar: TreeSitterGrammar,
}

impl GoAdapter {
    /// Create a new Go adapter
    pub fn new() -> Result<Self> {
        let grammar =
            TreeSitterGrammar::new(Language::Go, tree_sitter_go::language(), &QUERIES, classify)?;
        Ok(Self { grammar })
    }
}

impl GrammarAdapter for GoAdapter {
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

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"package main

import (
    "fmt"
    str "strings"
)

type Rect struct {
    W, H int
}

type Shape interface {
    Area() int
}

func (r Rect) Area() int {
    return r.W * r.H
}

func main() {
    fmt.Println(str.ToUpper("x"), describe())
}
"#;

    fn run(kind: QueryKind) -> (ParseTree, Vec<CaptureGroup>) {
        let mut adapter = GoAdapter::new().unwrap();
        let tree = adapter.parse(SOURCE).unwrap();
        let groups = adapter.query(&tree, kind);
        (tree, groups)
    }

    #[test]
    fn test_adapter_new() {
        let adapter = GoAdapter::new().unwrap();
        assert_eq!(adapter.language(), Language::Go);
    }

    #[test]
    fn test_functions_and_methods() {
        let (tree, groups) = run(QueryKind::Functions);
        let names: Vec<_> = groups
            .iter()
            .filter_map(|g| match g {
                CaptureGroup::Definition { name: Some(n), .. } => Some(tree.text(*n)),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["Area", "main"]);
    }

    #[test]
    fn test_type_specs() {
        let (tree, groups) = run(QueryKind::Classes);
        let names: Vec<_> = groups
            .iter()
            .filter_map(|g| match g {
                CaptureGroup::Definition { name: Some(n), .. } => Some(tree.text(*n)),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["Rect", "Shape"]);
    }

    #[test]
    fn test_calls() {
        let (tree, groups) = run(QueryKind::Calls);
        let callees: Vec<_> = groups
            .iter()
            .filter_map(|g| match g {
                CaptureGroup::Call { callee: Some(c), .. } => Some(tree.text(*c)),
                _ => None,
            })
            .collect();
        assert_eq!(callees, vec!["Println", "ToUpper", "describe"]);
    }

    #[test]
    fn test_import_specs() {
        let (tree, groups) = run(QueryKind::Imports);
        let paths: Vec<_> = groups
            .iter()
            .filter_map(|g| match g {
                CaptureGroup::Import { modules, .. } => modules.first().map(|m| tree.text(*m)),
                _ => None,
            })
            .collect();
        assert_eq!(paths, vec!["\"fmt\"", "\"strings\""]);
    }
}
