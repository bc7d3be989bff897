// Arena representation of a parsed file
//
// Tree-sitter nodes borrow from their tree, so the extractor works on a flat
// copy instead: every named node gets an index, a parent index, and a role
// assigned by the grammar adapter. Nodes are stored in pre-order, which
// means a parent's index is always smaller than its children's.

use std::collections::HashMap;
use tree_sitter::Tree;

use crate::model::Location;

/// Index of a node in a [`ParseTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Language-neutral classification of a syntax node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Introduces a callable scope (named or anonymous)
    Function,
    /// Introduces a class, struct, interface or similar
    TypeDefinition,
    /// A statement consisting of a single expression
    ExpressionStatement,
    StringLiteral,
    Comment,
    Other,
}

impl NodeRole {
    pub fn is_definition(&self) -> bool {
        matches!(self, NodeRole::Function | NodeRole::TypeDefinition)
    }
}

/// One named node of the syntax tree
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: &'static str,
    pub role: NodeRole,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start: Location,
    pub end: Location,
    pub parent: Option<NodeIndex>,
    /// Named children in source order
    pub children: Vec<NodeIndex>,
}

/// A parsed file: source text, tree-sitter tree and the node arena
pub struct ParseTree {
    source: String,
    tree: Tree,
    nodes: Vec<SyntaxNode>,
    by_tree_id: HashMap<usize, NodeIndex>,
    first_error: Option<Location>,
}

impl ParseTree {
    /// Flatten a tree-sitter tree, classifying node kinds with `classify`
    pub(crate) fn build(source: &str, tree: Tree, classify: fn(&str) -> NodeRole) -> Self {
        let mut nodes: Vec<SyntaxNode> = Vec::new();
        let mut by_tree_id = HashMap::new();
        let mut first_error = None;

        // Arena index of the named node at each cursor depth (None for anonymous nodes)
        let mut stack: Vec<Option<NodeIndex>> = Vec::new();
        let mut cursor = tree.walk();

        'walk: loop {
            let node = cursor.node();

            if first_error.is_none() && (node.is_error() || node.is_missing()) {
                first_error = Some(Location::from(node.start_position()));
            }

            let index = if node.is_named() {
                let index = NodeIndex(nodes.len() as u32);
                let parent = stack.iter().rev().find_map(|i| *i);
                if let Some(p) = parent {
                    nodes[p.as_usize()].children.push(index);
                }
                nodes.push(SyntaxNode {
                    kind: node.kind(),
                    role: classify(node.kind()),
                    start_byte: node.start_byte(),
                    end_byte: node.end_byte(),
                    start: Location::from(node.start_position()),
                    end: Location::from(node.end_position()),
                    parent,
                    children: Vec::new(),
                });
                by_tree_id.insert(node.id(), index);
                Some(index)
            } else {
                None
            };

            if cursor.goto_first_child() {
                stack.push(index);
                continue;
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    break 'walk;
                }
                stack.pop();
            }
        }
        // The cursor borrows `tree`, which moves into the arena below
        drop(cursor);

        if first_error.is_none() && tree.root_node().has_error() {
            first_error = Some(Location::from(tree.root_node().start_position()));
        }

        Self {
            source: source.to_string(),
            tree,
            nodes,
            by_tree_id,
            first_error,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Arena index of a tree-sitter node, if it is a named node of this tree
    pub(crate) fn index_of(&self, node: &tree_sitter::Node) -> Option<NodeIndex> {
        self.by_tree_id.get(&node.id()).copied()
    }

    /// Position of the first ERROR or MISSING node
    pub fn first_error(&self) -> Option<Location> {
        self.first_error
    }

    pub fn root(&self) -> NodeIndex {
        NodeIndex(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&SyntaxNode> {
        self.nodes.get(index.as_usize())
    }

    /// Source text covered by a node
    pub fn text(&self, index: NodeIndex) -> &str {
        self.node(index)
            .and_then(|n| self.source.get(n.start_byte..n.end_byte))
            .unwrap_or("")
    }

    pub fn role(&self, index: NodeIndex) -> NodeRole {
        self.node(index).map(|n| n.role).unwrap_or(NodeRole::Other)
    }

    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.node(index).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Strict ancestors of a node, innermost first
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(index).and_then(|n| n.parent),
            remaining: self.nodes.len(),
        }
    }
}

impl std::fmt::Debug for ParseTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseTree")
            .field("nodes", &self.nodes.len())
            .field("first_error", &self.first_error)
            .finish()
    }
}

/// Upward walk over the parent index
pub struct Ancestors<'a> {
    tree: &'a ParseTree,
    next: Option<NodeIndex>,
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = self.tree.node(current).and_then(|n| n.parent);
        Some(current)
    }
}
