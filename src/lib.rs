//! Codeatlas - Structural maps of multi-language codebases
//!
//! Parses Python, JavaScript, TypeScript, Rust and Go sources with
//! tree-sitter, extracts functions, types, call sites and imports into a
//! repository model, and renders that model as JSON, Markdown and Mermaid
//! diagrams.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod output;
pub mod parser;

// Re-export main types
pub use analysis::{Analyzer, CodeGraph, FileCounts, GraphKind};
pub use config::Config;
pub use error::{Error, ExtractError, Result};
pub use extract::EntityExtractor;
pub use model::{
    AnalysisResult, CallSite, Entity, EntityId, EntityKind, ImportRecord, Language, Location,
    RepositoryModel, SourceFile,
};
pub use output::{
    build_graph, DiagramGenerator, DiagramSection, Direction, GraphEdge, GraphNode,
    MarkdownGenerator,
};
pub use parser::{adapter_for, AdapterSet, GrammarAdapter, QueryKind};
