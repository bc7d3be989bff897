// Grammar adapters: parsing and structural queries per language

mod go;
mod grammar;
mod javascript;
mod python;
mod rust;
mod tree;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::model::Language;

pub use go::GoAdapter;
pub use grammar::{CaptureGroup, GrammarAdapter, QueryKind, QuerySources, TreeSitterGrammar};
pub use javascript::{JavaScriptAdapter, JsVariant};
pub use python::PythonAdapter;
pub use rust::RustAdapter;
pub use tree::{Ancestors, NodeIndex, NodeRole, ParseTree, SyntaxNode};

/// Create the adapter for a language
pub fn adapter_for(language: Language) -> Result<Box<dyn GrammarAdapter>> {
    let adapter: Box<dyn GrammarAdapter> = match language {
        Language::Python => Box::new(PythonAdapter::new()?),
        Language::JavaScript => Box::new(JavaScriptAdapter::new(JsVariant::JavaScript)?),
        Language::TypeScript => Box::new(JavaScriptAdapter::new(JsVariant::TypeScript)?),
        Language::Tsx => Box::new(JavaScriptAdapter::new(JsVariant::Tsx)?),
        Language::Rust => Box::new(RustAdapter::new()?),
        Language::Go => Box::new(GoAdapter::new()?),
    };
    Ok(adapter)
}

/// Lazily created adapters, one per language.
///
/// Parsers are stateful, so each worker thread owns its own set.
#[derive(Default)]
pub struct AdapterSet {
    adapters: HashMap<Language, Box<dyn GrammarAdapter>>,
}

impl AdapterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the adapter for a language, creating it on first use
    pub fn get(&mut self, language: Language) -> Result<&mut dyn GrammarAdapter> {
        match self.adapters.entry(language) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_mut()),
            Entry::Vacant(entry) => {
                debug!("Loading {} grammar", language.display_name());
                Ok(entry.insert(adapter_for(language)?).as_mut())
            }
        }
    }
}
