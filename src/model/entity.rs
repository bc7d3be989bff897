// Language-agnostic records produced by the entity extractor
//
// Every grammar adapter's output is normalized into these types. They are
// serializable so a repository model can be written out as JSON.

use serde::{Deserialize, Serialize};

use super::Language;

/// A position in a source file (1-based line, 0-based byte column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl From<tree_sitter::Point> for Location {
    fn from(point: tree_sitter::Point) -> Self {
        Self {
            line: point.row + 1,
            column: point.column,
        }
    }
}

/// Kind of structural entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Function,
    TypeDefinition,
}

/// Identity of an entity within one file.
///
/// Derived from the arena index of the defining syntax node, so two
/// definitions that share a name still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// A function or type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    /// Name followed by the parameter list, verbatim. Empty for types.
    pub signature: String,
    /// Leading string-literal statement of the body, without quotes
    pub docstring: String,
    /// Verbatim source of the whole definition, header included
    pub body_text: String,
    pub start: Location,
    pub end: Location,
}

impl Entity {
    pub fn is_function(&self) -> bool {
        self.kind == EntityKind::Function
    }

    pub fn has_docstring(&self) -> bool {
        !self.docstring.is_empty()
    }
}

/// A call expression and the definition it appears in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Text of the invoked identifier; not a resolved target
    pub callee_name: String,
    pub location: Location,
    /// Innermost enclosing named entity; `None` at module top level
    pub owner: Option<EntityId>,
    pub owner_name: Option<String>,
}

impl CallSite {
    pub fn is_top_level(&self) -> bool {
        self.owner.is_none()
    }
}

/// An import statement, one record per imported name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub module_path: String,
    /// Present for from-style imports
    pub imported_name: Option<String>,
    pub location: Location,
}

impl ImportRecord {
    /// Create an `import x` style record
    pub fn module(module_path: &str, location: Location) -> Self {
        Self {
            module_path: module_path.to_string(),
            imported_name: None,
            location,
        }
    }

    /// Create a `from x import y` style record
    pub fn from_import(module_path: &str, name: &str, location: Location) -> Self {
        Self {
            module_path: module_path.to_string(),
            imported_name: Some(name.to_string()),
            location,
        }
    }
}

/// Everything extracted from one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub language: Language,
    pub functions: Vec<Entity>,
    pub types: Vec<Entity>,
    pub calls: Vec<CallSite>,
    pub imports: Vec<ImportRecord>,
}

impl AnalysisResult {
    /// Create an empty result
    pub fn empty(language: Language) -> Self {
        Self {
            language,
            functions: Vec::new(),
            types: Vec::new(),
            calls: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Check if nothing was extracted
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.types.is_empty()
            && self.calls.is_empty()
            && self.imports.is_empty()
    }

    /// All entities, functions first
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.functions.iter().chain(self.types.iter())
    }

    /// Look up an entity by id
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities().find(|e| e.id == id)
    }

    /// The entity a call site belongs to
    pub fn owner_of(&self, call: &CallSite) -> Option<&Entity> {
        call.owner.and_then(|id| self.entity(id))
    }

    /// Calls made from inside the given entity (not from nested definitions)
    pub fn calls_from(&self, id: EntityId) -> impl Iterator<Item = &CallSite> {
        self.calls.iter().filter(move |c| c.owner == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: u32, kind: EntityKind, name: &str) -> Entity {
        Entity {
            id: EntityId(id),
            kind,
            name: name.to_string(),
            signature: String::new(),
            docstring: String::new(),
            body_text: String::new(),
            start: Location::new(1, 0),
            end: Location::new(2, 0),
        }
    }

    #[test]
    fn test_location_from_point() {
        let loc = Location::from(tree_sitter::Point { row: 0, column: 4 });
        assert_eq!(loc, Location::new(1, 4));
    }

    #[test]
    fn test_empty_result() {
        let result = AnalysisResult::empty(Language::Python);
        assert!(result.is_empty());
        assert_eq!(result.entities().count(), 0);
    }

    #[test]
    fn test_owner_lookup() {
        let mut result = AnalysisResult::empty(Language::Python);
        result.functions.push(entity(3, EntityKind::Function, "run"));
        result.types.push(entity(9, EntityKind::TypeDefinition, "Job"));
        result.calls.push(CallSite {
            callee_name: "helper".to_string(),
            location: Location::new(2, 4),
            owner: Some(EntityId(3)),
            owner_name: Some("run".to_string()),
        });
        result.calls.push(CallSite {
            callee_name: "main".to_string(),
            location: Location::new(10, 0),
            owner: None,
            owner_name: None,
        });

        assert_eq!(result.owner_of(&result.calls[0]).map(|e| e.name.as_str()), Some("run"));
        assert!(result.owner_of(&result.calls[1]).is_none());
        assert!(result.calls[1].is_top_level());
        assert_eq!(result.calls_from(EntityId(3)).count(), 1);
        assert_eq!(result.entity(EntityId(9)).map(|e| e.kind), Some(EntityKind::TypeDefinition));
    }

    #[test]
    fn test_import_record_constructors() {
        let plain = ImportRecord::module("os", Location::new(1, 0));
        assert!(plain.imported_name.is_none());

        let from = ImportRecord::from_import("os", "path", Location::new(2, 0));
        assert_eq!(from.imported_name.as_deref(), Some("path"));
    }

    #[test]
    fn test_serialization() {
        let mut result = AnalysisResult::empty(Language::Go);
        result.functions.push(entity(1, EntityKind::Function, "main"));
        let json = serde_json::to_string(&result).expect("serialize");
        assert!(json.contains("\"language\":\"go\""));
        assert!(json.contains("\"kind\":\"function\""));
        let parsed: AnalysisResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, result);
    }
}
