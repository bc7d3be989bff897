// Repository-wide aggregation of per-file results

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::{AnalysisResult, Entity, EntityId, Language};

/// Repository-wide identity of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedId {
    pub file: PathBuf,
    pub entity: EntityId,
}

/// A file that contributed nothing to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub language: Option<Language>,
    pub error: String,
}

/// The canonical model for a whole repository.
///
/// Append-only for the duration of a run; build a fresh one to re-analyze.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryModel {
    files: BTreeMap<PathBuf, AnalysisResult>,
    failures: Vec<FileFailure>,
}

impl RepositoryModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one file's result. Returns false if the path was already present.
    pub fn insert(&mut self, path: impl Into<PathBuf>, result: AnalysisResult) -> bool {
        let path = path.into();
        if self.files.contains_key(&path) || self.failures.iter().any(|f| f.path == path) {
            warn!("Ignoring duplicate result for {}", path.display());
            return false;
        }
        self.files.insert(path, result);
        true
    }

    /// Record a file that failed to read or parse
    pub fn record_failure(
        &mut self,
        path: impl Into<PathBuf>,
        language: Option<Language>,
        error: impl ToString,
    ) {
        self.failures.push(FileFailure {
            path: path.into(),
            language,
            error: error.to_string(),
        });
    }

    /// Get the result for a file
    pub fn file(&self, path: &Path) -> Option<&AnalysisResult> {
        self.files.get(path)
    }

    /// Iterate over files in path order
    pub fn files(&self) -> impl Iterator<Item = (&Path, &AnalysisResult)> {
        self.files.iter().map(|(p, r)| (p.as_path(), r))
    }

    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    /// Resolve a qualified id
    pub fn entity(&self, id: &QualifiedId) -> Option<&Entity> {
        self.files.get(&id.file).and_then(|r| r.entity(id.entity))
    }

    /// Every entity in the repository with its qualified id
    pub fn entities(&self) -> impl Iterator<Item = (QualifiedId, &Entity)> {
        self.files.iter().flat_map(|(path, result)| {
            result.entities().map(move |e| {
                (
                    QualifiedId {
                        file: path.clone(),
                        entity: e.id,
                    },
                    e,
                )
            })
        })
    }

    /// Find entities by name across all files
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (QualifiedId, &'a Entity)> + 'a {
        self.entities().filter(move |(_, e)| e.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.failures.is_empty()
    }

    /// Get statistics about the model
    pub fn stats(&self) -> ModelStats {
        let mut stats = ModelStats {
            files: self.files.len(),
            failed: self.failures.len(),
            ..ModelStats::default()
        };
        for result in self.files.values() {
            stats.functions += result.functions.len();
            stats.types += result.types.len();
            stats.calls += result.calls.len();
            stats.imports += result.imports.len();
        }
        stats
    }
}

/// Statistics about the repository model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    pub files: usize,
    pub failed: usize,
    pub functions: usize,
    pub types: usize,
    pub calls: usize,
    pub imports: usize,
}

impl ModelStats {
    /// Files attempted, successful or not
    pub fn attempted(&self) -> usize {
        self.files + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, Location};

    fn result_with_function(name: &str, id: u32) -> AnalysisResult {
        let mut result = AnalysisResult::empty(Language::Python);
        result.functions.push(Entity {
            id: EntityId(id),
            kind: EntityKind::Function,
            name: name.to_string(),
            signature: format!("{}()", name),
            docstring: String::new(),
            body_text: format!("def {}(): pass", name),
            start: Location::new(1, 0),
            end: Location::new(1, 20),
        });
        result
    }

    #[test]
    fn test_empty_model() {
        let model = RepositoryModel::new();
        assert!(model.is_empty());
        assert_eq!(model.stats(), ModelStats::default());
    }

    #[test]
    fn test_same_name_in_different_files_stays_distinct() {
        let mut model = RepositoryModel::new();
        assert!(model.insert("a.py", result_with_function("main", 1)));
        assert!(model.insert("b.py", result_with_function("main", 1)));

        let found: Vec<_> = model.find_by_name("main").collect();
        assert_eq!(found.len(), 2);
        assert_ne!(found[0].0, found[1].0);
        assert_eq!(model.stats().functions, 2);
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut model = RepositoryModel::new();
        assert!(model.insert("a.py", result_with_function("one", 1)));
        assert!(!model.insert("a.py", result_with_function("two", 1)));

        let kept = model.file(Path::new("a.py")).unwrap();
        assert_eq!(kept.functions[0].name, "one");
    }

    #[test]
    fn test_failures_counted() {
        let mut model = RepositoryModel::new();
        model.insert("ok.py", AnalysisResult::empty(Language::Python));
        model.record_failure("bad.py", Some(Language::Python), "syntax error at line 1, column 0");

        let stats = model.stats();
        assert_eq!(stats.files, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.attempted(), 2);
        assert!(!model.insert("bad.py", AnalysisResult::empty(Language::Python)));
    }

    #[test]
    fn test_resolve_qualified_id() {
        let mut model = RepositoryModel::new();
        model.insert("lib.py", result_with_function("helper", 7));
        let id = QualifiedId {
            file: PathBuf::from("lib.py"),
            entity: EntityId(7),
        };
        assert_eq!(model.entity(&id).map(|e| e.name.as_str()), Some("helper"));
    }

    #[test]
    fn test_files_iterate_in_path_order() {
        let mut model = RepositoryModel::new();
        model.insert("z.py", AnalysisResult::empty(Language::Python));
        model.insert("a.py", AnalysisResult::empty(Language::Python));
        let paths: Vec<_> = model.files().map(|(p, _)| p.to_path_buf()).collect();
        assert_eq!(paths, vec![PathBuf::from("a.py"), PathBuf::from("z.py")]);
    }

    #[test]
    fn test_json_round_trip() {
        let mut model = RepositoryModel::new();
        model.insert("src/app.py", result_with_function("run", 2));
        let json = serde_json::to_string_pretty(&model).unwrap();
        let back: RepositoryModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
