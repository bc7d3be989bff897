use std::path::PathBuf;
use thiserror::Error;

/// Failures contained at the boundary of a single extraction or diagram step.
///
/// None of these abort a repository run: a file that fails to parse
/// contributes nothing, an incomplete match is dropped, and a diagram that
/// cannot be built renders as empty text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },

    #[error("incomplete {query} match at line {line}")]
    IncompleteMatch { query: &'static str, line: usize },

    #[error("diagram build failed: {0}")]
    DiagramBuild(String),
}

/// Codeatlas error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Query error: {0}")]
    Query(#[from] tree_sitter::QueryError),

    #[error("Grammar error: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Result type alias for Codeatlas operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create an analysis error
    pub fn analysis(msg: impl Into<String>) -> Self {
        Error::Analysis(msg.into())
    }

    /// Create an unsupported language error
    pub fn unsupported_language(tag: impl Into<String>) -> Self {
        Error::UnsupportedLanguage(tag.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_path_not_found_display() {
        let err = Error::PathNotFound(PathBuf::from("/some/path"));
        assert_eq!(err.to_string(), "Path not found: /some/path");
    }

    #[test]
    fn test_config_validation_display() {
        let err = Error::config_validation("workers must not exceed 256");
        assert_eq!(
            err.to_string(),
            "Config validation error: workers must not exceed 256"
        );
    }

    #[test]
    fn test_analysis_error() {
        let err = Error::analysis("No source files found");
        assert_eq!(err.to_string(), "Analysis error: No source files found");
    }

    #[test]
    fn test_unsupported_language() {
        let err = Error::unsupported_language("cobol");
        assert_eq!(err.to_string(), "Unsupported language: cobol");
    }

    #[test]
    fn test_syntax_error_display() {
        let err = ExtractError::Syntax { line: 3, column: 7 };
        assert_eq!(err.to_string(), "syntax error at line 3, column 7");
    }

    #[test]
    fn test_extract_error_is_transparent() {
        let err: Error = ExtractError::DiagramBuild("too many nodes".to_string()).into();
        assert_eq!(err.to_string(), "diagram build failed: too many nodes");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
        assert_send_sync::<ExtractError>();
    }
}
