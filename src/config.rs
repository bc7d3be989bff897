use crate::analysis::GraphKind;
use crate::error::{Error, Result};
use crate::output::Direction;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "codeatlas.toml";

/// Upper bound on the worker pool size
pub const MAX_WORKERS: usize = 256;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
    pub diagrams: DiagramConfig,
}

/// Project metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
}

/// Analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Glob patterns, relative to the analyzed root, a file must match
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Worker threads; 0 uses the available parallelism
    pub workers: usize,
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub directory: PathBuf,
}

/// Diagram settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub enabled: bool,
    pub max_nodes: usize,
    pub direction: Direction,
    pub kind: GraphKind,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(Error::config_validation(format!(
                "Unknown output format '{}' (expected markdown or json)",
                other
            ))),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            description: None,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include: vec!["**/*".to_string()],
            exclude: vec![
                "**/*.min.js".to_string(),
                "**/dist/**".to_string(),
                "**/build/**".to_string(),
            ],
            workers: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            directory: PathBuf::from("./codeatlas-docs"),
        }
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_nodes: 100,
            direction: Direction::default(),
            kind: GraphKind::default(),
        }
    }
}

/// Values given on the command line; unset fields leave the config alone
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output: Option<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub format: Option<String>,
    pub workers: Option<usize>,
    pub graph: Option<String>,
    pub no_diagrams: bool,
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file, or defaults if the file does not exist.
    ///
    /// A file that exists but is invalid is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: CliOverrides) -> Result<()> {
        if let Some(out) = cli.output {
            self.output.directory = out;
        }

        if !cli.include.is_empty() {
            self.analysis.include = cli.include;
        }

        if !cli.exclude.is_empty() {
            self.analysis.exclude.extend(cli.exclude);
        }

        if let Some(fmt) = cli.format {
            self.output.format = fmt.parse()?;
        }

        if let Some(workers) = cli.workers {
            self.analysis.workers = workers;
        }

        if let Some(graph) = cli.graph {
            self.diagrams.kind = graph.parse()?;
        }

        if cli.no_diagrams {
            self.diagrams.enabled = false;
        }

        self.validate()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.analysis.workers > MAX_WORKERS {
            return Err(Error::config_validation(format!(
                "workers cannot exceed {}",
                MAX_WORKERS
            )));
        }

        if self.diagrams.max_nodes == 0 {
            return Err(Error::config_validation("diagram max_nodes must be at least 1"));
        }

        if self.analysis.include.is_empty() {
            return Err(Error::config_validation("at least one include pattern required"));
        }

        for pattern in self.analysis.include.iter().chain(&self.analysis.exclude) {
            Pattern::new(pattern)?;
        }

        Ok(())
    }
}
