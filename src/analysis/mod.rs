// Analysis module: repository discovery, parallel extraction and graphs

pub mod graph;

pub use graph::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract;
use crate::model::{AnalysisResult, Language, RepositoryModel, SourceFile};
use crate::parser::AdapterSet;
use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into
const IGNORED_DIRS: &[&str] = &[".git", "node_modules", "target", "__pycache__", "venv", ".venv"];

/// Number of discovered files per language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCounts {
    counts: BTreeMap<Language, usize>,
}

impl FileCounts {
    pub fn get(&self, language: Language) -> usize {
        self.counts.get(&language).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// e.g. "3 Python, 1 Go"
    pub fn summary(&self) -> String {
        self.counts
            .iter()
            .map(|(lang, n)| format!("{} {}", n, lang.display_name()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Main analyzer that orchestrates the analysis pipeline
pub struct Analyzer {
    config: Config,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    verbose: bool,
}

impl Analyzer {
    /// Create a new analyzer with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let include = compile(&config.analysis.include)?;
        let exclude = compile(&config.analysis.exclude)?;

        Ok(Self {
            config,
            include,
            exclude,
            verbose: false,
        })
    }

    /// Create analyzer with a progress bar
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze every supported file under `root`
    pub fn analyze(&self, root: &Path) -> Result<RepositoryModel> {
        let root = canonical_root(root)?;
        let files = self.discover_files(&root)?;

        if files.is_empty() {
            return Err(Error::analysis("No source files found"));
        }
        info!("Analyzing {} files under {}", files.len(), root.display());

        let mut model = RepositoryModel::new();
        let mut sources = Vec::with_capacity(files.len());
        for (path, language) in files {
            let relative = path.strip_prefix(&root).unwrap_or(&path).to_path_buf();
            match std::fs::read_to_string(&path) {
                Ok(text) => sources.push(SourceFile::new(relative, language, text)),
                Err(e) => {
                    warn!("Cannot read {}: {}", relative.display(), e);
                    model.record_failure(relative, Some(language), e);
                }
            }
        }

        self.extract_into(&mut model, &sources)?;
        Ok(model)
    }

    /// Analyze in-memory sources
    pub fn analyze_sources(&self, sources: &[SourceFile]) -> Result<RepositoryModel> {
        let mut model = RepositoryModel::new();
        self.extract_into(&mut model, sources)?;
        Ok(model)
    }

    /// Per-language counts of the files `analyze` would visit
    pub fn file_counts(&self, root: &Path) -> Result<FileCounts> {
        let root = canonical_root(root)?;
        let mut counts = FileCounts::default();
        for (_, language) in self.discover_files(&root)? {
            *counts.counts.entry(language).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Extract on the worker pool, then merge on this thread
    fn extract_into(&self, model: &mut RepositoryModel, sources: &[SourceFile]) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.analysis.workers)
            .build()
            .map_err(|e| Error::analysis(format!("Failed to start worker pool: {}", e)))?;
        debug!("Extracting on {} workers", pool.current_num_threads());

        let progress = self.progress_bar(sources.len());
        let outcomes: Vec<Result<AnalysisResult>> = pool.install(|| {
            sources
                .par_iter()
                .map_init(AdapterSet::new, |adapters, source| {
                    let outcome = analyze_source(adapters, source);
                    if let Some(pb) = &progress {
                        pb.inc(1);
                    }
                    outcome
                })
                .collect()
        });
        if let Some(pb) = progress {
            pb.finish_with_message("Extraction complete");
        }

        for (source, outcome) in sources.iter().zip(outcomes) {
            match outcome {
                Ok(result) => {
                    model.insert(source.path.clone(), result);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", source.path.display(), e);
                    model.record_failure(source.path.clone(), Some(source.language), e);
                }
            }
        }

        let stats = model.stats();
        info!(
            "Extracted {} functions and {} types from {} files ({} failed)",
            stats.functions, stats.types, stats.files, stats.failed
        );
        Ok(())
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.verbose {
            return None;
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }

    /// Discover supported source files, sorted by path
    fn discover_files(&self, root: &Path) -> Result<Vec<(PathBuf, Language)>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_ignored_dir(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let language = match Language::from_path(path) {
                Some(language) => language,
                None => continue,
            };
            let relative = path.strip_prefix(root).unwrap_or(path);
            if self.should_include(relative) {
                files.push((path.to_path_buf(), language));
            }
        }

        files.sort();
        Ok(files)
    }

    /// Check a root-relative path against the include and exclude patterns
    fn should_include(&self, relative: &Path) -> bool {
        self.include.iter().any(|p| p.matches_path(relative))
            && !self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

/// Extract one source with this worker's adapters
fn analyze_source(adapters: &mut AdapterSet, source: &SourceFile) -> Result<AnalysisResult> {
    let adapter = adapters.get(source.language)?;
    Ok(extract::try_analyze_with(adapter, &source.text)?)
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    root.canonicalize()
        .map_err(|_| Error::PathNotFound(root.to_path_buf()))
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p).map_err(Error::from))
        .collect()
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| IGNORED_DIRS.contains(&name))
            .unwrap_or(false)
}
