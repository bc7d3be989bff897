//! CLI module for Codeatlas

mod args;

pub use args::{Args, Command};

use crate::analysis::{Analyzer, CodeGraph};
use crate::config::{CliOverrides, Config, OutputFormat, DEFAULT_CONFIG_FILE};
use crate::error::{Error, Result};
use crate::model::RepositoryModel;
use crate::output::{self, DiagramGenerator, DiagramSection, MarkdownGenerator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Failed files listed before the rest are summarized
const MAX_LISTED_FAILURES: usize = 5;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();
    init_logging(args.verbose());

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; RUST_LOG overrides the level picked by --verbose
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("codeatlas={}", level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Analyze {
            path,
            output,
            format,
            include,
            exclude,
            config,
            workers,
            graph,
            no_diagrams,
            verbose,
        } => {
            // An explicit config file must exist; the default one is optional
            let mut cfg = match &config {
                Some(config_path) => Config::load(config_path)?,
                None => Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
            };

            cfg.merge_cli(CliOverrides {
                output,
                include,
                exclude,
                format,
                workers,
                graph,
                no_diagrams,
            })?;
            debug!("Effective config: {:?}", cfg);

            if !path.exists() {
                return Err(Error::PathNotFound(path));
            }

            let analyzer = Analyzer::new(cfg.clone())?.with_verbose(verbose);

            println!("Discovering files...");
            let counts = analyzer.file_counts(&path)?;
            if counts.total() == 0 {
                println!("Found 0 source files");
            } else {
                println!("Found {} source files ({})", counts.total(), counts.summary());
            }

            println!("Analyzing codebase...");
            let model = analyzer.analyze(&path)?;
            report(&model);

            let project_name = project_name(&cfg, &path);
            std::fs::create_dir_all(&cfg.output.directory)?;

            match cfg.output.format {
                OutputFormat::Json => {
                    println!("\nGenerating JSON output...");
                    let output_path = cfg.output.directory.join("analysis.json");
                    std::fs::write(&output_path, output::to_json(&model)?)?;
                    println!("JSON written to: {}", output_path.display());
                }
                OutputFormat::Markdown => {
                    println!("\nGenerating Markdown output...");
                    let diagram = diagram_section(&cfg, &model);
                    if let Some(section) = &diagram {
                        if !section.mermaid.is_empty() {
                            let mmd_path = cfg
                                .output
                                .directory
                                .join(format!("{}.mmd", cfg.diagrams.kind.tag()));
                            std::fs::write(&mmd_path, &section.mermaid)?;
                        }
                    }

                    let md = MarkdownGenerator::new(project_name)?
                        .with_description(cfg.project.description.clone())
                        .generate(&model, diagram)?;
                    let output_path = cfg.output.directory.join("docs.md");
                    std::fs::write(&output_path, md)?;
                    println!("Markdown written to: {}", output_path.display());
                }
            }

            Ok(())
        }

        Command::Version => {
            println!("codeatlas {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn report(model: &RepositoryModel) {
    let stats = model.stats();
    println!(
        "Analysis complete: {} files, {} types, {} functions, {} calls, {} imports",
        stats.files, stats.types, stats.functions, stats.calls, stats.imports
    );

    let failures = model.failures();
    if failures.is_empty() {
        return;
    }

    println!("\n{} of {} files failed:", stats.failed, stats.attempted());
    for failure in failures.iter().take(MAX_LISTED_FAILURES) {
        println!("  {}: {}", failure.path.display(), failure.error);
    }
    if failures.len() > MAX_LISTED_FAILURES {
        println!("  ... and {} more", failures.len() - MAX_LISTED_FAILURES);
    }
}

/// Configured name, or the analyzed directory's name
fn project_name(cfg: &Config, path: &Path) -> String {
    if cfg.project.name != "Untitled Project" && !cfg.project.name.is_empty() {
        return cfg.project.name.clone();
    }

    let resolved: PathBuf = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    resolved
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("Project")
        .to_string()
}

fn diagram_section(cfg: &Config, model: &RepositoryModel) -> Option<DiagramSection> {
    if !cfg.diagrams.enabled {
        return None;
    }

    let generator = DiagramGenerator::new()
        .with_max_nodes(cfg.diagrams.max_nodes)
        .with_direction(cfg.diagrams.direction);
    let graph = CodeGraph::build(model, cfg.diagrams.kind);

    Some(DiagramSection {
        title: cfg.diagrams.kind.title().to_string(),
        mermaid: graph.render(&generator),
    })
}
