//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Extract functions, types, calls and imports from a codebase
#[derive(Parser, Debug)]
#[command(name = "codeatlas")]
#[command(about = "Extract functions, types, calls and imports from a codebase")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Whether verbose logging was requested
    pub fn verbose(&self) -> bool {
        matches!(self.command, Command::Analyze { verbose: true, .. })
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a codebase and write documentation
    Analyze {
        /// Path to the codebase to analyze
        path: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (markdown, json)
        #[arg(long)]
        format: Option<String>,

        /// Glob patterns to include (can be repeated)
        #[arg(long)]
        include: Vec<String>,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Worker threads (0 = one per core)
        #[arg(long)]
        workers: Option<usize>,

        /// Graph to draw (calls, imports)
        #[arg(long)]
        graph: Option<String>,

        /// Skip diagram generation
        #[arg(long)]
        no_diagrams: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show version information
    Version,
}
