use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// One detected smell per line (default)
    Smells,
    /// Smells refined with the best move target per entity
    Suggestions,
    /// Smell count per run
    Count,
    /// Improvement metric vectors, one JSON object per reassignment pass
    Metric,
    /// One csv row per run with attributes and metric deltas
    Csv,
    /// Full analysis result as a single JSON document
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "evomove")]
#[command(about = "Move-method recommender over static and co-change dependency graphs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output mode
    #[arg(long, value_enum, default_value = "smells")]
    pub output: OutputMode,

    /// Cluster assignment file in DOT notation
    #[arg(long = "dot-file")]
    pub dot_file: Option<PathBuf>,

    /// Directory of cluster assignment files, each analyzed in turn
    #[arg(long = "dot-dir")]
    pub dot_dir: Option<PathBuf>,

    /// Minimum co-change support count for a rule to count as evidence
    #[arg(long = "minimum-support-count", default_value = "2")]
    pub minimum_support_count: usize,

    /// Minimum co-change confidence for a rule to count as evidence
    #[arg(long = "minimum-confidence", default_value = "0.5")]
    pub minimum_confidence: f64,

    /// Accept entities depending on their current class when the source
    /// and target files are already statically coupled
    #[arg(long = "allow-to-depend-on-current-class")]
    pub allow_to_depend_on_current_class: bool,

    /// Externally computed refactoring files, separated by '|'
    #[arg(long = "supplemental-refactorings", value_delimiter = '|')]
    pub supplemental_refactorings: Vec<PathBuf>,

    /// Use these smell files instead of detecting, separated by '|'
    #[arg(long, value_delimiter = '|')]
    pub smells: Vec<PathBuf>,

    /// Batch configuration file, one run per line
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Static dependency graph file
    pub static_mdg: Option<PathBuf>,

    /// Co-change dependency graph file
    pub cochange_mdg: Option<PathBuf>,

    /// Error report file
    pub errors_file: Option<PathBuf>,

    /// Inheritance relation file
    pub inheritance_file: Option<PathBuf>,

    /// Field type relation file
    pub field_types_file: Option<PathBuf>,
}
