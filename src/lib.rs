// Export modules for library usage
pub mod analysis;
pub mod cli;
pub mod config;
pub mod core;
pub mod driver;
pub mod improvement;
pub mod io;
pub mod metrics;
pub mod smells;

// Re-export commonly used types
pub use crate::analysis::{
    Cluster, ClusterGraph, Dependencies, DependencyGraph, FieldTypes, Finder, Inheritance,
    Reassignments, Structure,
};
pub use crate::core::{AnalysisError, DependencyRecord, DependencyScanner, Entity, Result};
pub use crate::driver::{run_analysis, AnalysisOutcome, RunAttributes, RunOptions};
pub use crate::improvement::{composite_baseline, improvements, MetricVector};
pub use crate::smells::{
    find_best_candidate, find_smells_using_clusters, find_smells_using_dependencies,
    merge_smells, search_candidates, Candidate, DetectionThresholds, Smell,
};
