//! Per-run configuration, either from the command line or from a batch
//! configuration file with one run per line.

use std::path::PathBuf;

/// Inputs and options of one analysis run.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Cluster assignment files in DOT notation. Empty entries are skipped.
    pub dot_files: Vec<PathBuf>,
    pub static_mdg: PathBuf,
    pub cochange_mdg: PathBuf,
    pub errors_file: PathBuf,
    pub inheritance_file: Option<PathBuf>,
    pub field_types_file: Option<PathBuf>,
    /// Externally computed move refactorings, one file per reassignment pass.
    pub supplemental_refactorings: Vec<PathBuf>,
    /// Precomputed smell files bypassing detection, one list per file.
    pub smells: Vec<PathBuf>,
}

/// Parses a batch configuration, one run per line with eight
/// semicolon-separated columns:
///
/// ```text
/// dotfile;staticmdg;cochangemdg;errors;inheritance;fieldtypes;supplemental;smells
/// ```
///
/// Missing trailing columns default to empty. The last two columns hold
/// `|`-separated file lists.
pub fn parse_batch_config(input: &str) -> Vec<RunConfig> {
    let mut configs = Vec::new();
    for line in input.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields: Vec<&str> = line.split(';').collect();
        fields.resize(8, "");
        configs.push(RunConfig {
            dot_files: if fields[0].is_empty() {
                Vec::new()
            } else {
                vec![PathBuf::from(fields[0])]
            },
            static_mdg: PathBuf::from(fields[1]),
            cochange_mdg: PathBuf::from(fields[2]),
            errors_file: PathBuf::from(fields[3]),
            inheritance_file: optional_path(fields[4]),
            field_types_file: optional_path(fields[5]),
            supplemental_refactorings: split_paths(fields[6]),
            smells: split_paths(fields[7]),
        });
    }
    configs
}

fn optional_path(field: &str) -> Option<PathBuf> {
    if field.is_empty() {
        None
    } else {
        Some(PathBuf::from(field))
    }
}

fn split_paths(field: &str) -> Vec<PathBuf> {
    if field.is_empty() {
        Vec::new()
    } else {
        field.split('|').map(PathBuf::from).collect()
    }
}
