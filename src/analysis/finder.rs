//! Entity- and file-level dependency indices.
//!
//! A `Finder` is built once from a dependency stream and answers read-only
//! queries afterwards. Only single-source records participate; aggregated
//! rules carry no entity-level placement information.

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::core::entity::Entity;
use crate::core::errors::Result;
use crate::core::scanner::DependencyScanner;

/// Incoming and outgoing dependency entities, in stream order.
#[derive(Debug, Clone, Default)]
pub struct Dependencies {
    pub income: Vec<String>,
    pub outcome: Vec<String>,
}

pub struct Finder {
    by_entity: IndexMap<String, Dependencies>,
    by_file: IndexMap<String, Dependencies>,
    file_pairs: HashSet<(String, String)>,
    error_report: String,
}

impl Finder {
    /// Builds the indices from a dependency stream, optionally attaching an
    /// error-report text used by [`Finder::on_errors`].
    pub fn new(dependencies: &str, error_report: Option<&str>) -> Result<Self> {
        let mut finder = Finder {
            by_entity: IndexMap::new(),
            by_file: IndexMap::new(),
            file_pairs: HashSet::new(),
            error_report: error_report.unwrap_or_default().to_string(),
        };
        for record in DependencyScanner::new(dependencies) {
            let d = record?;
            if d.from.len() != 1 {
                continue;
            }
            let from = Entity::new(&d.from[0]);
            let to = Entity::new(&d.to);
            for e in [&from, &to] {
                finder.by_entity.entry(e.query_string()).or_default();
                finder.by_file.entry(e.filename()).or_default();
            }
            finder.by_entity[&to.query_string()]
                .income
                .push(from.raw().to_string());
            finder.by_entity[&from.query_string()]
                .outcome
                .push(to.raw().to_string());
            finder.by_file[&to.filename()]
                .income
                .push(from.raw().to_string());
            finder.by_file[&from.filename()]
                .outcome
                .push(to.raw().to_string());
            let pair = (from.filename(), to.filename());
            finder.file_pairs.insert((pair.1.clone(), pair.0.clone()));
            finder.file_pairs.insert(pair);
        }
        Ok(finder)
    }

    /// The dependency record of an entity, or `None` when the entity has no
    /// canonical form or was never seen.
    pub fn dependencies_of(&self, e: &Entity) -> Option<&Dependencies> {
        let qs = e.query_string();
        if qs.is_empty() {
            return None;
        }
        self.by_entity.get(&qs)
    }

    /// True when the entity appears in the externally supplied error report.
    /// The match is deliberately loose: the member name is stripped of its
    /// parameter list and looked up by substring containment.
    pub fn on_errors(&self, e: &Entity) -> bool {
        let qs = e.query_string();
        if qs.is_empty() {
            return false;
        }
        let needle = match qs.find('(') {
            Some(open) => {
                let start = qs[..open].rfind('/').map(|i| i + 1).unwrap_or(0);
                &qs[start..open]
            }
            None => qs.as_str(),
        };
        self.error_report.contains(needle)
    }

    pub fn has_dependencies_between_files(&self, file1: &str, file2: &str) -> bool {
        self.file_pairs
            .contains(&(file1.to_string(), file2.to_string()))
            || self
                .file_pairs
                .contains(&(file2.to_string(), file1.to_string()))
    }

    /// All cross-file couplings touching the two files, in both directions.
    /// Each pair holds the canonical query strings of the two endpoints,
    /// the indexed entity first.
    pub fn dependencies_between_files(&self, file1: &str, file2: &str) -> Vec<(String, String)> {
        let mut result = Vec::new();
        for (qs, deps) in &self.by_entity {
            let own_file = crate::core::entity::query_string_filename(qs);
            if own_file != file1 && own_file != file2 {
                continue;
            }
            for other in deps.income.iter().chain(deps.outcome.iter()) {
                let other_entity = Entity::new(other);
                let other_file = other_entity.filename();
                if other_file != file1 && other_file != file2 {
                    continue;
                }
                if own_file != other_file {
                    result.push((qs.clone(), other_entity.query_string()));
                }
            }
        }
        result
    }

    pub fn entities_count(&self) -> usize {
        self.by_entity.len()
    }

    pub fn dependencies_count(&self) -> usize {
        self.by_entity.values().map(|d| d.outcome.len()).sum()
    }
}
