//! Condensed, weighted, file-level dependency graph.
//!
//! Vertices are file names, assigned an index on first sight. An optional
//! reassignment map (canonical query string to destination file) overrides
//! the file resolved for either endpoint during construction, which is how
//! a "what if this entity moved" scenario is simulated without touching the
//! input data.

use indexmap::IndexMap;
use log::debug;
use std::collections::HashMap;

use crate::core::entity::Entity;
use crate::core::errors::{AnalysisError, Result};
use crate::core::scanner::DependencyScanner;

/// Canonical query string to destination file name.
pub type Reassignments = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    index: IndexMap<String, usize>,
    successors: Vec<Vec<usize>>,
    weights: Vec<Vec<u32>>,
}

/// Out-degree change of one vertex between two graphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegreeDelta {
    pub before: usize,
    pub after: usize,
    pub delta: isize,
    /// Successor indices of the vertex in the other graph.
    pub successors: Vec<usize>,
}

impl DependencyGraph {
    /// Builds the graph from one or more dependency streams. Aggregated
    /// rules and edges whose endpoints resolve to the same file are
    /// skipped; repeated edges increment the edge weight.
    pub fn build(reassignments: Option<&Reassignments>, inputs: &[&str]) -> Result<Self> {
        let mut graph = DependencyGraph::default();
        for input in inputs {
            for record in DependencyScanner::new(input) {
                let d = record?;
                if d.from.len() != 1 {
                    continue;
                }
                let from = Entity::new(&d.from[0]);
                let to = Entity::new(&d.to);
                let mut source = from.filename();
                let mut destination = to.filename();
                if let Some(map) = reassignments {
                    if let Some(file) = map.get(&from.query_string()) {
                        debug!("reassigned source {source} to {file}");
                        source = file.clone();
                    }
                    if let Some(file) = map.get(&to.query_string()) {
                        debug!("reassigned destination {destination} to {file}");
                        destination = file.clone();
                    }
                }
                if source == destination {
                    continue;
                }
                let si = graph.intern(source);
                let di = graph.intern(destination);
                match graph.successors[si].iter().position(|&v| v == di) {
                    Some(at) => graph.weights[si][at] += 1,
                    None => {
                        graph.successors[si].push(di);
                        graph.weights[si].push(1);
                    }
                }
            }
        }
        Ok(graph)
    }

    fn intern(&mut self, file: String) -> usize {
        let next = self.index.len();
        let idx = *self.index.entry(file).or_insert(next);
        if idx == next {
            self.successors.push(Vec::new());
            self.weights.push(Vec::new());
        }
        idx
    }

    pub fn vertex_count(&self) -> usize {
        self.index.len()
    }

    /// Adjacency lists, indexed by vertex.
    pub fn successors(&self) -> &[Vec<usize>] {
        &self.successors
    }

    /// Edge weights, parallel to [`DependencyGraph::successors`].
    pub fn weights(&self) -> &[Vec<u32>] {
        &self.weights
    }

    /// Removes the first matching successor entry. Unknown vertices or a
    /// nonexistent edge are a no-op.
    pub fn remove_edge(&mut self, source: &str, destination: &str) {
        let (Some(&si), Some(&di)) = (self.index.get(source), self.index.get(destination))
        else {
            return;
        };
        if let Some(at) = self.successors[si].iter().position(|&v| v == di) {
            self.successors[si].remove(at);
            self.weights[si].remove(at);
        }
    }

    pub fn edges_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    /// Reports, per vertex whose out-degree differs, the signed delta and
    /// the other graph's successor set. Both graphs must carry the same
    /// vertex set; anything else is a usage error.
    pub fn diff(&self, other: &DependencyGraph) -> Result<IndexMap<String, DegreeDelta>> {
        if self.index.len() != other.index.len() {
            return Err(AnalysisError::GraphSizeMismatch {
                left: self.index.len(),
                right: other.index.len(),
            });
        }
        let mut result = IndexMap::new();
        for (key, &idx) in &self.index {
            let other_idx = match other.index.get(key) {
                Some(&i) => i,
                None => {
                    return Err(AnalysisError::VertexNotFound { name: key.clone() });
                }
            };
            let before = self.successors[idx].len();
            let after = other.successors[other_idx].len();
            if before != after {
                result.insert(
                    key.clone(),
                    DegreeDelta {
                        before,
                        after,
                        delta: after as isize - before as isize,
                        successors: other.successors[other_idx].clone(),
                    },
                );
            }
        }
        Ok(result)
    }
}
