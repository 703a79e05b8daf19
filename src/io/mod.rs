//! Input adapters at the analysis boundary.
//!
//! Everything here reads fully buffered text; the analysis core rewinds a
//! "stream" by re-borrowing the buffer. The cluster reader is a lenient
//! extraction of named subgraphs from DOT text, not a graphviz parser.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::analysis::clusters::{Cluster, ClusterGraph};
use crate::analysis::finder::Finder;
use crate::core::entity::{java_to_hr, Entity};
use crate::core::errors::{AnalysisError, Result};
use crate::smells::{find_best_candidate, Smell};
use crate::Reassignments;

static SUBGRAPH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"subgraph\s+(\w+)\s*\{").unwrap());

static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).unwrap());

/// Buffers a whole input file.
pub fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Extracts `subgraph clusterN { "member" ... }` blocks from DOT text.
/// Subgraphs without the `cluster` name prefix are ignored.
pub fn parse_cluster_graph(input: &str) -> ClusterGraph {
    let mut subgraphs = Vec::new();
    let mut offset = 0;
    while let Some(found) = SUBGRAPH_RE.captures_at(input, offset) {
        let whole = found.get(0).unwrap();
        let name = found[1].to_string();
        let body_start = whole.end();
        let body_end = matching_brace(input, body_start);
        let members = QUOTED_RE
            .captures_iter(&input[body_start..body_end])
            .map(|m| m[1].to_string())
            .collect();
        subgraphs.push(Cluster { name, members });
        offset = body_end;
    }
    ClusterGraph::new(subgraphs)
}

fn matching_brace(input: &str, from: usize) -> usize {
    let mut depth = 1usize;
    for (i, c) in input[from..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return from + i;
                }
            }
            _ => {}
        }
    }
    input.len()
}

/// Reads precomputed smells, bypassing detection. Only the entity and the
/// target are consumed; the rest of the line is presentation.
pub fn parse_smells_file(input: &str) -> Vec<Smell> {
    let mut smells = Vec::new();
    for line in input.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((entity, rest)) = line.split_once(" -> ") else {
            warn!("skipping smell line without a target: {line:?}");
            continue;
        };
        let target = rest.split(" (").next().unwrap_or(rest);
        smells.push(Smell {
            entity: entity.to_string(),
            target: target.to_string(),
            depcount: 0,
            candidates: Vec::new(),
        });
    }
    smells
}

/// Reads `humanReadableEntity;targetFile` lines and keeps the moves that
/// candidate search validates against the existing couplings.
pub fn parse_supplemental_refactorings(
    input: &str,
    sd_finder: &Finder,
    ccd_finder: &Finder,
) -> Result<Reassignments> {
    let mut reassignments = Reassignments::new();
    for line in input.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(';').collect();
        if fields.len() < 2 {
            return Err(AnalysisError::InvalidRefactoring {
                line: line.to_string(),
            });
        }
        let hr = java_to_hr(fields[0]);
        let entity = Entity::new(&hr);
        let best = find_best_candidate(
            None,
            &entity.query_string(),
            &entity.filename(),
            &[fields[1].to_string()],
            sd_finder,
            ccd_finder,
            None,
        )?;
        if let Some((target, _)) = best {
            reassignments.insert(entity.query_string(), target);
        }
    }
    Ok(reassignments)
}
