//! Evolutionary smell detection and best-target selection.
//!
//! A smell is an entity whose co-change coupling to another file is not
//! matched by its static placement. Two detection strategies produce
//! candidate sets; [`search_candidates`] then refines each smell into a
//! concrete move target by simulating the reassignment on the static
//! graph and rejecting moves that add edges.

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::analysis::clusters::ClusterGraph;
use crate::analysis::finder::Finder;
use crate::analysis::graph::{DependencyGraph, Reassignments};
use crate::analysis::inheritance::{self, Inheritance};
use crate::core::entity::Entity;
use crate::core::errors::Result;
use crate::core::scanner::DependencyScanner;

/// A candidate destination file and the number of cross-file dependencies
/// involving the smelly entity that a move there would absorb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub name: String,
    pub depcount: usize,
}

/// A detected misplacement. `target` stays empty until candidate search
/// runs; an empty target means "smell identified, no safe improving
/// target found".
#[derive(Debug, Clone, Default, Serialize)]
pub struct Smell {
    pub entity: String,
    pub target: String,
    pub depcount: usize,
    pub candidates: Vec<Candidate>,
}

impl fmt::Display for Smell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let candidates = self
            .candidates
            .iter()
            .map(|c| format!("{}:{}", c.name, c.depcount))
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{} -> {} (depcount: {}, candidates: [{}])",
            self.entity, self.target, self.depcount, candidates
        )
    }
}

/// Detection gate shared by both strategies. Arguments: the entity, its
/// file, the co-change destination file, and the entities to ignore when
/// inspecting static dependencies.
pub type Precondition<'a> = dyn Fn(&Entity<'_>, &str, &str, &[String]) -> bool + 'a;

/// Thresholds applied by the dependency-based strategy.
#[derive(Debug, Clone, Copy)]
pub struct DetectionThresholds {
    pub minimum_support_count: usize,
    pub minimum_confidence: f64,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        DetectionThresholds {
            minimum_support_count: 2,
            minimum_confidence: 0.5,
        }
    }
}

/// The "evolutionary smell" gate: true when the entity has at least one
/// static dependency but none that resolves to its own file or to a known
/// superclass file. Entities found in the error report never qualify.
pub fn have_static_dependency_outside_file_and_superclass(
    finder: &Finder,
    e: &Entity<'_>,
    filename: &str,
    inheritance_info: Option<&Inheritance>,
    ignore: &[String],
) -> bool {
    if finder.on_errors(e) {
        return false;
    }
    let Some(deps) = finder.dependencies_of(e) else {
        return false;
    };
    let all: Vec<&String> = deps.outcome.iter().chain(deps.income.iter()).collect();
    if all.is_empty() {
        return false;
    }
    for dependency in all {
        if ignore.contains(dependency) {
            continue;
        }
        let file = Entity::new(dependency).filename();
        if file == filename {
            return false;
        }
        if inheritance::is_superclass(inheritance_info, &file) {
            return false;
        }
    }
    true
}

/// Cluster-based strategy: inside every cluster spanning at least two
/// files, every entity of a non-superclass member file that passes the
/// precondition is a smell, with the cluster's files as candidates.
pub fn find_smells_using_clusters(
    cluster_graph: &ClusterGraph,
    precondition: &Precondition<'_>,
    inheritance_info: Option<&Inheritance>,
) -> Vec<Smell> {
    let mut smells = Vec::new();
    for cluster in cluster_graph.clusters() {
        let mut by_file: IndexMap<String, Vec<&str>> = IndexMap::new();
        for member in &cluster.members {
            by_file
                .entry(Entity::new(member).filename())
                .or_default()
                .push(member);
        }
        if by_file.len() == 1 {
            continue;
        }
        let files: Vec<String> = by_file.keys().cloned().collect();
        for (filename, entities) in &by_file {
            if filename.is_empty() || inheritance::is_superclass(inheritance_info, filename) {
                continue;
            }
            for raw in entities {
                let e = Entity::new(raw);
                // entities without static dependencies are likely dead
                // code, entities coupled inside their own file belong
                // where they are
                if !precondition(&e, filename, "", &[]) {
                    continue;
                }
                smells.push(new_smell(raw, &files));
            }
        }
    }
    smells
}

/// Dependency-based strategy: every co-change rule above the thresholds
/// whose antecedents live apart from the consequent, outside superclass
/// files, and pass the precondition accumulates the consequent's file as
/// a candidate under the antecedent key.
pub fn find_smells_using_dependencies(
    cochange: &str,
    precondition: Option<&Precondition<'_>>,
    inheritance_info: Option<&Inheritance>,
    thresholds: DetectionThresholds,
) -> Result<Vec<Smell>> {
    let mut entities_with_smell: IndexMap<String, Vec<String>> = IndexMap::new();
    'records: for record in DependencyScanner::new(cochange) {
        let d = record?;
        if d.support_count < thresholds.minimum_support_count {
            continue;
        }
        if d.confidence < thresholds.minimum_confidence {
            continue;
        }
        let to_file = Entity::new(&d.to).filename();
        for from in &d.from {
            let from_file = Entity::new(from).filename();
            if from_file == to_file {
                continue 'records;
            }
            if inheritance::is_superclass(inheritance_info, &from_file) {
                continue 'records;
            }
            if let Some(gate) = precondition {
                if !gate(&Entity::new(from), &from_file, &to_file, &d.from) {
                    continue 'records;
                }
            }
        }
        entities_with_smell
            .entry(d.from.join("\t"))
            .or_default()
            .push(to_file);
    }
    Ok(entities_with_smell
        .iter()
        .map(|(key, files)| new_smell(key, files))
        .collect())
}

fn new_smell(entity: &str, candidate_files: &[String]) -> Smell {
    Smell {
        entity: entity.trim().to_string(),
        target: String::new(),
        depcount: 0,
        candidates: candidate_files
            .iter()
            .map(|name| Candidate {
                name: name.clone(),
                depcount: 0,
            })
            .collect(),
    }
}

/// Refines detected smells into concrete move targets. Smells for which
/// no candidate qualifies, or whose best candidate absorbs nothing, are
/// dropped from the suggestion list.
pub fn search_candidates(
    smells: Vec<Smell>,
    static_dependencies: Option<&str>,
    sd_finder: &Finder,
    ccd_finder: &Finder,
) -> Result<Vec<Smell>> {
    let mut result = Vec::with_capacity(smells.len());
    for smell in smells {
        let entity = Entity::new(&smell.entity);
        let query_string = entity.query_string();
        let filename = entity.filename();
        let candidate_files: Vec<String> =
            smell.candidates.iter().map(|c| c.name.clone()).collect();
        let mut refined = Smell {
            entity: smell.entity.clone(),
            ..Smell::default()
        };
        let best = find_best_candidate(
            static_dependencies,
            &query_string,
            &filename,
            &candidate_files,
            sd_finder,
            ccd_finder,
            Some(&mut refined),
        )?;
        match best {
            Some((target, depcount)) if depcount > 0 => {
                refined.target = target;
                refined.depcount = depcount;
                result.push(refined);
            }
            _ => debug!("no qualifying candidate for {}", refined.entity),
        }
    }
    Ok(result)
}

/// Selects, among the distinct candidate files, the one absorbing the
/// most cross-file dependencies involving the entity without adding any
/// edge to the simulated static graph. Ties keep the first encountered;
/// `None` is the normal "no recommendation" outcome. Every non-regressing
/// candidate is recorded on the smell for observability.
pub fn find_best_candidate(
    static_dependencies: Option<&str>,
    query_string: &str,
    filename: &str,
    candidate_files: &[String],
    sd_finder: &Finder,
    ccd_finder: &Finder,
    mut smell: Option<&mut Smell>,
) -> Result<Option<(String, usize)>> {
    let edges_before = match static_dependencies {
        Some(input) => Some(DependencyGraph::build(None, &[input])?.edges_count()),
        None => None,
    };
    let mut best: Option<(String, usize)> = None;
    let mut seen = HashSet::new();
    for candidate in candidate_files {
        if candidate == filename || !seen.insert(candidate.clone()) {
            continue;
        }
        let mut involved = 0usize;
        for (a, b) in sd_finder
            .dependencies_between_files(filename, candidate)
            .into_iter()
            .chain(
                ccd_finder
                    .dependencies_between_files(filename, candidate)
                    .into_iter(),
            )
        {
            if a == query_string || b == query_string {
                involved += 1;
            }
        }
        if let (Some(before), Some(input)) = (edges_before, static_dependencies) {
            let mut reassignments = Reassignments::new();
            reassignments.insert(query_string.to_string(), candidate.clone());
            let simulated = DependencyGraph::build(Some(&reassignments), &[input])?;
            if simulated.edges_count() > before {
                debug!(
                    "rejecting {candidate}: moving {query_string} adds edges ({} -> {})",
                    before,
                    simulated.edges_count()
                );
                continue;
            }
        }
        if let Some(s) = smell.as_deref_mut() {
            s.candidates.push(Candidate {
                name: candidate.clone(),
                depcount: involved,
            });
        }
        if best.as_ref().map_or(true, |(_, max)| involved > *max) {
            best = Some((candidate.clone(), involved));
        }
    }
    Ok(best)
}

/// Merges smells found over several cluster graphs. A smell replaces an
/// existing one with the same entity and target unless one of its
/// candidate counts is dominated by another of its own candidates.
pub fn merge_smells(merged: &mut Vec<Smell>, found: Vec<Smell>) {
    'smells: for smell in found {
        for existing in merged.iter_mut() {
            if existing.entity == smell.entity && existing.target == smell.target {
                for c in &smell.candidates {
                    for c2 in &smell.candidates {
                        if c.depcount < c2.depcount {
                            continue 'smells;
                        }
                    }
                }
                *existing = smell;
                continue 'smells;
            }
        }
        merged.push(smell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::clusters::Cluster;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const M1: &str = "p_C1.java/[CN]/C1/[MT]/m1()";
    const M2: &str = "p_C2.java/[CN]/C2/[MT]/m2()";

    const STATIC_DEPS: &str = indoc! {"
        p_C1.java/[CN]/C1/[MT]/m11()\tp_C1.java/[CN]/C1/[MT]/m12()
        p_C3.java/[CN]/C3/[MT]/m3()\tp_C1.java/[CN]/C1/[MT]/m1()
    "};

    fn cluster_graph() -> ClusterGraph {
        ClusterGraph::new(vec![Cluster {
            name: "cluster1".to_string(),
            members: vec![M1.to_string(), M2.to_string()],
        }])
    }

    fn gate<'a>(
        sd_finder: &'a Finder,
        inheritance_info: Option<&'a Inheritance>,
    ) -> impl Fn(&Entity<'_>, &str, &str, &[String]) -> bool + 'a {
        move |e, from, _to, ignore| {
            have_static_dependency_outside_file_and_superclass(
                sd_finder,
                e,
                from,
                inheritance_info,
                ignore,
            )
        }
    }

    #[test]
    fn cluster_strategy_finds_misplaced_entity_with_target() {
        let sd_finder = Finder::new(STATIC_DEPS, None).unwrap();
        let ccd = format!("{M1}\t{M2}\n");
        let ccd_finder = Finder::new(&ccd, None).unwrap();
        let gate = gate(&sd_finder, None);
        let smells = find_smells_using_clusters(&cluster_graph(), &gate, None);
        let smells =
            search_candidates(smells, Some(STATIC_DEPS), &sd_finder, &ccd_finder).unwrap();
        assert_eq!(smells.len(), 1);
        assert_eq!(smells[0].entity, M1);
        assert_eq!(smells[0].target, "C2");
        assert_eq!(smells[0].depcount, 2);
    }

    #[test]
    fn dependency_strategy_keys_smells_by_antecedent() {
        let ccd = format!("{M1} p_C2.java/[CN]/ 2\n");
        let smells = find_smells_using_dependencies(
            &ccd,
            None,
            None,
            DetectionThresholds {
                minimum_support_count: 0,
                minimum_confidence: 0.0,
            },
        )
        .unwrap();
        assert_eq!(smells.len(), 1);
        assert_eq!(smells[0].entity, M1);
        assert_eq!(smells[0].candidates, vec![Candidate {
            name: "C2".to_string(),
            depcount: 0,
        }]);
    }

    #[test]
    fn dependency_strategy_applies_thresholds() {
        let ccd = format!("{M1}\t{M2}\t1\t0.4\n");
        let smells =
            find_smells_using_dependencies(&ccd, None, None, DetectionThresholds::default())
                .unwrap();
        assert!(smells.is_empty());
    }

    #[test]
    fn dependency_strategy_rejects_same_file_and_superclass_antecedents() {
        let same_file = format!("{M1}\tp_C1.java/[CN]/C1/[MT]/m9()\t5\t1.0\n");
        let thresholds = DetectionThresholds::default();
        assert!(
            find_smells_using_dependencies(&same_file, None, None, thresholds)
                .unwrap()
                .is_empty()
        );
        let inh = Inheritance::parse("p_C9.java/[CN]/\tp_C1.java/[CN]/\n").unwrap();
        let from_superclass = format!("{M1}\t{M2}\t5\t1.0\n");
        assert!(
            find_smells_using_dependencies(&from_superclass, None, Some(&inh), thresholds)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn gate_requires_at_least_one_static_dependency() {
        let sd_finder = Finder::new(STATIC_DEPS, None).unwrap();
        // m2 never appears in the static stream
        assert!(!have_static_dependency_outside_file_and_superclass(
            &sd_finder,
            &Entity::new(M2),
            "C2",
            None,
            &[],
        ));
        // m1 is reached from C3 only
        assert!(have_static_dependency_outside_file_and_superclass(
            &sd_finder,
            &Entity::new(M1),
            "C1",
            None,
            &[],
        ));
    }

    #[test]
    fn gate_rejects_same_file_and_superclass_dependencies() {
        let sd_finder = Finder::new(STATIC_DEPS, None).unwrap();
        // m11 depends on m12 inside C1
        assert!(!have_static_dependency_outside_file_and_superclass(
            &sd_finder,
            &Entity::new("p_C1.java/[CN]/C1/[MT]/m11()"),
            "C1",
            None,
            &[],
        ));
        // with C3 marked as a superclass file, m1's only dependency is banned
        let inh = Inheritance::parse("p_X.java/[CN]/\tp_C3.java/[CN]/\n").unwrap();
        assert!(!have_static_dependency_outside_file_and_superclass(
            &sd_finder,
            &Entity::new(M1),
            "C1",
            Some(&inh),
            &[],
        ));
    }

    #[test]
    fn gate_rejects_entities_from_the_error_report() {
        let sd_finder = Finder::new(STATIC_DEPS, Some("m1")).unwrap();
        assert!(!have_static_dependency_outside_file_and_superclass(
            &sd_finder,
            &Entity::new(M1),
            "C1",
            None,
            &[],
        ));
    }

    #[test]
    fn candidate_search_rejects_regressing_moves() {
        // moving m1 to C4 would leave the C3 edge and add a C4 vertex edge
        let static_deps = indoc! {"
            p_C3.java/[CN]/C3/[MT]/m3()\tp_C1.java/[CN]/C1/[MT]/m1()
            p_C1.java/[CN]/C1/[MT]/m1()\tp_C1.java/[CN]/C1/[MT]/m12()
        "};
        let sd_finder = Finder::new(static_deps, None).unwrap();
        let ccd = format!("{M1}\t{M2}\n");
        let ccd_finder = Finder::new(&ccd, None).unwrap();
        let best = find_best_candidate(
            Some(static_deps),
            &Entity::new(M1).query_string(),
            "C1",
            &["C2".to_string()],
            &sd_finder,
            &ccd_finder,
            None,
        )
        .unwrap();
        // moving m1 out of C1 turns the intra-file m1->m12 edge into a new
        // cross-file edge, a regression
        assert_eq!(best, None);
    }

    #[test]
    fn candidate_search_keeps_first_on_ties() {
        let sd_finder = Finder::new("", None).unwrap();
        let ccd = format!("{M1}\t{M2}\n");
        let ccd_finder = Finder::new(&ccd, None).unwrap();
        let best = find_best_candidate(
            None,
            &Entity::new(M1).query_string(),
            "C1",
            &["C5".to_string(), "C6".to_string()],
            &sd_finder,
            &ccd_finder,
            None,
        )
        .unwrap();
        assert_eq!(best, Some(("C5".to_string(), 0)));
    }

    #[test]
    fn merge_replaces_equal_entity_and_target() {
        let mut merged = vec![Smell {
            entity: M1.to_string(),
            target: "C2".to_string(),
            depcount: 1,
            candidates: vec![],
        }];
        merge_smells(
            &mut merged,
            vec![Smell {
                entity: M1.to_string(),
                target: "C2".to_string(),
                depcount: 2,
                candidates: vec![],
            }],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].depcount, 2);
    }

    #[test]
    fn display_round_trips_entity_and_target() {
        let smell = Smell {
            entity: M1.to_string(),
            target: "C2".to_string(),
            depcount: 2,
            candidates: vec![Candidate {
                name: "C2".to_string(),
                depcount: 2,
            }],
        };
        assert_eq!(
            smell.to_string(),
            format!("{M1} -> C2 (depcount: 2, candidates: [C2:2])")
        );
    }
}
