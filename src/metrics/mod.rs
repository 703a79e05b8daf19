//! Object-oriented design metrics over the derived models.
//!
//! Every function is a pure read of its inputs. Metrics that average over
//! files or vertices return 0 for empty inputs instead of faulting, since
//! partial real-world dependency data is expected.

use std::collections::HashSet;

use crate::analysis::field_types::{self, FieldTypes};
use crate::analysis::finder::Finder;
use crate::analysis::inheritance::Inheritance;
use crate::analysis::structure::Structure;

/// Coupling between objects: non-self edges per vertex.
pub fn cbo(adjacency: &[Vec<usize>]) -> f64 {
    if adjacency.is_empty() {
        return 0.0;
    }
    let count: usize = adjacency
        .iter()
        .enumerate()
        .map(|(i, successors)| successors.iter().filter(|&&s| s != i).count())
        .sum();
    count as f64 / adjacency.len() as f64
}

/// Message passing coupling: summed non-self edge weights per vertex.
pub fn mpc(adjacency: &[Vec<usize>], weights: &[Vec<u32>]) -> f64 {
    if adjacency.is_empty() {
        return 0.0;
    }
    let mut sum = 0u64;
    for (i, successors) in adjacency.iter().enumerate() {
        for (j, &succ) in successors.iter().enumerate() {
            if succ != i {
                sum += u64::from(weights[i][j]);
            }
        }
    }
    sum as f64 / adjacency.len() as f64
}

/// Propagation cost: the number of ordered reachable vertex pairs.
///
/// Computes a Boolean transitive closure by one depth-first traversal per
/// vertex; O(V * (V + E)) and by far the most expensive operation here.
/// Callers must not invoke it per candidate in a tight loop.
pub fn propagation_cost(adjacency: &[Vec<usize>]) -> usize {
    let n = adjacency.len();
    let mut closure = vec![vec![false; n]; n];
    for start in 0..n {
        dfs(adjacency, &mut closure, start, start);
    }
    let mut cost = 0;
    for (i, row) in closure.iter().enumerate() {
        for (j, &reachable) in row.iter().enumerate() {
            if i != j && reachable {
                cost += 1;
            }
        }
    }
    cost
}

fn dfs(adjacency: &[Vec<usize>], closure: &mut [Vec<bool>], start: usize, vertex: usize) {
    closure[start][vertex] = true;
    for &next in &adjacency[vertex] {
        if !closure[start][next] {
            dfs(adjacency, closure, start, next);
        }
    }
}

/// Cohesion among methods: the per-method share of the file's parameter
/// type vocabulary, averaged per file and then over files.
pub fn cam(structure: &Structure) -> f64 {
    let files = structure.files();
    if files.is_empty() {
        return 0.0;
    }
    let mut result = 0.0;
    for file in files {
        let all_types: HashSet<&str> = structure
            .methods(file)
            .iter()
            .flat_map(|m| m.parameters.iter().map(String::as_str))
            .collect();
        if all_types.is_empty() {
            continue;
        }
        let methods = structure.methods(file);
        let sum: f64 = methods
            .iter()
            .map(|m| {
                let own: HashSet<&str> = m.parameters.iter().map(String::as_str).collect();
                own.len() as f64 / all_types.len() as f64
            })
            .sum();
        if !methods.is_empty() {
            result += sum / methods.len() as f64;
        }
    }
    result / files.len() as f64
}

/// Class interface size: average count of methods reachable from outside
/// their own file.
pub fn cis(structure: &Structure, finder: &Finder) -> f64 {
    let files = structure.files();
    if files.is_empty() {
        return 0.0;
    }
    let sum: usize = files
        .iter()
        .map(|f| structure.public_methods_count(f, finder))
        .sum();
    sum as f64 / files.len() as f64
}

/// Data access metric: average fraction of methods that are not public,
/// skipping files without methods.
pub fn dam(structure: &Structure, finder: &Finder) -> f64 {
    let files = structure.files();
    if files.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0;
    for file in files {
        let method_count = structure.methods(file).len() as f64;
        if method_count == 0.0 {
            continue;
        }
        let public = structure.public_methods_count(file, finder) as f64;
        sum += (method_count - public) / method_count;
    }
    sum / files.len() as f64
}

/// Design size in classes: the distinct file count.
pub fn dsc(structure: &Structure) -> f64 {
    structure.files().len() as f64
}

/// Measure of aggregation: average count of distinct field types per file.
/// Fields without type information share the empty-type bucket, which
/// still counts as one.
pub fn moa(structure: &Structure, field_types: Option<&FieldTypes>) -> f64 {
    let files = structure.files();
    if files.is_empty() {
        return 0.0;
    }
    let sum: usize = files
        .iter()
        .map(|file| {
            structure
                .fields(file)
                .iter()
                .map(|field| field_types::type_of(field_types, field))
                .collect::<HashSet<_>>()
                .len()
        })
        .sum();
    sum as f64 / files.len() as f64
}

/// Number of methods, averaged per file.
pub fn nom(structure: &Structure) -> f64 {
    let files = structure.files();
    if files.is_empty() {
        return 0.0;
    }
    let sum: usize = files.iter().map(|f| structure.methods(f).len()).sum();
    sum as f64 / files.len() as f64
}

/// Number of polymorphic methods: signature matches along each
/// (subclass, superclass) edge, averaged over the file count.
pub fn nop(structure: &Structure, inheritance: Option<&Inheritance>) -> f64 {
    let files = structure.files();
    if files.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0;
    if let Some(inh) = inheritance {
        for pair in inh.outbound_list() {
            let child = inh.file(pair[0]);
            let parent = inh.file(pair[1]);
            for child_method in structure.methods(&child) {
                for parent_method in structure.methods(&parent) {
                    if child_method.signature() == parent_method.signature() {
                        sum += 1.0;
                    }
                }
            }
        }
    }
    sum / files.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::field_types::FieldTypes;
    use crate::analysis::graph::DependencyGraph;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn cbo_counts_non_self_edges_per_vertex() {
        // records {A->B, C->D} over four distinct files
        let adjacency = vec![vec![1], vec![], vec![3], vec![]];
        assert_eq!(cbo(&adjacency), 0.5);
        assert_eq!(cbo(&[]), 0.0);
    }

    #[test]
    fn mpc_sums_weights() {
        let adjacency = vec![vec![1], vec![]];
        let weights = vec![vec![3], vec![]];
        assert_eq!(mpc(&adjacency, &weights), 1.5);
        assert_eq!(mpc(&[], &[]), 0.0);
    }

    #[test]
    fn propagation_cost_counts_reachable_pairs() {
        // chain 0 -> 1 -> 2
        let chain = vec![vec![1], vec![2], vec![]];
        assert_eq!(propagation_cost(&chain), 3);
        // a cycle reaches everything
        let cycle = vec![vec![1], vec![2], vec![0]];
        assert_eq!(propagation_cost(&cycle), 6);
    }

    #[test]
    fn propagation_cost_is_monotonic_under_edge_addition() {
        let mut adjacency = vec![vec![1], vec![], vec![], vec![]];
        let mut previous = propagation_cost(&adjacency);
        for (from, to) in [(1usize, 2usize), (2, 3), (3, 0)] {
            adjacency[from].push(to);
            let next = propagation_cost(&adjacency);
            assert!(next >= previous);
            previous = next;
        }
    }

    fn structure_of(stream: &str) -> Structure {
        Structure::build(None, stream).unwrap()
    }

    const STREAM: &str = indoc! {"
        p_C1.java/[CN]/C1/[MT]/m1(int)\tp_C2.java/[CN]/C2/[MT]/m2(String,int)
        p_C3.java/[CN]/C3/[MT]/m3()\tp_C1.java/[CN]/C1/[MT]/m1(int)
        p_C1.java/[CN]/C1/[MT]/m1(int)\tp_C2.java/[CN]/C2/[FE]/counter
    "};

    #[test]
    fn cam_averages_parameter_type_cohesion() {
        let s = structure_of(STREAM);
        // C1: one vocabulary type, every method uses it -> 1
        // C2: m2 uses both of its two types -> 1
        // C3: no parameter types -> skipped
        assert_eq!(cam(&s), 2.0 / 3.0);
    }

    #[test]
    fn cis_and_dam_split_public_from_hidden() {
        let s = structure_of(STREAM);
        let f = Finder::new(STREAM, None).unwrap();
        // C1's m1 entries are called from C3, C2's m2 from C1, C3's m3 never
        let public = cis(&s, &f);
        assert!(public > 0.0);
        let hidden = dam(&s, &f);
        assert!((0.0..=1.0).contains(&hidden));
        // C1 methods are all public, C2's single method is public, C3's not
        assert_eq!(hidden, 1.0 / 3.0);
    }

    #[test]
    fn dsc_counts_distinct_files() {
        assert_eq!(dsc(&structure_of(STREAM)), 3.0);
    }

    #[test]
    fn moa_counts_distinct_field_type_buckets() {
        let s = structure_of(STREAM);
        assert_eq!(moa(&s, None), 1.0 / 3.0);
        let ft =
            FieldTypes::parse("p_C2.java/[CN]/C2/[FE]/counter\tp_C3.java/[CN]/C3\n").unwrap();
        assert_eq!(moa(&s, Some(&ft)), 1.0 / 3.0);
    }

    #[test]
    fn nom_averages_method_count() {
        let s = structure_of(STREAM);
        // m1 appears three times, m2 and m3 once each
        assert_eq!(nom(&s), 5.0 / 3.0);
    }

    #[test]
    fn nop_matches_signatures_along_inheritance_edges() {
        let stream = indoc! {"
            p_C1.java/[CN]/C1/[MT]/m(int)\tp_C2.java/[CN]/C2/[MT]/other()
            p_C.java/[CN]/C/[MT]/m(int)\tp_C2.java/[CN]/C2/[MT]/other()
        "};
        let s = structure_of(stream);
        let inh = Inheritance::parse("p_C1.java/[CN]/\tp_C.java/[CN]/\n").unwrap();
        // C1.m(int) overrides C.m(int); three files in the structure
        assert_eq!(nop(&s, Some(&inh)), 1.0 / 3.0);
        assert_eq!(nop(&s, None), 0.0);
    }

    #[test]
    fn empty_models_yield_zero() {
        let s = structure_of("");
        let f = Finder::new("", None).unwrap();
        let g = DependencyGraph::build(None, &[""]).unwrap();
        assert_eq!(cam(&s), 0.0);
        assert_eq!(cis(&s, &f), 0.0);
        assert_eq!(dam(&s, &f), 0.0);
        assert_eq!(dsc(&s), 0.0);
        assert_eq!(moa(&s, None), 0.0);
        assert_eq!(nom(&s), 0.0);
        assert_eq!(nop(&s, None), 0.0);
        assert_eq!(cbo(g.successors()), 0.0);
        assert_eq!(mpc(g.successors(), g.weights()), 0.0);
        assert_eq!(propagation_cost(g.successors()), 0);
    }
}
