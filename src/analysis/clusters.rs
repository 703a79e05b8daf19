//! Cluster assignments produced by an external clustering tool.
//!
//! The core consumes an already parsed graph of named subgraphs; only the
//! subgraphs whose name is prefixed `cluster` carry cluster semantics, as
//! in graphviz. Members are entity-name strings.

use indexmap::IndexSet;

use crate::core::entity::Entity;

use super::finder::Finder;

#[derive(Debug, Clone)]
pub struct Cluster {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClusterGraph {
    clusters: Vec<Cluster>,
}

impl ClusterGraph {
    /// Keeps the subgraphs named with the `cluster` prefix.
    pub fn new(subgraphs: Vec<Cluster>) -> Self {
        ClusterGraph {
            clusters: subgraphs
                .into_iter()
                .filter(|c| c.name.starts_with("cluster"))
                .collect(),
        }
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }
}

/// Average intra-cluster co-change density.
///
/// Per cluster with at least two distinct entities, the number of co-change
/// dependencies staying inside the cluster over the `n * (n - 1)` possible
/// ordered pairs; averaged over the number of clusters in the graph.
pub fn density(cluster_graph: &ClusterGraph, ccd_finder: &Finder) -> f64 {
    if cluster_graph.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0;
    for cluster in cluster_graph.clusters() {
        let entities: IndexSet<String> = cluster
            .members
            .iter()
            .map(|m| Entity::new(m).query_string())
            .collect();
        if entities.len() <= 1 {
            continue;
        }
        let mut count = 0usize;
        for member in &entities {
            let Some(deps) = ccd_finder.dependencies_of(&Entity::new(member)) else {
                continue;
            };
            for d in &deps.outcome {
                if entities.contains(&Entity::new(d).query_string()) {
                    count += 1;
                }
            }
        }
        sum += count as f64 / (entities.len() * (entities.len() - 1)) as f64;
    }
    sum / cluster_graph.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const M1: &str = "p_C1.java/[CN]/C1/[MT]/m1()";
    const M2: &str = "p_C2.java/[CN]/C2/[MT]/m2()";
    const M3: &str = "p_C3.java/[CN]/C3/[MT]/m3()";

    fn cluster(name: &str, members: &[&str]) -> Cluster {
        Cluster {
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn keeps_only_cluster_prefixed_subgraphs() {
        let cg = ClusterGraph::new(vec![
            cluster("cluster1", &[M1, M2]),
            cluster("legend", &[M3]),
        ]);
        assert_eq!(cg.len(), 1);
        assert_eq!(cg.clusters()[0].name, "cluster1");
    }

    #[test]
    fn density_counts_intra_cluster_cochanges() {
        let ccd = Finder::new(&format!("{M1}\t{M2}\n{M1}\t{M3}\n"), None).unwrap();
        let cg = ClusterGraph::new(vec![cluster("cluster1", &[M1, M2])]);
        // one of m1's co-changes stays inside the two-entity cluster
        assert_eq!(density(&cg, &ccd), 0.5);
    }

    #[test]
    fn singleton_clusters_and_empty_graphs_have_zero_density() {
        let ccd = Finder::new("", None).unwrap();
        assert_eq!(density(&ClusterGraph::default(), &ccd), 0.0);
        let cg = ClusterGraph::new(vec![cluster("cluster1", &[M1])]);
        assert_eq!(density(&cg, &ccd), 0.0);
    }
}
