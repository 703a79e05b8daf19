//! Orchestrates one analysis run: loads the inputs, detects smells,
//! refines candidates, and scores the resulting reassignment passes.

use log::info;
use serde::Serialize;

use crate::analysis::clusters;
use crate::analysis::field_types::FieldTypes;
use crate::analysis::finder::Finder;
use crate::analysis::graph::Reassignments;
use crate::analysis::inheritance::Inheritance;
use crate::config::RunConfig;
use crate::core::entity::Entity;
use crate::core::errors::Result;
use crate::improvement::{self, MetricVector};
use crate::io;
use crate::smells::{self, DetectionThresholds, Precondition, Smell};

/// Options shared by every run of a batch.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Refine each smell with the best move target.
    pub search_candidates: bool,
    /// Score reassignment passes against the unmodified baseline.
    pub compute_metrics: bool,
    /// Supplemental refactoring files given on the command line. When
    /// non-empty these take precedence over the per-run configuration.
    pub supplemental_refactorings: Vec<std::path::PathBuf>,
    pub thresholds: DetectionThresholds,
    pub allow_to_depend_on_current_class: bool,
}

/// Aggregate counters of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunAttributes {
    pub entities_count: usize,
    pub static_dependencies_count: usize,
    pub cochange_dependencies_count: usize,
    pub clusters_density: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalysisOutcome {
    /// One smell list per precomputed smells file, or a single merged list
    /// when smells are detected here.
    pub smell_lists: Vec<Vec<Smell>>,
    /// One metric vector per reassignment pass; empty unless metrics were
    /// requested.
    pub improvements: Vec<MetricVector>,
    pub attributes: RunAttributes,
}

pub fn run_analysis(cfg: &RunConfig, options: &RunOptions) -> Result<AnalysisOutcome> {
    let mut cluster_graphs = Vec::new();
    for dot_file in &cfg.dot_files {
        let text = io::read_input(dot_file)?;
        cluster_graphs.push(io::parse_cluster_graph(&text));
    }
    let static_input = io::read_input(&cfg.static_mdg)?;
    let cochange_input = io::read_input(&cfg.cochange_mdg)?;
    let error_report = io::read_input(&cfg.errors_file)?;
    let sd_finder = Finder::new(&static_input, Some(&error_report))?;
    let ccd_finder = Finder::new(&cochange_input, None)?;
    let inheritance = match &cfg.inheritance_file {
        Some(path) => Some(Inheritance::parse(&io::read_input(path)?)?),
        None => None,
    };
    info!(
        "loaded {} entities, {} static and {} co-change dependencies",
        sd_finder.entities_count(),
        sd_finder.dependencies_count(),
        ccd_finder.dependencies_count()
    );

    // Optionally relaxed: an entity may keep depending on its current
    // class when the two files are already statically coupled.
    let allow = options.allow_to_depend_on_current_class;
    let precondition = |e: &Entity<'_>, from: &str, to: &str, ignore: &[String]| {
        if allow && from != to && sd_finder.has_dependencies_between_files(from, to) {
            return true;
        }
        smells::have_static_dependency_outside_file_and_superclass(
            &sd_finder,
            e,
            from,
            inheritance.as_ref(),
            ignore,
        )
    };
    let precondition: &Precondition<'_> = &precondition;

    let mut smell_lists = Vec::new();
    if !cfg.smells.is_empty() {
        for path in &cfg.smells {
            smell_lists.push(io::parse_smells_file(&io::read_input(path)?));
        }
    } else if cluster_graphs.is_empty() {
        let found = smells::find_smells_using_dependencies(
            &cochange_input,
            Some(precondition),
            inheritance.as_ref(),
            options.thresholds,
        )?;
        smell_lists.push(refine(found, &static_input, &sd_finder, &ccd_finder, options)?);
    } else {
        let mut merged = Vec::new();
        for cluster_graph in &cluster_graphs {
            let found = smells::find_smells_using_clusters(
                cluster_graph,
                precondition,
                inheritance.as_ref(),
            );
            smells::merge_smells(&mut merged, found);
        }
        smell_lists.push(refine(merged, &static_input, &sd_finder, &ccd_finder, options)?);
    }

    let improvements = if options.compute_metrics {
        let field_types = match &cfg.field_types_file {
            Some(path) => Some(FieldTypes::parse(&io::read_input(path)?)?),
            None => None,
        };
        let supplemental = if options.supplemental_refactorings.is_empty() {
            &cfg.supplemental_refactorings
        } else {
            &options.supplemental_refactorings
        };
        let passes = reassignment_passes(
            &smell_lists,
            supplemental,
            &sd_finder,
            &ccd_finder,
        )?;
        improvement::improvements(
            &passes,
            inheritance.as_ref(),
            field_types.as_ref(),
            &sd_finder,
            &[&static_input, &cochange_input],
        )?
    } else {
        Vec::new()
    };

    let clusters_density = if cluster_graphs.is_empty() {
        0.0
    } else {
        let sum: f64 = cluster_graphs
            .iter()
            .map(|cg| clusters::density(cg, &ccd_finder))
            .sum();
        sum / cluster_graphs.len() as f64
    };

    Ok(AnalysisOutcome {
        smell_lists,
        improvements,
        attributes: RunAttributes {
            entities_count: sd_finder.entities_count(),
            static_dependencies_count: sd_finder.dependencies_count(),
            cochange_dependencies_count: ccd_finder.dependencies_count(),
            clusters_density,
        },
    })
}

fn refine(
    found: Vec<Smell>,
    static_input: &str,
    sd_finder: &Finder,
    ccd_finder: &Finder,
    options: &RunOptions,
) -> Result<Vec<Smell>> {
    if options.search_candidates || options.compute_metrics {
        smells::search_candidates(found, Some(static_input), sd_finder, ccd_finder)
    } else {
        Ok(found)
    }
}

/// One pass per smell list, one per supplemental refactoring file, and,
/// when supplemental files exist, a final pass joining everything.
fn reassignment_passes(
    smell_lists: &[Vec<Smell>],
    supplemental: &[std::path::PathBuf],
    sd_finder: &Finder,
    ccd_finder: &Finder,
) -> Result<Vec<Reassignments>> {
    let mut passes = Vec::new();
    let mut joined = Reassignments::new();
    for smells in smell_lists {
        let mut pass = Reassignments::new();
        for smell in smells {
            if smell.target.is_empty() {
                continue;
            }
            let qs = Entity::new(&smell.entity).query_string();
            pass.insert(qs.clone(), smell.target.clone());
            joined.insert(qs, smell.target.clone());
        }
        passes.push(pass);
    }
    for path in supplemental {
        let input = io::read_input(path)?;
        let pass = io::parse_supplemental_refactorings(&input, sd_finder, ccd_finder)?;
        joined.extend(pass.iter().map(|(k, v)| (k.clone(), v.clone())));
        passes.push(pass);
    }
    if !supplemental.is_empty() {
        passes.push(joined);
    }
    Ok(passes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn base_config(dir: &Path) -> RunConfig {
        let static_mdg = write(
            dir,
            "static.mdg",
            indoc! {"
                p_C1.java/[CN]/C1/[MT]/m1()\tp_C2.java/[CN]/C2/[MT]/m2()
                p_C3.java/[CN]/C3/[MT]/m3()\tp_C1.java/[CN]/C1/[MT]/m1()
            "},
        );
        let cochange_mdg = write(
            dir,
            "cochange.mdg",
            "p_C1.java/[CN]/C1/[MT]/m1()\tp_C2.java/[CN]/C2/[MT]/m2()\t3\t0.9\t2\t5\n",
        );
        let errors_file = write(dir, "errors.txt", "");
        RunConfig {
            static_mdg,
            cochange_mdg,
            errors_file,
            ..RunConfig::default()
        }
    }

    #[test]
    fn dependency_strategy_detects_and_counts() {
        let dir = TempDir::new().unwrap();
        let cfg = base_config(dir.path());
        let options = RunOptions {
            search_candidates: true,
            ..RunOptions::default()
        };
        let outcome = run_analysis(&cfg, &options).unwrap();
        assert_eq!(outcome.smell_lists.len(), 1);
        assert_eq!(outcome.smell_lists[0].len(), 1);
        let smell = &outcome.smell_lists[0][0];
        assert_eq!(smell.entity, "p_C1.java/[CN]/C1/[MT]/m1()");
        assert_eq!(smell.target, "C2");
        assert!(smell.depcount > 0);
        assert_eq!(outcome.attributes.entities_count, 3);
        assert_eq!(outcome.attributes.static_dependencies_count, 2);
        assert_eq!(outcome.attributes.cochange_dependencies_count, 1);
        assert!(outcome.improvements.is_empty());
    }

    #[test]
    fn smells_file_bypasses_detection() {
        let dir = TempDir::new().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.smells = vec![write(
            dir.path(),
            "smells.txt",
            "p_C9.java/[CN]/C9/[MT]/m9() -> C8 (depcount: 1, candidates: [C8:1])\n",
        )];
        let outcome = run_analysis(&cfg, &RunOptions::default()).unwrap();
        assert_eq!(outcome.smell_lists.len(), 1);
        assert_eq!(outcome.smell_lists[0][0].entity, "p_C9.java/[CN]/C9/[MT]/m9()");
        assert_eq!(outcome.smell_lists[0][0].target, "C8");
    }

    #[test]
    fn cluster_strategy_uses_dot_files_and_reports_density() {
        let dir = TempDir::new().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.dot_files = vec![write(
            dir.path(),
            "clusters.dot",
            indoc! {r#"
                digraph {
                    subgraph cluster1 {
                        "p_C1.java/[CN]/C1/[MT]/m1()"
                        "p_C2.java/[CN]/C2/[MT]/m2()"
                    }
                }"#},
        )];
        let outcome = run_analysis(&cfg, &RunOptions::default()).unwrap();
        assert_eq!(outcome.smell_lists.len(), 1);
        // both member files pass the gate, so each contributes its entity
        assert_eq!(outcome.smell_lists[0].len(), 2);
        assert_eq!(outcome.smell_lists[0][0].entity, "p_C1.java/[CN]/C1/[MT]/m1()");
        // m1 co-changes with m2 inside the two-entity cluster
        assert_eq!(outcome.attributes.clusters_density, 0.5);
    }

    #[test]
    fn metrics_mode_scores_one_pass_per_smell_list() {
        let dir = TempDir::new().unwrap();
        let cfg = base_config(dir.path());
        let options = RunOptions {
            compute_metrics: true,
            ..RunOptions::default()
        };
        let outcome = run_analysis(&cfg, &options).unwrap();
        assert_eq!(outcome.improvements.len(), 1);
        let pass = &outcome.improvements[0];
        assert!(pass.contains_key("reusability"));
        assert!(pass.contains_key("understandability2"));
        // moving m1 into C2 removes the only cross-file static edge pair
        assert!(pass["pc"] < 1.0);
    }

    #[test]
    fn supplemental_files_add_passes_and_a_joined_pass() {
        let dir = TempDir::new().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.supplemental_refactorings =
            vec![write(dir.path(), "supplemental.txt", "p.C3.m3();C1\n")];
        let options = RunOptions {
            compute_metrics: true,
            ..RunOptions::default()
        };
        let outcome = run_analysis(&cfg, &options).unwrap();
        // one evolutionary pass, one supplemental pass, one joined pass
        assert_eq!(outcome.improvements.len(), 3);
    }

    #[test]
    fn missing_input_reports_the_path() {
        let dir = TempDir::new().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.static_mdg = dir.path().join("absent.mdg");
        let err = run_analysis(&cfg, &RunOptions::default()).unwrap_err();
        assert!(err.to_string().contains("absent.mdg"));
    }
}
