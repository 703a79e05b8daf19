//! Before/after quality scoring of proposed reassignment passes.
//!
//! The full metric vector is computed once for the unmodified models and
//! once per reassignment pass; each metric is reported as the after/before
//! ratio (1 when the baseline is 0) together with fixed linear composite
//! scores. The merged static plus co-change variants carry a `2` suffix
//! and are sign-inverted at the end so that larger is uniformly better.

use std::collections::BTreeMap;

use crate::analysis::field_types::FieldTypes;
use crate::analysis::finder::Finder;
use crate::analysis::graph::{DependencyGraph, Reassignments};
use crate::analysis::inheritance::Inheritance;
use crate::analysis::structure::Structure;
use crate::core::errors::Result;
use crate::metrics;

/// Metric name to value. `BTreeMap` keeps the report order stable.
pub type MetricVector = BTreeMap<&'static str, f64>;

/// The full metric vector over the static graph, the merged graph, and
/// the structural models.
pub fn measure(
    static_graph: &DependencyGraph,
    merged_graph: &DependencyGraph,
    structure: &Structure,
    inheritance: Option<&Inheritance>,
    field_types: Option<&FieldTypes>,
    sd_finder: &Finder,
) -> MetricVector {
    BTreeMap::from([
        (
            "pc",
            metrics::propagation_cost(static_graph.successors()) as f64,
        ),
        (
            "pc2",
            metrics::propagation_cost(merged_graph.successors()) as f64,
        ),
        ("cam", metrics::cam(structure)),
        ("cbo", metrics::cbo(static_graph.successors())),
        ("cbo2", metrics::cbo(merged_graph.successors())),
        ("cis", metrics::cis(structure, sd_finder)),
        ("dam", metrics::dam(structure, sd_finder)),
        ("dsc", metrics::dsc(structure)),
        ("moa", metrics::moa(structure, field_types)),
        (
            "mpc",
            metrics::mpc(static_graph.successors(), static_graph.weights()),
        ),
        (
            "mpc2",
            metrics::mpc(merged_graph.successors(), merged_graph.weights()),
        ),
        ("nom", metrics::nom(structure)),
        ("nop", metrics::nop(structure, inheritance)),
    ])
}

/// Composite score values of an unchanged system, used when reporting
/// improvement deltas.
pub fn composite_baseline() -> MetricVector {
    BTreeMap::from([
        ("reusability", 1.0),
        ("flexibility", 1.0),
        ("understandability", -0.99),
        ("reusability2", 1.0),
        ("flexibility2", 1.0),
        ("understandability2", -0.99),
        ("mpc2", -1.0),
        ("cbo2", -1.0),
        ("pc2", -1.0),
    ])
}

/// Scores each reassignment pass against the unmodified baseline.
///
/// `inputs[0]` is the static dependency stream; the remaining entries are
/// co-change streams merged into the `2`-suffixed graph. Empty passes
/// yield an empty vector.
pub fn improvements(
    reassignment_passes: &[Reassignments],
    inheritance: Option<&Inheritance>,
    field_types: Option<&FieldTypes>,
    sd_finder: &Finder,
    inputs: &[&str],
) -> Result<Vec<MetricVector>> {
    let static_graph = DependencyGraph::build(None, &inputs[..1])?;
    let merged_graph = DependencyGraph::build(None, inputs)?;
    let structure = Structure::build(None, inputs[0])?;
    let before = measure(
        &static_graph,
        &merged_graph,
        &structure,
        inheritance,
        field_types,
        sd_finder,
    );
    let mut result = Vec::with_capacity(reassignment_passes.len());
    for reassignments in reassignment_passes {
        let mut scores = MetricVector::new();
        if reassignments.is_empty() {
            result.push(scores);
            continue;
        }
        let refactored_graph = DependencyGraph::build(Some(reassignments), &inputs[..1])?;
        let refactored_merged = DependencyGraph::build(Some(reassignments), inputs)?;
        let refactored_structure = Structure::build(Some(reassignments), inputs[0])?;
        let after = measure(
            &refactored_graph,
            &refactored_merged,
            &refactored_structure,
            inheritance,
            field_types,
            sd_finder,
        );
        for (&metric, &value) in &after {
            let baseline = before[metric];
            scores.insert(metric, if baseline == 0.0 { 1.0 } else { value / baseline });
        }
        scores.insert(
            "reusability",
            -0.25 * scores["mpc"] + 0.25 * scores["cam"] + 0.5 * scores["cis"]
                + 0.5 * scores["dsc"],
        );
        scores.insert(
            "flexibility",
            0.25 * scores["dam"] - 0.25 * scores["mpc"] + 0.5 * scores["moa"]
                + 0.5 * scores["nop"],
        );
        // the ANA term of the understandability model is fixed at 1
        scores.insert(
            "understandability",
            -0.33 + 0.33 * scores["dam"] - 0.33 * scores["mpc"] + 0.33 * scores["cam"]
                - 0.33 * scores["nop"]
                - 0.33 * scores["nom"]
                - 0.33 * scores["dsc"],
        );
        scores.insert(
            "reusability2",
            -0.25 * scores["mpc2"] + 0.25 * scores["cam"] + 0.5 * scores["cis"]
                + 0.5 * scores["dsc"],
        );
        scores.insert(
            "flexibility2",
            0.25 * scores["dam"] - 0.25 * scores["mpc2"] + 0.5 * scores["moa"]
                + 0.5 * scores["nop"],
        );
        scores.insert(
            "understandability2",
            -0.33 + 0.33 * scores["dam"] - 0.33 * scores["mpc2"] + 0.33 * scores["cam"]
                - 0.33 * scores["nop"]
                - 0.33 * scores["nom"]
                - 0.33 * scores["dsc"],
        );
        scores.insert("mpc2", -scores["mpc2"]);
        scores.insert("cbo2", -scores["cbo2"]);
        scores.insert("pc2", -scores["pc2"]);
        result.push(scores);
    }
    Ok(result)
}
