use anyhow::{bail, Context, Result};
use clap::Parser;
use evomove::cli::{Cli, OutputMode};
use evomove::config::{parse_batch_config, RunConfig};
use evomove::driver::{run_analysis, RunOptions};
use evomove::improvement::composite_baseline;
use evomove::smells::DetectionThresholds;
use std::fs;
use std::path::PathBuf;

const CSV_METRICS: [&str; 6] = [
    "cbo2",
    "mpc2",
    "pc2",
    "reusability2",
    "flexibility2",
    "understandability2",
];

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let configs = build_configs(&cli)?;
    let options = RunOptions {
        search_candidates: cli.output == OutputMode::Suggestions,
        compute_metrics: matches!(
            cli.output,
            OutputMode::Metric | OutputMode::Csv | OutputMode::Json
        ),
        supplemental_refactorings: cli.supplemental_refactorings.clone(),
        thresholds: DetectionThresholds {
            minimum_support_count: cli.minimum_support_count,
            minimum_confidence: cli.minimum_confidence,
        },
        allow_to_depend_on_current_class: cli.allow_to_depend_on_current_class,
    };

    if cli.output == OutputMode::Csv {
        println!("subject;sc;ec;sdc;ccdc;cd;cboo;mpco;pco;ro;fo;uo;cbow;mpcw;pcw;rw;fw;uw");
    }
    let last = configs.len().saturating_sub(1);
    for (i, cfg) in configs.iter().enumerate() {
        let outcome = run_analysis(cfg, &options)?;
        match cli.output {
            OutputMode::Json => {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
            OutputMode::Metric => {
                for pass in &outcome.improvements {
                    println!("{}", serde_json::to_string(pass)?);
                }
            }
            OutputMode::Csv => {
                print_csv_row(&subject(cfg, &cli), &outcome);
            }
            OutputMode::Count => {
                let count = outcome.smell_lists.first().map_or(0, Vec::len);
                println!("{}: {count}", subject(cfg, &cli));
            }
            OutputMode::Smells | OutputMode::Suggestions => {
                println!("{}", subject(cfg, &cli));
                for smell in outcome.smell_lists.first().into_iter().flatten() {
                    println!("{smell}");
                }
                if i < last {
                    println!();
                }
            }
        }
    }
    Ok(())
}

/// One run per batch configuration line, or a single run assembled from
/// the command line arguments.
fn build_configs(cli: &Cli) -> Result<Vec<RunConfig>> {
    if let Some(config_file) = &cli.config {
        let text = fs::read_to_string(config_file)
            .with_context(|| format!("could not read config {}", config_file.display()))?;
        return Ok(parse_batch_config(&text));
    }
    let (Some(static_mdg), Some(cochange_mdg), Some(errors_file)) =
        (&cli.static_mdg, &cli.cochange_mdg, &cli.errors_file)
    else {
        bail!(
            "usage: evomove <static mdg file> <co-change mdg file> <errors file> \
             [<inheritance> <field types>]"
        );
    };
    let dot_files = match &cli.dot_dir {
        Some(dir) => {
            let mut files: Vec<PathBuf> = fs::read_dir(dir)
                .with_context(|| format!("could not read dot dir {}", dir.display()))?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<_>>()?;
            files.sort();
            files
        }
        None => cli.dot_file.iter().cloned().collect(),
    };
    Ok(vec![RunConfig {
        dot_files,
        static_mdg: static_mdg.clone(),
        cochange_mdg: cochange_mdg.clone(),
        errors_file: errors_file.clone(),
        inheritance_file: cli.inheritance_file.clone(),
        field_types_file: cli.field_types_file.clone(),
        supplemental_refactorings: Vec::new(),
        smells: cli.smells.clone(),
    }])
}

fn subject(cfg: &RunConfig, cli: &Cli) -> String {
    if let Some(dir) = &cli.dot_dir {
        dir.display().to_string()
    } else if let Some(first) = cfg.dot_files.first() {
        first.display().to_string()
    } else {
        String::new()
    }
}

/// One row per run: attributes, then the first two passes' metric deltas
/// against the unchanged-system baseline.
fn print_csv_row(subject: &str, outcome: &evomove::driver::AnalysisOutcome) {
    let attrs = &outcome.attributes;
    print!(
        "{subject};{};{};{};{};{};",
        outcome.smell_lists.first().map_or(0, Vec::len),
        attrs.entities_count,
        attrs.static_dependencies_count,
        attrs.cochange_dependencies_count,
        attrs.clusters_density,
    );
    let baseline = composite_baseline();
    for pass_index in 0..2 {
        for (j, metric) in CSV_METRICS.iter().enumerate() {
            let change = outcome
                .improvements
                .get(pass_index)
                .map(|pass| pass.get(metric).copied().unwrap_or(0.0) - baseline[metric]);
            if let Some(change) = change {
                print!("{change}");
            }
            if pass_index != 1 || j < CSV_METRICS.len() - 1 {
                print!(";");
            }
        }
    }
    println!();
}
