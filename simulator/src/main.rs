use anyhow::Context;
use clap::Parser;
use generator::profile::{build_profile_payloads, GeneratorConfig};
use gluecore::prelude::{DEFAULT_CORR_COEF_THRESHOLD, DEFAULT_OVERLAP, DEFAULT_SNR_NF_THRESHOLD};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Glue synthetic near/far-range lidar profiles")]
struct Args {
    /// Load a workflow config from YAML (overrides the flags below)
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_OVERLAP)]
    overlap: usize,
    #[arg(long, default_value_t = DEFAULT_CORR_COEF_THRESHOLD)]
    corr_threshold: f64,
    #[arg(long, default_value_t = DEFAULT_SNR_NF_THRESHOLD)]
    snr_threshold: f64,
    /// Comma-separated channel names
    #[arg(long, value_delimiter = ',')]
    channels: Option<Vec<String>>,
    #[arg(long, default_value_t = 8)]
    time_steps: usize,
    #[arg(long, default_value_t = 1024)]
    range_bins: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write a JSON summary of every glued window
    #[arg(long)]
    report: Option<PathBuf>,
    /// Print the stage notes for the profile at this index
    #[arg(long)]
    inspect: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        let defaults = GeneratorConfig::default();
        let generator = GeneratorConfig {
            channels: args.channels.unwrap_or_else(|| defaults.channels.clone()),
            time_steps: args.time_steps,
            range_bins: args.range_bins,
            seed: args.seed,
            ..defaults
        };
        WorkflowConfig::from_args(
            args.overlap,
            args.corr_threshold,
            args.snr_threshold,
            generator,
        )
    };
    if args.report.is_some() {
        workflow_config.report = args.report;
    }

    let payloads = build_profile_payloads(&workflow_config.generator)
        .context("building synthetic profiles")?;
    let runner = Runner::new(workflow_config.clone());

    if let Some(index) = args.inspect {
        let payload = payloads
            .get(index)
            .with_context(|| format!("no profile at index {} ({} built)", index, payloads.len()))?;
        let output = runner.execute_one(payload)?;
        println!(
            "{} t={}s -> {}",
            payload.ancillary.channel,
            payload.ancillary.timestamp,
            output.metadata.notes.join("; ")
        );
    }

    let result = runner.execute(&payloads);

    println!(
        "Glued {} / {} profiles -> relaxed {}, degenerate {}, non-finite {}, errors {}",
        result.metrics.glued,
        payloads.len(),
        result.metrics.relaxed,
        result.metrics.degenerate,
        result.metrics.non_finite,
        result.metrics.errors
    );
    for failure in &result.failures {
        log::error!("{}", failure);
    }

    if let Some(report_path) = workflow_config.report.as_ref() {
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let report = json!({
            "config": workflow_config.glue,
            "metrics": result.metrics,
            "records": result.summaries(),
            "failures": result.failures,
        });
        let contents = serde_json::to_string_pretty(&report).context("serializing report")?;
        fs::write(report_path, contents)
            .with_context(|| format!("writing report {}", report_path.display()))?;
        log::info!("report written to {}", report_path.display());
    }

    Ok(())
}
