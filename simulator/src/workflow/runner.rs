use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use gluecore::interface::{GluedRecord, ProfilePayload};
use gluecore::prelude::{ProcessingStage, StageOutput};
use gluecore::processing::{glue_batch, GluingStage, GluingWindow, SelectionOutcome};
use gluecore::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use serde::Serialize;

/// Per-profile summary written to the report.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub channel: String,
    pub timestamp: f64,
    pub window: GluingWindow,
    pub outcome: SelectionOutcome,
    pub corr_coef: f64,
    pub snr_nf: f64,
    pub valid: bool,
}

impl From<&GluedRecord> for RecordSummary {
    fn from(record: &GluedRecord) -> Self {
        Self {
            channel: record.channel.clone(),
            timestamp: record.timestamp,
            window: record.window,
            outcome: record.outcome,
            corr_coef: record.corr_coef,
            snr_nf: record.snr_nf,
            valid: record.is_valid(),
        }
    }
}

pub struct WorkflowResult {
    pub records: Vec<GluedRecord>,
    pub failures: Vec<String>,
    pub metrics: MetricsSnapshot,
}

impl WorkflowResult {
    pub fn summaries(&self) -> Vec<RecordSummary> {
        self.records.iter().map(RecordSummary::from).collect()
    }
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Glue a single profile pair through the stage interface.
    pub fn execute_one(&self, payload: &ProfilePayload) -> anyhow::Result<StageOutput> {
        let mut stage = GluingStage::new();
        stage
            .initialize(&self.config.glue)
            .context("initializing gluing stage")?;
        let output = stage.execute(payload.to_stage_input()).with_context(|| {
            format!(
                "gluing {} at t={}",
                payload.ancillary.channel, payload.ancillary.timestamp
            )
        })?;
        stage.cleanup();
        Ok(output)
    }

    /// Glue every profile pair; failures are collected rather than aborting the run.
    pub fn execute(&self, payloads: &[ProfilePayload]) -> WorkflowResult {
        let metrics = MetricsRecorder::new();
        let logger = LogManager::new();
        let mut records = Vec::with_capacity(payloads.len());
        let mut failures = Vec::new();

        for (payload, result) in payloads.iter().zip(glue_batch(&self.config.glue, payloads)) {
            match result {
                Ok(record) => {
                    metrics.record_glued(&record);
                    records.push(record);
                }
                Err(err) => {
                    metrics.record_error();
                    failures.push(format!(
                        "{} at t={}: {}",
                        payload.ancillary.channel, payload.ancillary.timestamp, err
                    ));
                }
            }
        }

        let metrics = metrics.snapshot();
        logger.record(&format!(
            "glued {} profiles ({} relaxed, {} degenerate, {} errors)",
            metrics.glued, metrics.relaxed, metrics.degenerate, metrics.errors
        ));

        WorkflowResult {
            records,
            failures,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_profile_payloads, GeneratorConfig};

    fn config(range_bins: usize) -> WorkflowConfig {
        let generator = GeneratorConfig {
            range_bins,
            time_steps: 3,
            seed: 5,
            ..Default::default()
        };
        WorkflowConfig::from_args(80, 0.75, 5.0, generator)
    }

    #[test]
    fn runner_glues_every_profile() {
        let cfg = config(512);
        let runner = Runner::new(cfg.clone());
        let payloads = build_profile_payloads(&cfg.generator).unwrap();
        let result = runner.execute(&payloads);

        assert!(result.failures.is_empty());
        assert_eq!(result.records.len(), payloads.len());
        assert_eq!(result.metrics.glued, payloads.len());
        for record in &result.records {
            assert_eq!(record.samples.len(), 512);
            assert!(record.window.bin_high - record.window.bin_low >= 20);
        }
        assert_eq!(result.summaries().len(), payloads.len());
    }

    #[test]
    fn runner_collects_failures_for_short_profiles() {
        let cfg = config(100);
        let runner = Runner::new(cfg.clone());
        let payloads = build_profile_payloads(&cfg.generator).unwrap();
        let result = runner.execute(&payloads);

        assert!(result.records.is_empty());
        assert_eq!(result.failures.len(), payloads.len());
        assert_eq!(result.metrics.errors, payloads.len());
        assert!(result.failures[0].contains("insufficient data"));
    }

    #[test]
    fn stage_and_batch_paths_agree() {
        let cfg = config(400);
        let runner = Runner::new(cfg.clone());
        let payloads = build_profile_payloads(&cfg.generator).unwrap();
        let staged = runner.execute_one(&payloads[0]).unwrap();
        let batch = runner.execute(&payloads[..1]);
        assert_eq!(staged.samples, batch.records[0].samples);
        assert_eq!(staged.metadata.window, Some(batch.records[0].window));
    }
}
