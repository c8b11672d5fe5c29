use anyhow::Context;
use gluecore::prelude::GlueConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::generator::profile::GeneratorConfig;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    pub glue: GlueConfig,
    pub generator: GeneratorConfig,
    pub report: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        overlap: usize,
        corr_coef_threshold: f64,
        snr_nf_threshold: f64,
        generator: GeneratorConfig,
    ) -> Self {
        Self {
            glue: GlueConfig {
                overlap,
                corr_coef_threshold,
                snr_nf_threshold,
                ..Default::default()
            },
            generator,
            report: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gluecore::prelude::Taper;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_sets_thresholds() {
        let cfg = WorkflowConfig::from_args(100, 0.8, 4.0, GeneratorConfig::default());
        assert_eq!(cfg.glue.overlap, 100);
        assert_eq!(cfg.glue.snr_nf_threshold, 4.0);
        assert_eq!(cfg.glue.taper, Taper::Linear);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"glue:\n  overlap: 90\n  taper:\n    kind: tanh\n    center: 12.0\n    scale: 6.0\n\
generator:\n  range_bins: 512\n  channels: [\"532_total\"]\nreport: out/report.json\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.glue.overlap, 90);
        assert_eq!(cfg.glue.corr_coef_threshold, 0.75);
        assert_eq!(
            cfg.glue.taper,
            Taper::Tanh {
                center: 12.0,
                scale: 6.0
            }
        );
        assert_eq!(cfg.generator.range_bins, 512);
        assert_eq!(cfg.generator.time_steps, 8);
        assert_eq!(cfg.report, Some(PathBuf::from("out/report.json")));
    }

    #[test]
    fn bundled_workflow_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/workflows/pollyxt.yaml");
        let cfg = WorkflowConfig::load(path).unwrap();
        assert_eq!(cfg.glue, GlueConfig::default());
        assert_eq!(cfg.generator.channels.len(), 5);
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = WorkflowConfig::load("/nonexistent/workflow.yaml").unwrap_err();
        assert!(err.to_string().contains("reading workflow config"));
    }
}
