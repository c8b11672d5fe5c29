use serde::{Deserialize, Serialize};

use crate::prelude::{
    GlueConfig, GlueError, GlueResult, ProcessingStage, StageInput, StageMetadata, StageOutput,
};
use crate::processing::blend::blend_with_taper;
use crate::processing::parameters::{gluing_window_parameters, GluingWindow};
use crate::processing::window_search::{SelectionOutcome, WindowSelection};
use crate::telemetry::log::LogManager;

/// Glued signal together with the window that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GluedProfile {
    pub window: GluingWindow,
    pub selection: WindowSelection,
    pub samples: Vec<f64>,
}

impl GluedProfile {
    pub fn outcome(&self) -> SelectionOutcome {
        self.selection.outcome
    }
}

/// Glue one NR/FR profile pair with the default thresholds and overlap.
pub fn glue(nf_signal: &[f64], ff_signal: &[f64]) -> GlueResult<Vec<f64>> {
    glue_with(&GlueConfig::default(), nf_signal, ff_signal).map(|profile| profile.samples)
}

/// Glue one NR/FR profile pair with explicit settings.
pub fn glue_with(
    config: &GlueConfig,
    nf_signal: &[f64],
    ff_signal: &[f64],
) -> GlueResult<GluedProfile> {
    let (window, selection) = gluing_window_parameters(
        nf_signal,
        ff_signal,
        config.overlap,
        config.corr_coef_threshold,
        config.snr_nf_threshold,
    )?;
    let samples = blend_with_taper(
        nf_signal,
        ff_signal,
        window.norm_factor,
        window.bin_low,
        window.bin_high,
        config.taper,
    )?;

    Ok(GluedProfile {
        window,
        selection,
        samples,
    })
}

/// Pipeline stage wrapping [`glue_with`] for stage-driven orchestrators.
pub struct GluingStage {
    config: Option<GlueConfig>,
    logger: LogManager,
}

impl GluingStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new(),
        }
    }
}

impl Default for GluingStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for GluingStage {
    fn initialize(&mut self, config: &GlueConfig) -> GlueResult<()> {
        if !config.corr_coef_threshold.is_finite() || !config.snr_nf_threshold.is_finite() {
            return Err(GlueError::InvalidInput(
                "gluing thresholds must be finite".into(),
            ));
        }
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: StageInput) -> GlueResult<StageOutput> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| GlueError::Internal("stage not initialized".into()))?;

        let profile = glue_with(config, &input.nf_signal, &input.ff_signal)?;
        let window = profile.window;
        let outcome = profile.outcome();

        self.logger.record_window(&window, &outcome);
        let mut notes = vec![format!(
            "window [{}, {}) norm {:.4}",
            window.bin_low, window.bin_high, window.norm_factor
        )];
        if let SelectionOutcome::Relaxed { steps } = outcome {
            notes.push(format!(
                "snr threshold relaxed {} times to {:.2}",
                steps, profile.selection.final_snr_threshold
            ));
        }

        Ok(StageOutput {
            samples: profile.samples,
            metadata: StageMetadata {
                window: Some(window),
                outcome: Some(outcome),
                notes,
            },
        })
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Taper;
    use crate::processing::window_search::{WindowCandidate, MINIMUM_WINDOW};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn backscatter(len: usize) -> Vec<f64> {
        (0..len)
            .map(|k| 500.0 * (-(k as f64) / 120.0).exp() + 10.0 + 5.0 * (k as f64 * 0.4).sin())
            .collect()
    }

    #[test]
    fn identical_channels_glue_to_far_range() {
        let ff = backscatter(400);
        let profile = glue_with(&GlueConfig::default(), &ff, &ff).unwrap();

        assert!((profile.selection.corr_coef - 1.0).abs() < 1e-9);
        assert!((profile.window.norm_factor - 1.0).abs() < 1e-12);
        assert_eq!(profile.samples.len(), ff.len());
        for (glued, raw) in profile.samples.iter().zip(&ff) {
            assert!((glued - raw).abs() < 1e-9);
        }
    }

    #[test]
    fn scaled_noisy_near_range_recovers_factor() {
        let mut rng = StdRng::seed_from_u64(42);
        let ff = backscatter(400);
        let nf: Vec<f64> = ff
            .iter()
            .map(|v| 0.5 * v + rng.gen_range(-0.5..0.5))
            .collect();

        let profile = glue_with(&GlueConfig::default(), &nf, &ff).unwrap();
        let window = profile.window;
        assert!(window.bin_low >= 80 && window.bin_high <= 400);
        assert!((window.norm_factor - 2.0).abs() < 0.1);

        for i in 0..window.bin_low {
            assert_eq!(profile.samples[i], nf[i] * window.norm_factor);
        }
        for i in window.bin_high..ff.len() {
            assert_eq!(profile.samples[i], ff[i]);
        }
    }

    #[test]
    fn glued_output_preserves_length_and_window_width() {
        let ff = backscatter(600);
        let nf: Vec<f64> = ff.iter().map(|v| v * 0.3 + 1.0).collect();
        let profile = glue_with(&GlueConfig::default(), &nf, &ff).unwrap();
        assert_eq!(profile.samples.len(), 600);
        assert!(profile.window.len() >= MINIMUM_WINDOW);
        assert!(profile.window.bin_high <= 600);
    }

    #[test]
    fn glue_is_deterministic() {
        let ff = backscatter(300);
        let nf: Vec<f64> = ff.iter().map(|v| v * 0.7).collect();
        let first = glue(&nf, &ff).unwrap();
        let second = glue(&nf, &ff).unwrap();
        let first_bits: Vec<u64> = first.iter().map(|v| v.to_bits()).collect();
        let second_bits: Vec<u64> = second.iter().map(|v| v.to_bits()).collect();
        assert_eq!(first_bits, second_bits);
    }

    #[test]
    fn short_profiles_fail_with_bounds_error() {
        let ff = backscatter(144);
        assert!(matches!(
            glue(&ff, &ff),
            Err(GlueError::InsufficientData {
                needed: 145,
                got: 144
            })
        ));
    }

    #[test]
    fn zero_near_range_propagates_non_finite_values() {
        let nf = vec![0.0; 200];
        let ff = backscatter(200);
        let profile = glue_with(&GlueConfig::default(), &nf, &ff).unwrap();
        assert_eq!(profile.selection.candidate, WindowCandidate::SENTINEL);
        assert!(profile.samples[..profile.window.bin_high]
            .iter()
            .all(|v| v.is_nan()));
        assert_eq!(profile.samples[150], ff[150]);
    }

    #[test]
    fn tanh_taper_keeps_edges_exact() {
        let ff = backscatter(300);
        let nf: Vec<f64> = ff.iter().map(|v| v * 0.5).collect();
        let config = GlueConfig {
            taper: Taper::Tanh {
                center: 12.0,
                scale: 6.0,
            },
            ..Default::default()
        };
        let profile = glue_with(&config, &nf, &ff).unwrap();
        let window = profile.window;
        assert_eq!(profile.samples[window.bin_high], ff[window.bin_high]);
        assert_eq!(
            profile.samples[window.bin_low - 1],
            nf[window.bin_low - 1] * window.norm_factor
        );
    }

    #[test]
    fn stage_requires_initialization() {
        let mut stage = GluingStage::new();
        let ff = backscatter(200);
        let input = StageInput {
            nf_signal: ff.clone(),
            ff_signal: ff,
            timestamp: None,
        };
        assert!(matches!(stage.execute(input), Err(GlueError::Internal(_))));
    }

    #[test]
    fn stage_reports_window_metadata() {
        let mut stage = GluingStage::new();
        stage.initialize(&GlueConfig::default()).unwrap();
        let ff = backscatter(300);
        let nf: Vec<f64> = ff.iter().map(|v| v * 0.5).collect();
        let output = stage
            .execute(StageInput {
                nf_signal: nf,
                ff_signal: ff,
                timestamp: Some(12.0),
            })
            .unwrap();

        assert_eq!(output.samples.len(), 300);
        let window = output.metadata.window.unwrap();
        assert!((window.norm_factor - 2.0).abs() < 1e-9);
        assert!(output.metadata.notes[0].starts_with("window ["));
        stage.cleanup();
    }
}
