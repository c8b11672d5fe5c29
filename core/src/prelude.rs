use serde::{Deserialize, Serialize};

use crate::processing::parameters::GluingWindow;
use crate::processing::window_search::SelectionOutcome;

/// First range bin considered when searching for the gluing window.
pub const DEFAULT_OVERLAP: usize = 80;
/// Minimum Pearson correlation a window should reach before the SNR target is relaxed.
pub const DEFAULT_CORR_COEF_THRESHOLD: f64 = 0.75;
/// Initial near-range SNR target for the gluing window.
pub const DEFAULT_SNR_NF_THRESHOLD: f64 = 5.0;

/// Cross-fade applied across the gluing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Taper {
    /// Near-range weight falls linearly from 1 to 0.
    #[default]
    Linear,
    /// Sigmoid cross-fade, min-max normalised over the window.
    Tanh { center: f64, scale: f64 },
}

/// Parameters shared by every gluing invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlueConfig {
    pub overlap: usize,
    pub corr_coef_threshold: f64,
    pub snr_nf_threshold: f64,
    pub taper: Taper,
}

impl Default for GlueConfig {
    fn default() -> Self {
        Self {
            overlap: DEFAULT_OVERLAP,
            corr_coef_threshold: DEFAULT_CORR_COEF_THRESHOLD,
            snr_nf_threshold: DEFAULT_SNR_NF_THRESHOLD,
            taper: Taper::Linear,
        }
    }
}

/// Input payload for a gluing stage: one channel at one time-step.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub nf_signal: Vec<f64>,
    pub ff_signal: Vec<f64>,
    pub timestamp: Option<f64>,
}

/// Output produced by a gluing stage.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub samples: Vec<f64>,
    pub metadata: StageMetadata,
}

/// Metadata used for reporting and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub window: Option<GluingWindow>,
    pub outcome: Option<SelectionOutcome>,
    pub notes: Vec<String>,
}

/// Common error type for gluing.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GlueError {
    #[error("length mismatch: near-range has {nf} bins, far-range has {ff}")]
    LengthMismatch { nf: usize, ff: usize },
    /// Input shorter than the candidate grid reaches. `needed` is
    /// `overlap + 65`: 25 base offsets past `overlap` plus the widest
    /// window of 40 bins.
    #[error("insufficient data: need at least {needed} bins, got {got}")]
    InsufficientData { needed: usize, got: usize },
    #[error("invalid window [{bin_low}, {bin_high}) for a signal of {len} bins")]
    InvalidWindow {
        bin_low: usize,
        bin_high: usize,
        len: usize,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type GlueResult<T> = Result<T, GlueError>;

/// Trait describing a pipeline stage driven by an external orchestrator.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &GlueConfig) -> GlueResult<()>;
    fn execute(&mut self, input: StageInput) -> GlueResult<StageOutput>;
    fn cleanup(&mut self);
}
