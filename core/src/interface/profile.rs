use serde::{Deserialize, Serialize};

use crate::prelude::StageInput;

/// Identifies which channel and time-step a profile pair belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileAncillary {
    pub channel: String,
    pub timestamp: f64,
}

/// Near-range and far-range profiles recorded for one channel at one time-step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePayload {
    pub nf_signal: Vec<f64>,
    pub ff_signal: Vec<f64>,
    pub ancillary: ProfileAncillary,
}

impl ProfilePayload {
    pub fn new(nf_signal: Vec<f64>, ff_signal: Vec<f64>, ancillary: ProfileAncillary) -> Self {
        Self {
            nf_signal,
            ff_signal,
            ancillary,
        }
    }

    pub fn range_bins(&self) -> usize {
        self.ff_signal.len()
    }

    pub fn to_stage_input(&self) -> StageInput {
        StageInput {
            nf_signal: self.nf_signal.clone(),
            ff_signal: self.ff_signal.clone(),
            timestamp: Some(self.ancillary.timestamp),
        }
    }
}
