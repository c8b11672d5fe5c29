use serde::{Deserialize, Serialize};

use crate::interface::profile::ProfileAncillary;
use crate::processing::gluing::GluedProfile;
use crate::processing::parameters::GluingWindow;
use crate::processing::window_search::SelectionOutcome;

/// Glued profile tagged with the channel and time-step it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GluedRecord {
    pub channel: String,
    pub timestamp: f64,
    pub window: GluingWindow,
    pub outcome: SelectionOutcome,
    pub corr_coef: f64,
    pub snr_nf: f64,
    pub samples: Vec<f64>,
}

impl GluedRecord {
    pub fn new(ancillary: &ProfileAncillary, profile: GluedProfile) -> Self {
        Self {
            channel: ancillary.channel.clone(),
            timestamp: ancillary.timestamp,
            window: profile.window,
            outcome: profile.selection.outcome,
            corr_coef: profile.selection.corr_coef,
            snr_nf: profile.selection.snr_nf,
            samples: profile.samples,
        }
    }

    /// True when every glued sample is finite and usable downstream.
    pub fn is_valid(&self) -> bool {
        self.window.is_finite() && self.samples.iter().all(|v| v.is_finite())
    }
}
