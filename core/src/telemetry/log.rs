use log::{info, warn};

use crate::processing::parameters::GluingWindow;
use crate::processing::window_search::SelectionOutcome;

pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    /// Log the chosen window; degenerate or non-finite windows are warnings.
    pub fn record_window(&self, window: &GluingWindow, outcome: &SelectionOutcome) {
        if outcome.is_degenerate() {
            warn!(
                "degenerate correlation grid, using sentinel window [{}, {})",
                window.bin_low, window.bin_high
            );
        }
        if !window.is_finite() {
            warn!(
                "non-finite normalization factor {} in window [{}, {})",
                window.norm_factor, window.bin_low, window.bin_high
            );
            return;
        }
        self.record(&format!(
            "gluing window [{}, {}) norm {:.4} ({:?})",
            window.bin_low, window.bin_high, window.norm_factor, outcome
        ));
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
