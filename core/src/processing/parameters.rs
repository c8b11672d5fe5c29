use serde::{Deserialize, Serialize};

use crate::math::stats::StatsHelper;
use crate::prelude::GlueResult;
use crate::processing::window_search::{search_window, WindowSelection};

/// Absolute bin range of the gluing window and the NR-to-FR scale factor.
///
/// `norm_factor` is Inf or NaN when the near-range mean inside the window is
/// zero; callers must validate it before using the glued output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GluingWindow {
    pub bin_low: usize,
    pub bin_high: usize,
    pub norm_factor: f64,
}

impl GluingWindow {
    pub fn len(&self) -> usize {
        self.bin_high - self.bin_low
    }

    pub fn is_empty(&self) -> bool {
        self.bin_high <= self.bin_low
    }

    pub fn is_finite(&self) -> bool {
        self.norm_factor.is_finite()
    }
}

/// Window search followed by normalization-factor estimation.
pub fn gluing_window_parameters(
    nf_signal: &[f64],
    ff_signal: &[f64],
    overlap: usize,
    corr_coef_threshold: f64,
    snr_nf_threshold: f64,
) -> GlueResult<(GluingWindow, WindowSelection)> {
    let selection = search_window(
        nf_signal,
        ff_signal,
        overlap,
        corr_coef_threshold,
        snr_nf_threshold,
    )?;
    let (bin_low, bin_high) = selection.candidate.bounds(overlap);
    let norm_factor = StatsHelper::mean(&ff_signal[bin_low..bin_high])
        / StatsHelper::mean(&nf_signal[bin_low..bin_high]);

    Ok((
        GluingWindow {
            bin_low,
            bin_high,
            norm_factor,
        },
        selection,
    ))
}

/// `(bin_low, bin_high, norm_factor)` for a pair of profiles.
pub fn compute(
    nf_signal: &[f64],
    ff_signal: &[f64],
    overlap: usize,
    corr_coef_threshold: f64,
    snr_nf_threshold: f64,
) -> GlueResult<(usize, usize, f64)> {
    let (window, _) = gluing_window_parameters(
        nf_signal,
        ff_signal,
        overlap,
        corr_coef_threshold,
        snr_nf_threshold,
    )?;
    Ok((window.bin_low, window.bin_high, window.norm_factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::window_search::{SelectionOutcome, MINIMUM_WINDOW};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn decaying_profile(len: usize) -> Vec<f64> {
        (0..len)
            .map(|k| 1000.0 * (-(k as f64) / 150.0).exp() + 20.0 * (k as f64 * 0.21).sin())
            .collect()
    }

    #[test]
    fn norm_factor_recovers_channel_ratio() {
        let mut rng = StdRng::seed_from_u64(7);
        let ff = decaying_profile(400);
        let nf: Vec<f64> = ff
            .iter()
            .map(|v| 0.5 * v + rng.gen_range(-1.0..1.0))
            .collect();

        let (bin_low, bin_high, norm_factor) = compute(&nf, &ff, 80, 0.75, 5.0).unwrap();
        assert!(bin_low >= 80 && bin_high <= 400);
        assert!(bin_high - bin_low >= MINIMUM_WINDOW);
        assert!((norm_factor - 2.0).abs() < 0.1, "norm factor {}", norm_factor);
    }

    #[test]
    fn window_bounds_track_candidate() {
        let ff = decaying_profile(300);
        let nf: Vec<f64> = ff.iter().map(|v| v * 0.25).collect();
        let (window, selection) = gluing_window_parameters(&nf, &ff, 90, 0.75, 5.0).unwrap();
        assert_eq!(window.bin_low, 90 + selection.candidate.row);
        assert_eq!(window.len(), MINIMUM_WINDOW + selection.candidate.col);
        assert!((window.norm_factor - 4.0).abs() < 1e-9);
    }

    #[test]
    fn zero_near_range_mean_yields_non_finite_factor() {
        let nf = vec![0.0; 200];
        let ff: Vec<f64> = (0..200).map(|k| 5.0 + k as f64).collect();
        let (window, selection) = gluing_window_parameters(&nf, &ff, 80, 0.75, 5.0).unwrap();
        assert_eq!(selection.outcome, SelectionOutcome::Degenerate);
        assert_eq!((window.bin_low, window.bin_high), (80, 100));
        assert!(!window.is_finite());
        assert!(window.norm_factor.is_infinite());
    }
}
