//! Gluing-window search over a grid of candidate overlap windows.
//!
//! Every candidate window starts at `overlap + row` and spans
//! `MINIMUM_WINDOW + col` bins. The search prefers the window with the highest
//! NR/FR correlation whose near-range SNR clears the threshold; when no such
//! window exists among the well-correlated ones, the SNR threshold is relaxed
//! step by step instead of rejecting the profile.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::math::stats::StatsHelper;
use crate::prelude::{GlueError, GlueResult};

/// Number of candidate base offsets above `overlap`.
pub const BASE_OFFSETS: usize = 26;
/// Number of candidate width increments above the minimum window.
pub const WIDTH_INCREMENTS: usize = 21;
/// Narrowest gluing window, in bins.
pub const MINIMUM_WINDOW: usize = 20;
/// Amount the SNR threshold drops on each relaxation.
pub const RELAXATION_STEP: f64 = 0.05;
/// Relaxation never takes the SNR threshold below this value.
pub const SNR_THRESHOLD_FLOOR: f64 = 0.0;

const MAX_ITERATIONS: usize = 1 << 24;

/// Smallest signal length that holds every candidate window for `overlap`.
///
/// The widest candidate starts at `overlap + BASE_OFFSETS - 1` and spans
/// `MINIMUM_WINDOW + WIDTH_INCREMENTS - 1` bins, so `overlap + 65` bins are
/// enough; longer margins such as `overlap + 120` are not needed.
pub fn required_bins(overlap: usize) -> usize {
    overlap.saturating_add(BASE_OFFSETS - 1 + MINIMUM_WINDOW + WIDTH_INCREMENTS - 1)
}

/// A `(row, col)` position in the score grid: base offset and width increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowCandidate {
    pub row: usize,
    pub col: usize,
}

impl WindowCandidate {
    /// Returned when the correlation grid is degenerate.
    pub const SENTINEL: Self = Self { row: 0, col: 0 };

    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn width(&self) -> usize {
        MINIMUM_WINDOW + self.col
    }

    /// Absolute `[bin_low, bin_high)` range of this candidate.
    pub fn bounds(&self, overlap: usize) -> (usize, usize) {
        let bin_low = overlap + self.row;
        (bin_low, bin_low + self.width())
    }
}

/// How the search arrived at its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// Met both thresholds as given.
    Accepted,
    /// Met the thresholds after lowering the SNR target `steps` times.
    Relaxed { steps: usize },
    /// Relaxation hit its floor or iteration cap; kept the best correlation.
    Fallback,
    /// Correlation grid contained NaN; sentinel window returned.
    Degenerate,
}

impl SelectionOutcome {
    pub fn is_degenerate(&self) -> bool {
        matches!(self, SelectionOutcome::Degenerate)
    }

    pub fn is_relaxed(&self) -> bool {
        matches!(self, SelectionOutcome::Relaxed { .. })
    }
}

/// Correlation and SNR scores for every candidate window.
#[derive(Debug, Clone)]
pub struct ScoreGrid {
    pub corr_coef: Array2<f64>,
    pub snr_nf: Array2<f64>,
    /// Far-range SNR; kept for telemetry, the selection does not read it.
    pub snr_ff: Array2<f64>,
}

impl ScoreGrid {
    pub fn compute(nf_signal: &[f64], ff_signal: &[f64], overlap: usize) -> GlueResult<Self> {
        if nf_signal.len() != ff_signal.len() {
            return Err(GlueError::LengthMismatch {
                nf: nf_signal.len(),
                ff: ff_signal.len(),
            });
        }
        let needed = required_bins(overlap);
        if nf_signal.len() < needed {
            return Err(GlueError::InsufficientData {
                needed,
                got: nf_signal.len(),
            });
        }

        let shape = (BASE_OFFSETS, WIDTH_INCREMENTS);
        let mut corr_coef = Array2::zeros(shape);
        let mut snr_nf = Array2::zeros(shape);
        let mut snr_ff = Array2::zeros(shape);

        for row in 0..BASE_OFFSETS {
            for col in 0..WIDTH_INCREMENTS {
                let (lo, hi) = WindowCandidate::new(row, col).bounds(overlap);
                let nf = &nf_signal[lo..hi];
                let ff = &ff_signal[lo..hi];
                corr_coef[[row, col]] = StatsHelper::pearson(nf, ff);
                snr_nf[[row, col]] = StatsHelper::snr(nf);
                snr_ff[[row, col]] = StatsHelper::snr(ff);
            }
        }

        Ok(Self {
            corr_coef,
            snr_nf,
            snr_ff,
        })
    }

    /// Maximum correlation; NaN if any cell is NaN.
    pub fn max_corr(&self) -> f64 {
        self.corr_coef.iter().fold(f64::NEG_INFINITY, |acc, &value| {
            if acc.is_nan() || value.is_nan() {
                f64::NAN
            } else {
                acc.max(value)
            }
        })
    }

    /// Candidates ordered by descending correlation, ties in row-major order.
    fn ranked(&self) -> Vec<(f64, WindowCandidate)> {
        let mut ranked: Vec<(f64, WindowCandidate)> = self
            .corr_coef
            .indexed_iter()
            .map(|((row, col), &corr)| (corr, WindowCandidate::new(row, col)))
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        ranked
    }
}

/// Final choice of the window search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSelection {
    pub candidate: WindowCandidate,
    pub outcome: SelectionOutcome,
    pub corr_coef: f64,
    pub snr_nf: f64,
    pub snr_ff: f64,
    /// SNR threshold in force when the search stopped.
    pub final_snr_threshold: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SearchState {
    /// Examining the candidate at this position of the ranking.
    Searching(usize),
    Relaxing,
    Accepted(WindowCandidate, SelectionOutcome),
}

fn iteration_limit(snr_nf_threshold: f64, cells: usize) -> usize {
    let headroom = (snr_nf_threshold - SNR_THRESHOLD_FLOOR).max(0.0);
    let passes = (headroom / RELAXATION_STEP).ceil().min(MAX_ITERATIONS as f64) as usize + 2;
    passes.saturating_mul(cells + 2).min(MAX_ITERATIONS)
}

/// Run the selection state machine on precomputed scores.
pub fn select_from_scores(
    scores: &ScoreGrid,
    corr_coef_threshold: f64,
    snr_nf_threshold: f64,
) -> WindowSelection {
    let finish = |candidate: WindowCandidate, outcome, threshold, iterations| {
        let at = [candidate.row, candidate.col];
        WindowSelection {
            candidate,
            outcome,
            corr_coef: scores.corr_coef[at],
            snr_nf: scores.snr_nf[at],
            snr_ff: scores.snr_ff[at],
            final_snr_threshold: threshold,
            iterations,
        }
    };

    if scores.max_corr().is_nan() {
        return finish(
            WindowCandidate::SENTINEL,
            SelectionOutcome::Degenerate,
            snr_nf_threshold,
            0,
        );
    }

    let ranked = scores.ranked();
    let best = ranked[0].1;
    let limit = iteration_limit(snr_nf_threshold, ranked.len());

    let mut threshold = snr_nf_threshold;
    let mut relaxations = 0;
    let mut iterations = 0;
    let mut state = SearchState::Searching(0);

    loop {
        state = match state {
            SearchState::Accepted(candidate, outcome) => {
                return finish(candidate, outcome, threshold, iterations);
            }
            _ if iterations >= limit => {
                SearchState::Accepted(best, SelectionOutcome::Fallback)
            }
            SearchState::Searching(rank) => {
                let (corr, current) = ranked[rank];
                if scores.snr_nf[[current.row, current.col]] >= threshold {
                    let outcome = if relaxations == 0 {
                        SelectionOutcome::Accepted
                    } else {
                        SelectionOutcome::Relaxed { steps: relaxations }
                    };
                    SearchState::Accepted(current, outcome)
                } else {
                    let next = ranked[rank + 1..]
                        .iter()
                        .position(|(other, _)| *other < corr)
                        .map(|offset| rank + 1 + offset);
                    // Nothing left above the correlation floor: lower the SNR target.
                    match next {
                        Some(next) if ranked[next].0 >= corr_coef_threshold => {
                            SearchState::Searching(next)
                        }
                        _ => SearchState::Relaxing,
                    }
                }
            }
            SearchState::Relaxing => {
                let relaxed = threshold - RELAXATION_STEP;
                if relaxed < SNR_THRESHOLD_FLOOR {
                    SearchState::Accepted(best, SelectionOutcome::Fallback)
                } else {
                    log::debug!("relaxing near-range SNR threshold to {:.2}", relaxed);
                    threshold = relaxed;
                    relaxations += 1;
                    SearchState::Searching(0)
                }
            }
        };
        iterations += 1;
    }
}

/// Score every candidate window and run the selection.
pub fn search_window(
    nf_signal: &[f64],
    ff_signal: &[f64],
    overlap: usize,
    corr_coef_threshold: f64,
    snr_nf_threshold: f64,
) -> GlueResult<WindowSelection> {
    let scores = ScoreGrid::compute(nf_signal, ff_signal, overlap)?;
    Ok(select_from_scores(
        &scores,
        corr_coef_threshold,
        snr_nf_threshold,
    ))
}

/// Grid position of the chosen gluing window.
pub fn select_window(
    nf_signal: &[f64],
    ff_signal: &[f64],
    overlap: usize,
    corr_coef_threshold: f64,
    snr_nf_threshold: f64,
) -> GlueResult<WindowCandidate> {
    search_window(
        nf_signal,
        ff_signal,
        overlap,
        corr_coef_threshold,
        snr_nf_threshold,
    )
    .map(|selection| selection.candidate)
}
