//! Parallel gluing across many (channel, time-step) pairs.
//!
//! Each profile pair is glued independently; the rayon pool only changes
//! where the work runs, never the result.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

use crate::interface::{GluedRecord, ProfilePayload};
use crate::prelude::{GlueConfig, GlueError, GlueResult};
use crate::processing::gluing::glue_with;

/// Glue every payload, preserving input order.
pub fn glue_batch(
    config: &GlueConfig,
    payloads: &[ProfilePayload],
) -> Vec<GlueResult<GluedRecord>> {
    payloads
        .par_iter()
        .map(|payload| {
            glue_with(config, &payload.nf_signal, &payload.ff_signal)
                .map(|profile| GluedRecord::new(&payload.ancillary, profile))
        })
        .collect()
}

/// Glue a time-by-range matrix pair row by row.
pub fn glue_matrix(
    config: &GlueConfig,
    nf_profiles: ArrayView2<f64>,
    ff_profiles: ArrayView2<f64>,
) -> GlueResult<Array2<f64>> {
    if nf_profiles.dim() != ff_profiles.dim() {
        return Err(GlueError::InvalidInput(format!(
            "profile matrices differ in shape: {:?} vs {:?}",
            nf_profiles.dim(),
            ff_profiles.dim()
        )));
    }

    let (rows, cols) = ff_profiles.dim();
    let glued_rows = (0..rows)
        .into_par_iter()
        .map(|row| {
            let nf = nf_profiles.row(row).to_vec();
            let ff = ff_profiles.row(row).to_vec();
            glue_with(config, &nf, &ff).map(|profile| profile.samples)
        })
        .collect::<GlueResult<Vec<Vec<f64>>>>()?;

    Array2::from_shape_vec((rows, cols), glued_rows.concat())
        .map_err(|err| GlueError::Internal(format!("assembling glued matrix: {}", err)))
}
