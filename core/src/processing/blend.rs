use crate::prelude::{GlueError, GlueResult, Taper};

/// Near-range weights across a window of `len` bins.
///
/// Weights start at 1 and end at 0 and never increase; the far-range weight is
/// the complement.
pub fn taper_weights(taper: Taper, len: usize) -> GlueResult<Vec<f64>> {
    if len <= 1 {
        return Ok(vec![1.0; len]);
    }
    let last = (len - 1) as f64;

    match taper {
        Taper::Linear => Ok((0..len)
            .map(|k| if k == len - 1 { 0.0 } else { 1.0 - k as f64 / last })
            .collect()),
        Taper::Tanh { center, scale } => {
            if !(scale.is_finite() && scale > 0.0) || !center.is_finite() {
                return Err(GlueError::InvalidInput(format!(
                    "tanh taper needs a positive finite scale, got center {} scale {}",
                    center, scale
                )));
            }
            let sigmoid = |x: f64| (1.0 + ((x - center) / scale).tanh()) / 2.0;
            let start = sigmoid(0.0);
            let span = sigmoid(last) - start;
            if span <= 0.0 {
                return taper_weights(Taper::Linear, len);
            }
            Ok((0..len)
                .map(|k| {
                    let ff_weight = ((sigmoid(k as f64) - start) / span).clamp(0.0, 1.0);
                    1.0 - ff_weight
                })
                .collect())
        }
    }
}

/// Scale the near-range profile and cross-fade it into the far-range profile.
pub fn blend(
    nf_signal: &[f64],
    ff_signal: &[f64],
    norm_factor: f64,
    bin_low: usize,
    bin_high: usize,
) -> GlueResult<Vec<f64>> {
    blend_with_taper(
        nf_signal,
        ff_signal,
        norm_factor,
        bin_low,
        bin_high,
        Taper::Linear,
    )
}

pub fn blend_with_taper(
    nf_signal: &[f64],
    ff_signal: &[f64],
    norm_factor: f64,
    bin_low: usize,
    bin_high: usize,
    taper: Taper,
) -> GlueResult<Vec<f64>> {
    let len = ff_signal.len();
    if nf_signal.len() != len {
        return Err(GlueError::LengthMismatch {
            nf: nf_signal.len(),
            ff: len,
        });
    }
    if bin_low >= bin_high || bin_high > len {
        return Err(GlueError::InvalidWindow {
            bin_low,
            bin_high,
            len,
        });
    }

    // The whole near-range profile is scaled, not only the window.
    let nf_adjusted: Vec<f64> = nf_signal.iter().map(|v| v * norm_factor).collect();
    let nf_weight = taper_weights(taper, bin_high - bin_low)?;

    let mut glued = Vec::with_capacity(len);
    glued.extend_from_slice(&nf_adjusted[..bin_low]);
    for (k, &w_nf) in nf_weight.iter().enumerate() {
        let w_ff = 1.0 - w_nf;
        let bin = bin_low + k;
        glued.push((w_nf * nf_adjusted[bin] + w_ff * ff_signal[bin]) / (w_nf + w_ff));
    }
    glued.extend_from_slice(&ff_signal[bin_high..]);

    Ok(glued)
}
