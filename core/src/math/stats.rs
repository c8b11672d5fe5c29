/// Window statistics used by the gluing search.
///
/// Standard deviations are population (ddof = 0) values.
pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean; NaN for an empty slice.
    pub fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    pub fn std_dev(values: &[f64]) -> f64 {
        let mean = Self::mean(values);
        let sum_sq: f64 = values.iter().map(|&v| (v - mean) * (v - mean)).sum();
        (sum_sq / values.len() as f64).sqrt()
    }

    /// Signal-to-noise ratio as mean over standard deviation.
    ///
    /// A perfectly flat window has no meaningful SNR and yields 0.
    pub fn snr(values: &[f64]) -> f64 {
        let sd = Self::std_dev(values);
        if sd == 0.0 {
            0.0
        } else {
            Self::mean(values) / sd
        }
    }

    /// Pearson correlation coefficient of two equal-length slices.
    ///
    /// Returns NaN when either slice has zero variance.
    pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
        debug_assert_eq!(x.len(), y.len());
        let mean_x = Self::mean(x);
        let mean_y = Self::mean(y);

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        let mut syy = 0.0;
        for (&a, &b) in x.iter().zip(y) {
            let dx = a - mean_x;
            let dy = b - mean_y;
            sxy += dx * dy;
            sxx += dx * dx;
            syy += dy * dy;
        }

        let denom = sxx.sqrt() * syy.sqrt();
        if denom == 0.0 {
            return f64::NAN;
        }
        (sxy / denom).clamp(-1.0, 1.0)
    }
}
