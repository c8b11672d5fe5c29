use anyhow::{ensure, Context};
use gluecore::interface::{ProfileAncillary, ProfilePayload};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration for generating synthetic near/far-range lidar profiles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub range_bins: usize,
    pub channels: Vec<String>,
    pub time_steps: usize,
    pub time_resolution_s: f64,
    /// Bin at which the far-range telescope reaches full geometric overlap.
    pub overlap_bins: usize,
    /// Near-range signal expressed in far-range units.
    pub nr_scale: f64,
    pub noise: f64,
    pub background: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            range_bins: 1024,
            channels: vec!["355_total".into(), "532_total".into(), "1064_total".into()],
            time_steps: 8,
            time_resolution_s: 30.0,
            overlap_bins: 120,
            nr_scale: 0.15,
            noise: 2.0,
            background: 5.0,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    fn normalized_overlap(&self) -> usize {
        self.overlap_bins.max(1)
    }
}

/// Geometric overlap ramp: 0 at the ground, 1 from `full_at` upwards.
fn overlap_function(bin: usize, full_at: usize) -> f64 {
    if bin >= full_at {
        1.0
    } else {
        0.5 * (1.0 - (PI * bin as f64 / full_at as f64).cos())
    }
}

/// Attenuated backscatter with an aerosol layer whose height drifts over time.
fn backscatter(bin: usize, step: usize, config: &GeneratorConfig) -> f64 {
    let z = bin as f64;
    let layer_center = 0.3 * config.range_bins as f64 + 4.0 * step as f64;
    let layer = 400.0 * (-((z - layer_center) / 25.0).powi(2)).exp();
    (3000.0 * (-z / 250.0).exp() + layer) * (1.0 + 0.05 * (step as f64 * 0.7).sin())
}

fn build_channel_step(
    config: &GeneratorConfig,
    rng: &mut StdRng,
    channel: &str,
    step: usize,
) -> ProfilePayload {
    let full_overlap = config.normalized_overlap();
    let nr_full_overlap = (full_overlap / 4).max(1);
    let mut nf_signal = Vec::with_capacity(config.range_bins);
    let mut ff_signal = Vec::with_capacity(config.range_bins);

    for bin in 0..config.range_bins {
        let beta = backscatter(bin, step, config);
        let ff = beta * overlap_function(bin, full_overlap);
        let nf = config.nr_scale * beta * overlap_function(bin, nr_full_overlap);
        ff_signal.push(ff + config.background + rng.gen_range(-1.0..=1.0) * config.noise);
        nf_signal.push(
            nf + config.nr_scale * config.background
                + rng.gen_range(-1.0..=1.0) * config.noise * config.nr_scale,
        );
    }

    ProfilePayload::new(
        nf_signal,
        ff_signal,
        ProfileAncillary {
            channel: channel.to_string(),
            timestamp: step as f64 * config.time_resolution_s,
        },
    )
}

/// One payload per (channel, time-step), channel-major.
pub fn build_profile_payloads(config: &GeneratorConfig) -> anyhow::Result<Vec<ProfilePayload>> {
    ensure!(!config.channels.is_empty(), "generator needs at least one channel");
    ensure!(config.range_bins > 0, "generator needs at least one range bin");
    let count = config
        .channels
        .len()
        .checked_mul(config.time_steps)
        .context("overflow computing profile count for generator")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut payloads = Vec::with_capacity(count);
    for channel in &config.channels {
        for step in 0..config.time_steps {
            payloads.push(build_channel_step(config, &mut rng, channel, step));
        }
    }

    Ok(payloads)
}
