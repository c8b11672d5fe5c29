//! Near-range / far-range gluing core for multi-telescope lidar profiles.
//!
//! A glued profile is produced per (channel, time-step): a correlation/SNR
//! window search picks the overlap region, the near-range signal is scaled
//! into far-range units and the two are cross-faded across that window.

pub mod interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{GlueConfig, GlueError, GlueResult, ProcessingStage, StageInput, StageOutput};
pub use processing::gluing::{glue, glue_with, GluedProfile, GluingStage};
