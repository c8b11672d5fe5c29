pub mod batch;
pub mod blend;
pub mod gluing;
pub mod parameters;
pub mod window_search;

pub use batch::{glue_batch, glue_matrix};
pub use blend::{blend, blend_with_taper};
pub use gluing::{glue, glue_with, GluedProfile, GluingStage};
pub use parameters::{gluing_window_parameters, GluingWindow};
pub use window_search::{select_window, ScoreGrid, SelectionOutcome, WindowCandidate};
