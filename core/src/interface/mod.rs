pub mod profile;
pub mod record;

pub use profile::{ProfileAncillary, ProfilePayload};
pub use record::GluedRecord;
