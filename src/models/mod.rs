pub mod artifact;
pub mod record;

pub use artifact::{Artifact, StagingArea};
pub use record::{ColumnLookup, StageReport};
