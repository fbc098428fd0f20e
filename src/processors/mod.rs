pub mod consolidator;
pub mod pipeline;
pub mod stage;
pub mod transformer;

pub use consolidator::Consolidator;
pub use pipeline::{Pipeline, PipelineReport};
pub use stage::{PipelineStage, Stage};
pub use transformer::Transformer;
