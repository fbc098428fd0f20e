use crate::error::Result;
use crate::extractors::{CsvExtractor, FixedWidthExtractor, TsvExtractor};
use crate::models::{Artifact, StageReport, StagingArea};
use crate::processors::{Consolidator, Transformer};
use serde::{Deserialize, Serialize};

/// A unit of work an external orchestrator can invoke on its own. Inputs and
/// outputs are bound at construction; running twice on the same inputs
/// produces the same output.
pub trait PipelineStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self) -> Result<StageReport>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    ExtractCsv,
    ExtractTsv,
    ExtractFixedWidth,
    Consolidate,
    Transform,
}

impl Stage {
    /// Dependency order. The three extract stages may run in any order.
    pub const ORDER: [Stage; 5] = [
        Stage::ExtractCsv,
        Stage::ExtractTsv,
        Stage::ExtractFixedWidth,
        Stage::Consolidate,
        Stage::Transform,
    ];

    pub const EXTRACTORS: [Stage; 3] = [
        Stage::ExtractCsv,
        Stage::ExtractTsv,
        Stage::ExtractFixedWidth,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::ExtractCsv => CsvExtractor::NAME,
            Stage::ExtractTsv => TsvExtractor::NAME,
            Stage::ExtractFixedWidth => FixedWidthExtractor::NAME,
            Stage::Consolidate => Consolidator::NAME,
            Stage::Transform => Transformer::NAME,
        }
    }

    pub fn inputs(&self) -> &'static [Artifact] {
        match self {
            Stage::ExtractCsv => &[Artifact::VehicleData],
            Stage::ExtractTsv => &[Artifact::TollPlazaData],
            Stage::ExtractFixedWidth => &[Artifact::PaymentData],
            Stage::Consolidate => &[
                Artifact::CsvExtract,
                Artifact::TsvExtract,
                Artifact::FixedWidthExtract,
            ],
            Stage::Transform => &[Artifact::Consolidated],
        }
    }

    pub fn output(&self) -> Artifact {
        match self {
            Stage::ExtractCsv => Artifact::CsvExtract,
            Stage::ExtractTsv => Artifact::TsvExtract,
            Stage::ExtractFixedWidth => Artifact::FixedWidthExtract,
            Stage::Consolidate => Artifact::Consolidated,
            Stage::Transform => Artifact::Transformed,
        }
    }

    /// Stages whose output this stage reads.
    pub fn depends_on(&self) -> Vec<Stage> {
        Stage::ORDER
            .into_iter()
            .filter(|other| self.inputs().contains(&other.output()))
            .collect()
    }

    pub fn build(&self, staging: &StagingArea) -> Box<dyn PipelineStage> {
        match self {
            Stage::ExtractCsv => Box::new(CsvExtractor::from_staging(staging)),
            Stage::ExtractTsv => Box::new(TsvExtractor::from_staging(staging)),
            Stage::ExtractFixedWidth => Box::new(FixedWidthExtractor::from_staging(staging)),
            Stage::Consolidate => Box::new(Consolidator::from_staging(staging)),
            Stage::Transform => Box::new(Transformer::from_staging(staging)),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_dependencies() {
        assert!(Stage::ExtractCsv.depends_on().is_empty());
        assert_eq!(
            Stage::Consolidate.depends_on(),
            vec![
                Stage::ExtractCsv,
                Stage::ExtractTsv,
                Stage::ExtractFixedWidth
            ]
        );
        assert_eq!(Stage::Transform.depends_on(), vec![Stage::Consolidate]);
    }

    #[test]
    fn test_order_respects_dependencies() {
        for (i, stage) in Stage::ORDER.iter().enumerate() {
            for dep in stage.depends_on() {
                let dep_index = Stage::ORDER.iter().position(|s| *s == dep).unwrap();
                assert!(dep_index < i, "{} must run before {}", dep, stage);
            }
        }
    }

    #[test]
    fn test_build_names_match() {
        let staging = StagingArea::new(Settings::default());
        for stage in Stage::ORDER {
            assert_eq!(stage.build(&staging).name(), stage.name());
        }
    }
}
