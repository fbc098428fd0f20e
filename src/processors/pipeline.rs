use crate::error::{ProcessingError, Result};
use crate::models::{StageReport, StagingArea};
use crate::processors::Stage;
use crate::utils::progress::ProgressReporter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Reports of every stage of one pipeline run, in completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub stages: Vec<StageReport>,
    pub elapsed_ms: u64,
}

impl PipelineReport {
    pub fn final_rows(&self) -> usize {
        self.stages.last().map(|s| s.rows_written).unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        let mut summary = String::from("Pipeline Summary:\n");
        for stage in &self.stages {
            summary.push_str(&format!("  {}\n", stage.summary()));
        }
        summary.push_str(&format!("  Elapsed: {} ms\n", self.elapsed_ms));
        summary
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ProcessingError::write(path, e.into()))?;
        std::fs::write(path, json).map_err(|e| ProcessingError::write(path, e))
    }
}

/// Runs the stages in dependency order. The three extractors can run
/// concurrently on the blocking pool; consolidate and transform only start
/// once all of them succeeded.
pub struct Pipeline {
    staging: Arc<StagingArea>,
    concurrent_extraction: bool,
}

impl Pipeline {
    pub fn new(staging: StagingArea) -> Self {
        let concurrent_extraction = staging.settings().concurrent_extraction;
        Self {
            staging: Arc::new(staging),
            concurrent_extraction,
        }
    }

    pub fn with_concurrent_extraction(mut self, concurrent_extraction: bool) -> Self {
        self.concurrent_extraction = concurrent_extraction;
        self
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Run a single stage against the staging area.
    pub fn run_stage(&self, stage: Stage) -> Result<StageReport> {
        run_stage_in(&self.staging, stage)
    }

    pub async fn run(&self, progress: Option<&ProgressReporter>) -> Result<PipelineReport> {
        let started = Instant::now();

        if let Some(p) = progress {
            p.set_message("Extracting sources...");
        }

        let mut stages = if self.concurrent_extraction {
            self.extract_concurrently().await?
        } else {
            Stage::EXTRACTORS
                .into_iter()
                .map(|stage| self.run_stage(stage))
                .collect::<Result<Vec<_>>>()?
        };

        if let Some(p) = progress {
            p.set_message("Consolidating extracts...");
        }
        stages.push(self.run_stage(Stage::Consolidate)?);

        if let Some(p) = progress {
            p.set_message("Transforming...");
        }
        stages.push(self.run_stage(Stage::Transform)?);

        let report = PipelineReport {
            stages,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        if let Some(p) = progress {
            p.finish_with_message(&format!("Wrote {} rows", report.final_rows()));
        }

        Ok(report)
    }

    async fn extract_concurrently(&self) -> Result<Vec<StageReport>> {
        let spawn = |stage: Stage| {
            let staging = Arc::clone(&self.staging);
            tokio::task::spawn_blocking(move || run_stage_in(&staging, stage))
        };

        // All three are joined before any result is inspected
        let (csv, tsv, fixed) = tokio::try_join!(
            spawn(Stage::ExtractCsv),
            spawn(Stage::ExtractTsv),
            spawn(Stage::ExtractFixedWidth)
        )?;

        Ok(vec![csv?, tsv?, fixed?])
    }
}

fn run_stage_in(staging: &StagingArea, stage: Stage) -> Result<StageReport> {
    info!(stage = stage.name(), "stage started");
    let started = Instant::now();

    match stage.build(staging).run() {
        Ok(report) => {
            info!(
                stage = stage.name(),
                rows = report.rows_written,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "stage finished"
            );
            Ok(report)
        }
        Err(e) => {
            error!(stage = stage.name(), error = %e, "stage failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AlignmentPolicy, Settings};
    use crate::models::Artifact;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn payment_line(payment: &str, vehicle: &str) -> String {
        format!("{:<50}{:<20}{:<20}", "", payment, vehicle)
    }

    fn seed(dir: &Path, csv_rows: usize, tsv_rows: usize, fixed_rows: usize) -> Result<()> {
        let csv: String = (1..=csv_rows)
            .map(|i| format!("{i},2024-01-0{i}T00:00:00,V{i},car,x\n"))
            .collect();
        let tsv: String = (1..=tsv_rows)
            .map(|i| format!("{i}\tt\tv\tcar\t2\t10{i}\tP{i}\n"))
            .collect();
        let fixed: String = (1..=fixed_rows)
            .map(|i| payment_line("cash", &format!("VC{i}")) + "\n")
            .collect();

        std::fs::write(dir.join("vehicle-data.csv"), csv)?;
        std::fs::write(dir.join("tollplaza-data.tsv"), tsv)?;
        std::fs::write(dir.join("payment-data.txt"), fixed)?;
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_and_sequential_agree() -> Result<()> {
        let concurrent_dir = TempDir::new()?;
        let sequential_dir = TempDir::new()?;
        seed(concurrent_dir.path(), 3, 3, 3)?;
        seed(sequential_dir.path(), 3, 3, 3)?;

        let concurrent = Pipeline::new(StagingArea::new(Settings::with_staging_dir(
            concurrent_dir.path(),
        )));
        let sequential = Pipeline::new(StagingArea::new(Settings::with_staging_dir(
            sequential_dir.path(),
        )))
        .with_concurrent_extraction(false);

        let report = concurrent.run(None).await?;
        sequential.run(None).await?;

        assert_eq!(report.stages.len(), 5);
        assert_eq!(report.final_rows(), 3);
        assert_eq!(
            std::fs::read(concurrent.staging().path(Artifact::Transformed))?,
            std::fs::read(sequential.staging().path(Artifact::Transformed))?
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_extractor_halts_downstream() -> Result<()> {
        let dir = TempDir::new()?;
        seed(dir.path(), 2, 2, 2)?;
        std::fs::remove_file(dir.path().join("tollplaza-data.tsv"))?;

        let pipeline = Pipeline::new(StagingArea::new(Settings::with_staging_dir(dir.path())));
        let err = pipeline.run(None).await.unwrap_err();

        assert!(matches!(err, ProcessingError::MissingInput { .. }));
        assert!(!pipeline.staging().path(Artifact::Consolidated).exists());
        assert!(!pipeline.staging().path(Artifact::Transformed).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_strict_alignment_from_settings() -> Result<()> {
        let dir = TempDir::new()?;
        seed(dir.path(), 5, 3, 4)?;

        let settings =
            Settings::with_staging_dir(dir.path()).with_alignment(AlignmentPolicy::Strict);
        let pipeline = Pipeline::new(StagingArea::new(settings));
        let err = pipeline.run(None).await.unwrap_err();

        assert!(matches!(err, ProcessingError::LengthMismatch { .. }));
        // extracts were still produced
        assert!(pipeline.staging().path(Artifact::CsvExtract).exists());
        Ok(())
    }

    #[test]
    fn test_report_json() -> Result<()> {
        let dir = TempDir::new()?;
        let report = PipelineReport {
            stages: vec![StageReport::new("transform", 3, 3, dir.path().join("t.csv"))],
            elapsed_ms: 7,
        };
        let path = dir.path().join("report.json");
        report.write_json(&path)?;

        let parsed: PipelineReport = serde_json::from_str(&std::fs::read_to_string(&path)?)
            .expect("report should round-trip");
        assert_eq!(parsed.stages, report.stages);
        assert_eq!(parsed.final_rows(), 3);
        Ok(())
    }
}
