use crate::error::Result;
use crate::extractors::{DelimitedLines, SourceRow};
use crate::models::{Artifact, StageReport, StagingArea};
use crate::processors::PipelineStage;
use crate::utils::constants::{CSV_EXTRACT_COLUMNS, CSV_PROJECTED_FIELDS};
use crate::writers::AtomicCsvWriter;
use std::path::PathBuf;
use tracing::{debug, info};

/// Keeps the first four columns of the vehicle CSV.
///
/// Rows with fewer than four fields are propagated unpadded; blank lines
/// stay blank.
pub struct CsvExtractor {
    source: PathBuf,
    destination: PathBuf,
}

impl CsvExtractor {
    pub const NAME: &'static str = "extract-csv";

    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    pub fn from_staging(staging: &StagingArea) -> Self {
        Self::new(
            staging.path(Artifact::VehicleData),
            staging.path(Artifact::CsvExtract),
        )
    }

    pub fn extract(&self) -> Result<StageReport> {
        let mut rows = DelimitedLines::open(&self.source, b',')?;
        let mut writer = AtomicCsvWriter::create(&self.destination, CSV_EXTRACT_COLUMNS)?;
        let mut rows_read = 0;

        while let Some((line, row)) = rows.next_row()? {
            rows_read += 1;

            match row {
                SourceRow::Blank => writer.write_blank_row()?,
                SourceRow::Record(record) => {
                    if record.len() < CSV_PROJECTED_FIELDS {
                        debug!(line, found = record.len(), "short vehicle row propagated as-is");
                    }
                    writer.write_row(record.iter().take(CSV_PROJECTED_FIELDS))?;
                }
            }
        }

        let rows_written = writer.commit()?;
        info!(
            source = %self.source.display(),
            rows = rows_written,
            "extracted vehicle data"
        );

        Ok(StageReport::new(
            Self::NAME,
            rows_read,
            rows_written,
            self.destination.clone(),
        ))
    }
}

impl PipelineStage for CsvExtractor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&self) -> Result<StageReport> {
        self.extract()
    }
}
