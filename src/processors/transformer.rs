use crate::error::Result;
use crate::extractors::open_source;
use crate::models::{Artifact, ColumnLookup, StageReport, StagingArea};
use crate::processors::PipelineStage;
use crate::utils::constants::{COL_VEHICLE_TYPE, DEFAULT_BUFFER_SIZE};
use crate::writers::AtomicCsvWriter;
use csv::StringRecord;
use std::path::PathBuf;
use tracing::info;

/// Upper-cases the `Vehicle type` column; every other field passes through.
pub struct Transformer {
    source: PathBuf,
    destination: PathBuf,
}

impl Transformer {
    pub const NAME: &'static str = "transform";

    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    pub fn from_staging(staging: &StagingArea) -> Self {
        Self::new(
            staging.path(Artifact::Consolidated),
            staging.path(Artifact::Transformed),
        )
    }

    pub fn transform(&self) -> Result<StageReport> {
        let file = open_source(&self.source)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .from_reader(file);

        let header = reader.headers()?.clone();
        let vehicle_type = ColumnLookup::resolve(
            Artifact::Consolidated.display_name(),
            &header,
            &[COL_VEHICLE_TYPE],
        )?
        .position(0)
        .unwrap_or_default();

        let mut writer = AtomicCsvWriter::create(&self.destination, &header)?;
        let mut record = StringRecord::new();
        let mut rows_read = 0;

        while reader.read_record(&mut record)? {
            rows_read += 1;
            let upper = record.get(vehicle_type).map(str::to_uppercase);

            writer.write_row(record.iter().enumerate().map(|(i, field)| {
                if i == vehicle_type {
                    upper.as_deref().unwrap_or(field)
                } else {
                    field
                }
            }))?;
        }

        let rows_written = writer.commit()?;
        info!(rows = rows_written, "transformed consolidated data");

        Ok(StageReport::new(
            Self::NAME,
            rows_read,
            rows_written,
            self.destination.clone(),
        ))
    }
}

impl PipelineStage for Transformer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&self) -> Result<StageReport> {
        self.transform()
    }
}
