use crate::error::Result;
use crate::extractors::open_source;
use crate::models::{Artifact, StageReport, StagingArea};
use crate::processors::PipelineStage;
use crate::utils::constants::{
    DEFAULT_BUFFER_SIZE, FIXED_WIDTH_EXTRACT_COLUMNS, PAYMENT_CODE_RANGE, VEHICLE_CODE_RANGE,
};
use crate::writers::AtomicCsvWriter;
use std::io::{BufRead, BufReader};
use std::ops::Range;
use std::path::PathBuf;
use tracing::info;

/// Character-offset slice of `line`, whitespace-trimmed. Offsets past the end
/// of the line clamp to it, so short lines yield empty strings.
pub fn slice_field(line: &str, range: Range<usize>) -> &str {
    let byte_offset = |nth: usize| {
        line.char_indices()
            .nth(nth)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    };
    let start = byte_offset(range.start);
    let end = byte_offset(range.end).max(start);
    line[start..end].trim()
}

/// Slices the payment code and vehicle code out of the positional payment
/// file.
pub struct FixedWidthExtractor {
    source: PathBuf,
    destination: PathBuf,
}

impl FixedWidthExtractor {
    pub const NAME: &'static str = "extract-fixed-width";

    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    pub fn from_staging(staging: &StagingArea) -> Self {
        Self::new(
            staging.path(Artifact::PaymentData),
            staging.path(Artifact::FixedWidthExtract),
        )
    }

    pub fn extract(&self) -> Result<StageReport> {
        let file = open_source(&self.source)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);

        let mut writer = AtomicCsvWriter::create(&self.destination, FIXED_WIDTH_EXTRACT_COLUMNS)?;
        let mut rows_read = 0;

        for line_result in reader.lines() {
            let line = line_result?;
            rows_read += 1;

            writer.write_row([
                slice_field(&line, PAYMENT_CODE_RANGE),
                slice_field(&line, VEHICLE_CODE_RANGE),
            ])?;
        }

        let rows_written = writer.commit()?;
        info!(
            source = %self.source.display(),
            rows = rows_written,
            "extracted payment data"
        );

        Ok(StageReport::new(
            Self::NAME,
            rows_read,
            rows_written,
            self.destination.clone(),
        ))
    }
}

impl PipelineStage for FixedWidthExtractor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&self) -> Result<StageReport> {
        self.extract()
    }
}
