use crate::config::AlignmentPolicy;
use crate::error::{ProcessingError, Result};
use crate::extractors::open_source;
use crate::models::{Artifact, ColumnLookup, StageReport, StagingArea};
use crate::processors::PipelineStage;
use crate::utils::constants::{CONSOLIDATED_COLUMNS, DEFAULT_BUFFER_SIZE};
use crate::writers::AtomicCsvWriter;
use csv::StringRecord;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One extract being read row by row, with its columns resolved by name.
struct ExtractCursor {
    reader: csv::Reader<File>,
    lookup: ColumnLookup,
    record: StringRecord,
    rows: usize,
}

impl ExtractCursor {
    fn open(artifact: Artifact, path: &Path) -> Result<Self> {
        let file = open_source(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .from_reader(file);

        let columns = artifact.columns().unwrap_or(&[]);
        let lookup = ColumnLookup::resolve(artifact.display_name(), reader.headers()?, columns)?;

        Ok(Self {
            reader,
            lookup,
            record: StringRecord::new(),
            rows: 0,
        })
    }

    fn advance(&mut self) -> Result<bool> {
        let more = self.reader.read_record(&mut self.record)?;
        if more {
            self.rows += 1;
        }
        Ok(more)
    }

    fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.lookup.project(&self.record)
    }

    /// Consume the remaining rows and return the total row count.
    fn finish(mut self) -> Result<usize> {
        while self.advance()? {}
        Ok(self.rows)
    }
}

/// Merges the three extracts row by row into the nine-column dataset.
///
/// Rows are paired purely by position. When the extracts differ in length the
/// [`AlignmentPolicy`] decides between truncating to the shortest (with a
/// warning) and failing the stage.
pub struct Consolidator {
    csv_extract: PathBuf,
    tsv_extract: PathBuf,
    fixed_width_extract: PathBuf,
    destination: PathBuf,
    policy: AlignmentPolicy,
}

impl Consolidator {
    pub const NAME: &'static str = "consolidate";

    pub fn new(
        csv_extract: impl Into<PathBuf>,
        tsv_extract: impl Into<PathBuf>,
        fixed_width_extract: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            csv_extract: csv_extract.into(),
            tsv_extract: tsv_extract.into(),
            fixed_width_extract: fixed_width_extract.into(),
            destination: destination.into(),
            policy: AlignmentPolicy::default(),
        }
    }

    pub fn from_staging(staging: &StagingArea) -> Self {
        Self::new(
            staging.path(Artifact::CsvExtract),
            staging.path(Artifact::TsvExtract),
            staging.path(Artifact::FixedWidthExtract),
            staging.path(Artifact::Consolidated),
        )
        .with_policy(staging.settings().alignment)
    }

    pub fn with_policy(mut self, policy: AlignmentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn consolidate(&self) -> Result<StageReport> {
        let mut csv = ExtractCursor::open(Artifact::CsvExtract, &self.csv_extract)?;
        let mut tsv = ExtractCursor::open(Artifact::TsvExtract, &self.tsv_extract)?;
        let mut fixed = ExtractCursor::open(Artifact::FixedWidthExtract, &self.fixed_width_extract)?;

        let mut writer = AtomicCsvWriter::create(&self.destination, CONSOLIDATED_COLUMNS)?;

        loop {
            // Advance all three so the final counts include the row that ended the merge
            let csv_more = csv.advance()?;
            let tsv_more = tsv.advance()?;
            let fixed_more = fixed.advance()?;

            if !(csv_more && tsv_more && fixed_more) {
                break;
            }

            writer.write_row(csv.values().chain(tsv.values()).chain(fixed.values()))?;
        }

        let csv_rows = csv.finish()?;
        let tsv_rows = tsv.finish()?;
        let fixed_rows = fixed.finish()?;

        if csv_rows != tsv_rows || tsv_rows != fixed_rows {
            match self.policy {
                AlignmentPolicy::Truncate => {
                    warn!(
                        csv = csv_rows,
                        tsv = tsv_rows,
                        fixed_width = fixed_rows,
                        kept = writer.rows_written(),
                        "extract lengths differ; truncating to the shortest"
                    );
                }
                AlignmentPolicy::Strict => {
                    return Err(ProcessingError::LengthMismatch {
                        csv: csv_rows,
                        tsv: tsv_rows,
                        fixed_width: fixed_rows,
                    });
                }
            }
        }

        let rows_written = writer.commit()?;
        info!(rows = rows_written, "consolidated extracts");

        Ok(StageReport::new(
            Self::NAME,
            csv_rows.max(tsv_rows).max(fixed_rows),
            rows_written,
            self.destination.clone(),
        ))
    }
}

impl PipelineStage for Consolidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&self) -> Result<StageReport> {
        self.consolidate()
    }
}
