use crate::error::{ProcessingError, Result};
use crate::extractors::{DelimitedLines, SourceRow};
use crate::models::{Artifact, StageReport, StagingArea};
use crate::processors::PipelineStage;
use crate::utils::constants::{TSV_EXTRACT_COLUMNS, TSV_PROJECTED_INDICES};
use crate::writers::AtomicCsvWriter;
use std::path::PathBuf;
use tracing::info;

/// Projects axles, plaza id and plaza code out of the toll plaza TSV.
pub struct TsvExtractor {
    source: PathBuf,
    destination: PathBuf,
}

impl TsvExtractor {
    pub const NAME: &'static str = "extract-tsv";

    const REQUIRED_FIELDS: usize = TSV_PROJECTED_INDICES[TSV_PROJECTED_INDICES.len() - 1] + 1;

    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    pub fn from_staging(staging: &StagingArea) -> Self {
        Self::new(
            staging.path(Artifact::TollPlazaData),
            staging.path(Artifact::TsvExtract),
        )
    }

    /// Fails with `MalformedRow` on the first row with fewer than seven
    /// fields, blank lines included; nothing is written in that case.
    pub fn extract(&self) -> Result<StageReport> {
        let mut rows = DelimitedLines::open(&self.source, b'\t')?;
        let mut writer = AtomicCsvWriter::create(&self.destination, TSV_EXTRACT_COLUMNS)?;
        let mut rows_read = 0;

        while let Some((line, row)) = rows.next_row()? {
            rows_read += 1;

            let record = match row {
                SourceRow::Record(record) if record.len() >= Self::REQUIRED_FIELDS => record,
                SourceRow::Record(record) => return Err(self.malformed(line, record.len())),
                SourceRow::Blank => return Err(self.malformed(line, 0)),
            };

            writer.write_row(TSV_PROJECTED_INDICES.iter().map(|&i| &record[i]))?;
        }

        let rows_written = writer.commit()?;
        info!(
            source = %self.source.display(),
            rows = rows_written,
            "extracted toll plaza data"
        );

        Ok(StageReport::new(
            Self::NAME,
            rows_read,
            rows_written,
            self.destination.clone(),
        ))
    }

    fn malformed(&self, line: u64, found: usize) -> ProcessingError {
        ProcessingError::MalformedRow {
            path: self.source.clone(),
            line,
            expected: Self::REQUIRED_FIELDS,
            found,
        }
    }
}

impl PipelineStage for TsvExtractor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn run(&self) -> Result<StageReport> {
        self.extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_projects_columns_four_to_six() -> Result<()> {
        let dir = TempDir::new()?;
        let source = dir.path().join("tollplaza-data.tsv");
        let dest = dir.path().join("tsv_data.csv");
        std::fs::write(
            &source,
            "1\tThu Aug 19 21:54:38 2021\t125094\tcar\t2\t4856\tPC7C042B7\n\
             x\tx\tx\tx\t2\t101\tP1\textra\n",
        )?;

        let report = TsvExtractor::new(&source, &dest).extract()?;

        assert_eq!(
            std::fs::read_to_string(&dest)?,
            "Number of axles,Tollplaza id,Tollplaza code\n\
             2,4856,PC7C042B7\n\
             2,101,P1\n"
        );
        assert_eq!(report.rows_written, 2);
        Ok(())
    }

    #[test]
    fn test_short_row_fails_stage() -> Result<()> {
        let dir = TempDir::new()?;
        let source = dir.path().join("tollplaza-data.tsv");
        let dest = dir.path().join("tsv_data.csv");
        std::fs::write(&source, "a\tb\tc\td\t2\t101\tP1\na\tb\tc\td\t2\t101\n")?;

        let err = TsvExtractor::new(&source, &dest).extract().unwrap_err();

        match err {
            ProcessingError::MalformedRow {
                line,
                expected,
                found,
                ..
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 7);
                assert_eq!(found, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dest.exists());
        Ok(())
    }

    #[test]
    fn test_blank_line_fails_stage() -> Result<()> {
        let dir = TempDir::new()?;
        let source = dir.path().join("tollplaza-data.tsv");
        let dest = dir.path().join("tsv_data.csv");
        std::fs::write(
            &source,
            "a\tb\tc\td\t2\t101\tP1\n\na\tb\tc\td\t3\t102\tP2\n",
        )?;

        let err = TsvExtractor::new(&source, &dest).extract().unwrap_err();

        match err {
            ProcessingError::MalformedRow {
                line,
                expected,
                found,
                ..
            } => {
                assert_eq!(line, 2);
                assert_eq!(expected, 7);
                assert_eq!(found, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dest.exists());
        Ok(())
    }

    #[test]
    fn test_commas_inside_fields_are_quoted() -> Result<()> {
        let dir = TempDir::new()?;
        let source = dir.path().join("tollplaza-data.tsv");
        let dest = dir.path().join("tsv_data.csv");
        std::fs::write(&source, "a\tb\tc\td\t2\t1,01\tP1\n")?;

        TsvExtractor::new(&source, &dest).extract()?;

        assert_eq!(
            std::fs::read_to_string(&dest)?,
            "Number of axles,Tollplaza id,Tollplaza code\n2,\"1,01\",P1\n"
        );
        Ok(())
    }
}
