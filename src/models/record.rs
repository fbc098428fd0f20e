use crate::error::{ProcessingError, Result};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Named-column view over a header-bearing intermediate file.
///
/// Column positions are resolved once from the header so that per-row
/// lookups are by name without a per-row hash.
#[derive(Debug, Clone)]
pub struct ColumnLookup {
    indices: Vec<usize>,
}

impl ColumnLookup {
    pub fn resolve(artifact: &str, header: &StringRecord, columns: &[&str]) -> Result<Self> {
        let indices = columns
            .iter()
            .map(|column| {
                header
                    .iter()
                    .position(|h| h == *column)
                    .ok_or_else(|| ProcessingError::SchemaMismatch {
                        artifact: artifact.to_string(),
                        column: column.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { indices })
    }

    /// Values of the resolved columns in lookup order. A row shorter than
    /// its header yields empty strings for the absent fields.
    pub fn project<'r>(&'r self, row: &'r StringRecord) -> impl Iterator<Item = &'r str> + 'r {
        self.indices.iter().map(move |&i| row.get(i).unwrap_or(""))
    }

    pub fn position(&self, nth: usize) -> Option<usize> {
        self.indices.get(nth).copied()
    }
}

/// Outcome of one stage run, reported to the orchestrator and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: String,
    pub rows_read: usize,
    pub rows_written: usize,
    pub output: PathBuf,
}

impl StageReport {
    pub fn new(stage: &str, rows_read: usize, rows_written: usize, output: PathBuf) -> Self {
        Self {
            stage: stage.to_string(),
            rows_read,
            rows_written,
            output,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: read {} rows, wrote {} rows to {}",
            self.stage,
            self.rows_read,
            self.rows_written,
            self.output.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_ignores_column_order() {
        let header = StringRecord::from(vec!["b", "a", "c"]);
        let lookup = ColumnLookup::resolve("test", &header, &["a", "c"]).unwrap();

        let row = StringRecord::from(vec!["2", "1", "3"]);
        let values: Vec<&str> = lookup.project(&row).collect();
        assert_eq!(values, vec!["1", "3"]);
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let header = StringRecord::from(vec!["a"]);
        let err = ColumnLookup::resolve("csv extract", &header, &["a", "b"]).unwrap_err();

        match err {
            ProcessingError::SchemaMismatch { artifact, column } => {
                assert_eq!(artifact, "csv extract");
                assert_eq!(column, "b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_projects_empty() {
        let header = StringRecord::from(vec!["a", "b"]);
        let lookup = ColumnLookup::resolve("test", &header, &["a", "b"]).unwrap();

        let row = StringRecord::from(vec!["1"]);
        let values: Vec<&str> = lookup.project(&row).collect();
        assert_eq!(values, vec!["1", ""]);
    }
}
