pub mod csv_extractor;
pub mod delimited;
pub mod fixed_width_extractor;
pub mod tsv_extractor;

pub use csv_extractor::CsvExtractor;
pub use delimited::{DelimitedLines, SourceRow};
pub use fixed_width_extractor::{slice_field, FixedWidthExtractor};
pub use tsv_extractor::TsvExtractor;

use crate::error::{ProcessingError, Result};
use std::fs::File;
use std::path::Path;

/// Open a stage input, reporting absence or permission problems as
/// `MissingInput`.
pub(crate) fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| ProcessingError::missing_input(path, e))
}
