use crate::error::{ProcessingError, Result};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// CSV writer that stages rows in a temporary file next to the destination
/// and renames it into place on [`commit`](Self::commit).
///
/// Dropping the writer without committing deletes the temporary file, so a
/// failed stage never leaves a partial output under the destination name.
pub struct AtomicCsvWriter {
    destination: PathBuf,
    writer: csv::Writer<NamedTempFile>,
    rows_written: usize,
}

impl AtomicCsvWriter {
    pub fn create<I, T>(destination: &Path, header: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| ProcessingError::write(destination, e))?;

        let temp = tempfile::Builder::new()
            .prefix(".toll-etl-")
            .suffix(".partial")
            .tempfile_in(dir)
            .map_err(|e| ProcessingError::write(destination, e))?;

        // Rows shorter than the header are written as-is
        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .from_writer(temp);

        let mut this = Self {
            destination: destination.to_path_buf(),
            writer,
            rows_written: 0,
        };
        if let Err(e) = this.writer.write_record(header) {
            return Err(this.write_error(e));
        }
        Ok(this)
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn write_row<I, T>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        if let Err(e) = self.writer.write_record(row) {
            return Err(self.write_error(e));
        }
        self.rows_written += 1;
        Ok(())
    }

    /// Write an empty line. `write_row` with no fields would emit `""`,
    /// which reads back as a one-field record.
    pub fn write_blank_row(&mut self) -> Result<()> {
        let flushed = self.writer.flush().and_then(|_| {
            let mut file: &File = self.writer.get_ref().as_file();
            file.write_all(b"\n")
        });
        flushed.map_err(|e| ProcessingError::write(&self.destination, e))?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush, fsync and atomically move the output into place. Returns the
    /// number of data rows written.
    pub fn commit(self) -> Result<usize> {
        let Self {
            destination,
            writer,
            rows_written,
        } = self;

        let temp = writer
            .into_inner()
            .map_err(|e| {
                let source = std::io::Error::new(e.error().kind(), e.error().to_string());
                ProcessingError::write(&destination, source)
            })?;
        temp.as_file()
            .sync_all()
            .map_err(|e| ProcessingError::write(&destination, e))?;
        temp.persist(&destination)
            .map_err(|e| ProcessingError::write(&destination, e.error))?;

        debug!(path = %destination.display(), rows = rows_written, "committed output");
        Ok(rows_written)
    }

    fn write_error(&self, err: csv::Error) -> ProcessingError {
        match err.into_kind() {
            csv::ErrorKind::Io(source) => ProcessingError::write(&self.destination, source),
            kind => ProcessingError::write(
                &self.destination,
                std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{:?}", kind)),
            ),
        }
    }
}
