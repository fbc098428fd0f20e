use crate::error::Result;
use crate::extractors::open_source;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use csv::StringRecord;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// One physical row of a delimited source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRow {
    /// An empty line, which `csv::Reader` would skip silently.
    Blank,
    Record(StringRecord),
}

/// Line-oriented delimited reader that reports blank lines instead of
/// dropping them.
///
/// Lines containing quotes go through the `csv` parser; a quoted field that
/// spans lines is joined until its quotes balance.
pub struct DelimitedLines {
    lines: Lines<BufReader<File>>,
    delimiter: u8,
    line: u64,
}

impl DelimitedLines {
    pub fn open(path: &Path, delimiter: u8) -> Result<Self> {
        let file = open_source(path)?;
        Ok(Self {
            lines: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file).lines(),
            delimiter,
            line: 0,
        })
    }

    /// Next row with the 1-based line it starts on, or `None` at end of input.
    pub fn next_row(&mut self) -> Result<Option<(u64, SourceRow)>> {
        let mut pending = String::new();
        let mut start = 0;

        for line in self.lines.by_ref() {
            let line = line?;
            self.line += 1;
            let text = line.strip_suffix('\r').unwrap_or(line.as_str());

            if pending.is_empty() {
                start = self.line;
                if text.is_empty() {
                    return Ok(Some((start, SourceRow::Blank)));
                }
            } else {
                pending.push('\n');
            }
            pending.push_str(text);

            if pending.matches('"').count() % 2 == 0 {
                return parse(self.delimiter, &pending).map(|row| Some((start, row)));
            }
        }

        // Unterminated quote at end of input: let the parser close it
        if pending.is_empty() {
            Ok(None)
        } else {
            parse(self.delimiter, &pending).map(|row| Some((start, row)))
        }
    }

}

fn parse(delimiter: u8, text: &str) -> Result<SourceRow> {
    if !text.contains('"') {
        let fields: Vec<&str> = text.split(char::from(delimiter)).collect();
        return Ok(SourceRow::Record(StringRecord::from(fields)));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut record = StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(SourceRow::Record(record))
}
