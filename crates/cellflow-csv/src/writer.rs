//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{CsvWriteOptions, LineTerminator};
use cellflow_core::CellValue;

/// CSV writer for grids of computed values
pub struct CsvWriter;

impl CsvWriter {
    /// Write a value grid to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        values: &[Vec<CellValue>],
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(values, file, options)
    }

    /// Render a value grid to a CSV string
    pub fn write_string(values: &[Vec<CellValue>], options: &CsvWriteOptions) -> CsvResult<String> {
        let mut buffer = Vec::new();
        Self::write(values, &mut buffer, options)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Write a value grid to a writer
    ///
    /// Each value is rendered with its display form: whole numbers without a
    /// fraction, booleans as TRUE/FALSE, errors by their English spelling.
    pub fn write<W: Write>(
        values: &[Vec<CellValue>],
        writer: W,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
            LineTerminator::CR => csv::Terminator::Any(b'\r'),
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .flexible(true)
            .from_writer(writer);

        for row in values {
            let record: Vec<String> = row.iter().map(CellValue::to_string).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
