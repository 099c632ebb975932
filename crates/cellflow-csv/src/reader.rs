//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvReadOptions;

/// Raw sheet content: one `Vec` per row, one string per cell
pub type RawSheet = Vec<Vec<String>>;

/// CSV reader producing raw sheet content
///
/// Fields are kept as text; classification into numbers, text and formulas
/// happens when the engine loads the sheet. Records may have different
/// lengths.
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a raw sheet
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<RawSheet> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV text into a raw sheet
    pub fn read_str(text: &str, options: &CsvReadOptions) -> CsvResult<RawSheet> {
        Self::read(text.as_bytes(), options)
    }

    /// Read CSV from a reader into a raw sheet
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<RawSheet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .flexible(true)
            .trim(if options.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .from_reader(reader);

        let mut sheet = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            sheet.push(record.iter().map(str::to_string).collect());
        }

        Ok(sheet)
    }
}
