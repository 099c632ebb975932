//! Absolute cell addresses

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;

/// An absolute, zero-based cell address
///
/// Relative and mixed addressing is resolved before an address reaches the
/// graph, so this type carries no `$` flags. Equality is structural and the
/// address is the key into the address mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleCellAddress {
    /// Sheet index
    pub sheet: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: u32,
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
}

impl SimpleCellAddress {
    /// Create a new address
    pub fn new(sheet: u32, col: u32, row: u32) -> Self {
        Self { sheet, col, row }
    }

    /// Parse an A1-style address on the given sheet
    ///
    /// `$` markers are accepted and ignored.
    ///
    /// # Examples
    /// ```
    /// use cellflow_core::SimpleCellAddress;
    ///
    /// let addr = SimpleCellAddress::parse_a1("B3", 0).unwrap();
    /// assert_eq!(addr.col, 1);
    /// assert_eq!(addr.row, 2);
    ///
    /// let addr = SimpleCellAddress::parse_a1("$AA$10", 0).unwrap();
    /// assert_eq!(addr.col, 26);
    /// assert_eq!(addr.row, 9);
    /// ```
    pub fn parse_a1(s: &str, sheet: u32) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        // Column letters
        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }

        if pos == col_start {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[col_start..pos])?;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        // Row number
        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        // Rows are 1-based in A1 notation
        if row == 0 || row > MAX_ROWS {
            return Err(Error::InvalidAddress(format!(
                "row number out of range in '{}'",
                s
            )));
        }

        Ok(Self::new(sheet, col, row - 1))
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col as u64 + 1;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u64 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
            if col > MAX_COLS as u64 {
                return Err(Error::InvalidAddress(format!(
                    "column '{}' out of range",
                    letters
                )));
            }
        }

        Ok((col - 1) as u32)
    }

    /// Shift by signed column/row deltas; `None` if the result would be negative
    pub fn offset(&self, col_delta: i64, row_delta: i64) -> Option<Self> {
        let col = u32::try_from(self.col as i64 + col_delta).ok()?;
        let row = u32::try_from(self.row as i64 + row_delta).ok()?;
        Some(Self::new(self.sheet, col, row))
    }

    /// Format as A1-style string (sheet is not rendered)
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row as u64 + 1)
    }
}

impl fmt::Display for SimpleCellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}
