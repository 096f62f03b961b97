//! Cell and range address notation.
//!
//! Converts zero-based coordinates to and from the textual notation used by
//! spreadsheet tools: `['file'#][$]Table.[$]Col[$]Row` for a cell and
//! `Addr1:Addr2` for a range. Rows and columns are 1-based in the text and
//! 0-based everywhere else in this crate.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::config::{MAX_COLUMNS, MAX_ROWS};

/// Longest column name accepted by the parser (XFD).
const MAX_COLUMN_LETTERS: usize = 3;

/// What went wrong while parsing address text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressErrorKind {
    #[error("empty address")]
    Empty,
    #[error("unterminated quoted name")]
    UnterminatedQuote,
    #[error("unescaped apostrophe in table name")]
    UnescapedQuote,
    #[error("expected '#' or '.' after quoted name")]
    ExpectedSeparator,
    #[error("expected a column letter")]
    ExpectedLetter,
    #[error("expected a row digit")]
    ExpectedDigit,
    #[error("column exceeds the maximum")]
    ColumnOverflow,
    #[error("row exceeds the maximum")]
    RowOverflow,
    #[error("row numbers start at 1")]
    ZeroRow,
    #[error("expected ':' between range ends")]
    ExpectedRangeSeparator,
    #[error("unexpected trailing characters")]
    TrailingCharacters,
}

/// Address parse failure with the offending character offset.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct AddressError {
    pub offset: usize,
    pub kind: AddressErrorKind,
}

impl AddressError {
    fn at(offset: usize, kind: AddressErrorKind) -> Self {
        AddressError { offset, kind }
    }
}

/// Convert a zero-based column index to letters (0 -> "A", 26 -> "AA").
pub fn column_to_letters(column: u32) -> String {
    let mut letters = Vec::with_capacity(MAX_COLUMN_LETTERS);
    let mut col = column;
    while col >= 26 {
        letters.push(b'A' + (col % 26) as u8);
        col = col / 26 - 1;
    }
    letters.push(b'A' + col as u8);
    letters.reverse();
    // only ASCII capitals were pushed
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert column letters to a zero-based index. Case-insensitive.
pub fn letters_to_column(letters: &str) -> Result<u32, AddressError> {
    let mut scanner = Scanner::new(letters);
    let column = scanner.column()?;
    scanner.expect_end()?;
    Ok(column)
}

/// Format a zero-based coordinate as a relative cell name, e.g. `B3`.
pub fn format_cell(row: u32, column: u32) -> String {
    let mut out = column_to_letters(column);
    out.push_str(itoa::Buffer::new().format(row as u64 + 1));
    out
}

/// Format a relative range, e.g. `A1:C4`.
pub fn format_range(row1: u32, column1: u32, row2: u32, column2: u32) -> String {
    format!("{}:{}", format_cell(row1, column1), format_cell(row2, column2))
}

/// A single cell reference, optionally qualified by table and file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub file: Option<String>,
    pub table: Option<String>,
    pub row: u32,
    pub column: u32,
    pub absolute_table: bool,
    pub absolute_row: bool,
    pub absolute_column: bool,
}

impl CellAddress {
    /// Relative reference to a zero-based coordinate.
    pub fn new(row: u32, column: u32) -> Self {
        CellAddress {
            row,
            column,
            ..Default::default()
        }
    }

    pub fn with_table<S: Into<String>>(mut self, table: S) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_file<S: Into<String>>(mut self, file: S) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Mark the table, row and column as absolute (`$`).
    pub fn absolute(mut self) -> Self {
        self.absolute_table = true;
        self.absolute_row = true;
        self.absolute_column = true;
        self
    }

    pub fn with_absolute(mut self, table: bool, row: bool, column: bool) -> Self {
        self.absolute_table = table;
        self.absolute_row = row;
        self.absolute_column = column;
        self
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "'{}'#", file.replace('\'', "''"))?;
        }
        if let Some(table) = &self.table {
            if self.absolute_table {
                f.write_str("$")?;
            }
            write_table_name(f, table)?;
            f.write_str(".")?;
        }
        if self.absolute_column {
            f.write_str("$")?;
        }
        f.write_str(&column_to_letters(self.column))?;
        if self.absolute_row {
            f.write_str("$")?;
        }
        write!(f, "{}", self.row as u64 + 1)
    }
}

impl FromStr for CellAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_address(s)
    }
}

/// A rectangular range between two cell references.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RangeAddress {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl RangeAddress {
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        RangeAddress { start, end }
    }

    /// Range over zero-based corners within one table, all parts absolute.
    pub fn in_table(table: &str, row1: u32, column1: u32, row2: u32, column2: u32) -> Self {
        RangeAddress {
            start: CellAddress::new(row1, column1).with_table(table).absolute(),
            end: CellAddress::new(row2, column2).with_table(table).absolute(),
        }
    }

    /// Top-left and bottom-right corners as `(row, column)` pairs.
    pub fn normalized(&self) -> ((u32, u32), (u32, u32)) {
        (
            (self.start.row.min(self.end.row), self.start.column.min(self.end.column)),
            (self.start.row.max(self.end.row), self.start.column.max(self.end.column)),
        )
    }

    /// Table the range belongs to, taken from whichever end names one.
    pub fn table(&self) -> Option<&str> {
        self.start.table.as_deref().or(self.end.table.as_deref())
    }
}

impl fmt::Display for RangeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for RangeAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_range(s)
    }
}

/// Parse `['file'#][$]Table.[$]Col[$]Row`.
pub fn parse_address(text: &str) -> Result<CellAddress, AddressError> {
    let mut scanner = Scanner::new(text);
    if scanner.at_end() {
        return Err(AddressError::at(0, AddressErrorKind::Empty));
    }
    let address = scanner.address()?;
    scanner.expect_end()?;
    Ok(address)
}

/// Parse `Addr1:Addr2`. The second end may omit the table (`.B2` or `B2`).
pub fn parse_range(text: &str) -> Result<RangeAddress, AddressError> {
    let mut scanner = Scanner::new(text);
    if scanner.at_end() {
        return Err(AddressError::at(0, AddressErrorKind::Empty));
    }
    let start = scanner.address()?;
    if !scanner.eat(':') {
        return Err(AddressError::at(scanner.pos, AddressErrorKind::ExpectedRangeSeparator));
    }
    let end = scanner.address()?;
    scanner.expect_end()?;
    Ok(RangeAddress { start, end })
}

fn needs_quotes(table: &str) -> bool {
    let mut chars = table.chars();
    match chars.next() {
        None => true,
        Some(first) if first.is_ascii_digit() => true,
        Some(first) => {
            !(first.is_alphanumeric() || first == '_')
                || chars.any(|c| !(c.is_alphanumeric() || c == '_'))
        }
    }
}

fn write_table_name(f: &mut fmt::Formatter<'_>, table: &str) -> fmt::Result {
    if needs_quotes(table) {
        write!(f, "'{}'", table.replace('\'', "''"))
    } else {
        f.write_str(table)
    }
}

/// Character-level state machine over address text.
struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(text: &str) -> Self {
        Scanner {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_end(&self) -> Result<(), AddressError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(AddressError::at(self.pos, AddressErrorKind::TrailingCharacters))
        }
    }

    fn address(&mut self) -> Result<CellAddress, AddressError> {
        let mut address = CellAddress::default();

        if self.peek() == Some('\'') {
            let name = self.quoted()?;
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    address.file = Some(name);
                }
                Some('.') => {
                    self.pos += 1;
                    address.table = Some(name);
                    self.cell(&mut address)?;
                    return Ok(address);
                }
                _ => return Err(AddressError::at(self.pos, AddressErrorKind::ExpectedSeparator)),
            }
        }

        self.table(&mut address)?;
        self.cell(&mut address)?;
        Ok(address)
    }

    /// Optional `[$]Table.` prefix. Leaves the position untouched when the
    /// remaining text has no table part.
    fn table(&mut self, address: &mut CellAddress) -> Result<(), AddressError> {
        let save = self.pos;
        let absolute = self.eat('$');

        if self.peek() == Some('\'') {
            let name = self.quoted()?;
            if !self.eat('.') {
                return Err(AddressError::at(self.pos, AddressErrorKind::ExpectedSeparator));
            }
            address.table = Some(name);
            address.absolute_table = absolute;
            return Ok(());
        }

        let dot = self.chars[self.pos..]
            .iter()
            .take_while(|&&c| c != ':')
            .position(|&c| c == '.');
        let Some(len) = dot else {
            self.pos = save;
            return Ok(());
        };

        let name: String = self.chars[self.pos..self.pos + len].iter().collect();
        if let Some(quote) = name.chars().position(|c| c == '\'') {
            return Err(AddressError::at(self.pos + quote, AddressErrorKind::UnescapedQuote));
        }
        self.pos += len + 1;
        if !name.is_empty() {
            address.table = Some(name);
            address.absolute_table = absolute;
        }
        Ok(())
    }

    fn cell(&mut self, address: &mut CellAddress) -> Result<(), AddressError> {
        address.absolute_column = self.eat('$');
        address.column = self.column()?;
        address.absolute_row = self.eat('$');
        address.row = self.row()?;
        Ok(())
    }

    fn column(&mut self) -> Result<u32, AddressError> {
        let start = self.pos;
        let mut column: u32 = 0;
        while let Some(c) = self.peek() {
            if !c.is_ascii_alphabetic() {
                break;
            }
            if self.pos - start == MAX_COLUMN_LETTERS {
                return Err(AddressError::at(start, AddressErrorKind::ColumnOverflow));
            }
            let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
            column = column * 26 + digit;
            self.pos += 1;
        }
        if self.pos == start {
            return Err(AddressError::at(start, AddressErrorKind::ExpectedLetter));
        }
        if column > MAX_COLUMNS {
            return Err(AddressError::at(start, AddressErrorKind::ColumnOverflow));
        }
        Ok(column - 1)
    }

    fn row(&mut self) -> Result<u32, AddressError> {
        let start = self.pos;
        let mut row: u32 = 0;
        while let Some(c) = self.peek() {
            let Some(digit) = c.to_digit(10) else {
                break;
            };
            row = row
                .checked_mul(10)
                .and_then(|r| r.checked_add(digit))
                .filter(|&r| r <= MAX_ROWS)
                .ok_or(AddressError::at(start, AddressErrorKind::RowOverflow))?;
            self.pos += 1;
        }
        if self.pos == start {
            return Err(AddressError::at(start, AddressErrorKind::ExpectedDigit));
        }
        if row == 0 {
            return Err(AddressError::at(start, AddressErrorKind::ZeroRow));
        }
        Ok(row - 1)
    }

    /// Consume a single-quoted name, unescaping doubled apostrophes.
    fn quoted(&mut self) -> Result<String, AddressError> {
        let open = self.pos;
        self.pos += 1;
        let mut name = String::new();
        loop {
            match self.peek() {
                None => return Err(AddressError::at(open, AddressErrorKind::UnterminatedQuote)),
                Some('\'') => {
                    if self.chars.get(self.pos + 1) == Some(&'\'') {
                        name.push('\'');
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                        return Ok(name);
                    }
                }
                Some(c) => {
                    name.push(c);
                    self.pos += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(column_to_letters(0), "A");
        assert_eq!(column_to_letters(25), "Z");
        assert_eq!(column_to_letters(26), "AA");
        assert_eq!(column_to_letters(27), "AB");
        assert_eq!(column_to_letters(701), "ZZ");
        assert_eq!(column_to_letters(702), "AAA");
        assert_eq!(column_to_letters(16383), "XFD");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(letters_to_column("A").unwrap(), 0);
        assert_eq!(letters_to_column("ab").unwrap(), 27);
        assert_eq!(letters_to_column("XFD").unwrap(), 16383);
        assert!(letters_to_column("XFE").is_err());
        assert!(letters_to_column("AAAA").is_err());
        assert!(letters_to_column("A1").is_err());
    }

    #[test]
    fn test_format_cell_and_range() {
        assert_eq!(format_cell(0, 0), "A1");
        assert_eq!(format_cell(0, 27), "AB1");
        assert_eq!(format_range(0, 0, 9, 2), "A1:C10");
    }

    #[test]
    fn test_column_roundtrip() {
        for col in 0..MAX_COLUMNS {
            assert_eq!(letters_to_column(&column_to_letters(col)).unwrap(), col);
        }
    }

    #[test]
    fn test_parse_absolute_cell() {
        let a = parse_address("$B$3").unwrap();
        assert_eq!((a.row, a.column), (2, 1));
        assert!(a.absolute_row && a.absolute_column);
        assert!(a.table.is_none());
    }

    #[test]
    fn test_parse_table_and_file() {
        let a = parse_address("$Sheet1.$B$3").unwrap();
        assert_eq!(a.table.as_deref(), Some("Sheet1"));
        assert!(a.absolute_table);
        assert_eq!(a.to_string(), "$Sheet1.$B$3");

        let a = parse_address("'file:///tmp/a.ods'#'My ''Data'''.C10").unwrap();
        assert_eq!(a.file.as_deref(), Some("file:///tmp/a.ods"));
        assert_eq!(a.table.as_deref(), Some("My 'Data'"));
        assert_eq!((a.row, a.column), (9, 2));
        assert_eq!(a.to_string(), "'file:///tmp/a.ods'#'My ''Data'''.C10");
    }

    #[test]
    fn test_parse_errors_carry_offset() {
        assert_eq!(
            parse_address("1A").unwrap_err(),
            AddressError::at(0, AddressErrorKind::ExpectedLetter)
        );
        assert_eq!(
            parse_address("AB").unwrap_err(),
            AddressError::at(2, AddressErrorKind::ExpectedDigit)
        );
        assert_eq!(
            parse_address("B3x").unwrap_err(),
            AddressError::at(2, AddressErrorKind::TrailingCharacters)
        );
        assert_eq!(
            parse_address("'file.ods#A1").unwrap_err(),
            AddressError::at(0, AddressErrorKind::UnterminatedQuote)
        );
        assert_eq!(
            parse_address("It's.A1").unwrap_err(),
            AddressError::at(2, AddressErrorKind::UnescapedQuote)
        );
        assert_eq!(
            parse_address("'x'A1").unwrap_err(),
            AddressError::at(3, AddressErrorKind::ExpectedSeparator)
        );
        assert_eq!(
            parse_address("A0").unwrap_err(),
            AddressError::at(1, AddressErrorKind::ZeroRow)
        );
        assert_eq!(parse_address("").unwrap_err().kind, AddressErrorKind::Empty);
        assert_eq!(
            parse_address("A99999999999").unwrap_err().kind,
            AddressErrorKind::RowOverflow
        );
    }

    #[test]
    fn test_parse_range() {
        let r = parse_range("$Sheet1.$A$1:.$C$4").unwrap();
        assert_eq!(r.start.table.as_deref(), Some("Sheet1"));
        assert!(r.end.table.is_none());
        assert_eq!(r.normalized(), ((0, 0), (3, 2)));
        assert_eq!(r.table(), Some("Sheet1"));

        let r = parse_range("B5:A1").unwrap();
        assert_eq!(r.normalized(), ((0, 0), (4, 1)));

        assert_eq!(
            parse_range("A1:2B").unwrap_err(),
            AddressError::at(3, AddressErrorKind::ExpectedLetter)
        );
        assert_eq!(
            parse_range("A1").unwrap_err(),
            AddressError::at(2, AddressErrorKind::ExpectedRangeSeparator)
        );
    }

    #[test]
    fn test_range_display_quotes_table() {
        let r = RangeAddress::in_table("My Sheet", 0, 0, 2, 1);
        assert_eq!(r.to_string(), "$'My Sheet'.$A$1:$'My Sheet'.$B$3");
        assert_eq!(parse_range(&r.to_string()).unwrap(), r);
    }

    #[test]
    fn test_roundtrip_grid() {
        for row in (0..10_000).step_by(97) {
            for col in (0..10_000).step_by(89) {
                let text = CellAddress::new(row, col).to_string();
                let parsed = parse_address(&text).unwrap();
                assert_eq!((parsed.row, parsed.column), (row, col), "{}", text);
            }
        }
    }
}
