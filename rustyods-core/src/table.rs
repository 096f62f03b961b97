//! Tables, rows and cells.
//!
//! A table stores its rows in a [`SparseVec`], and every row stores its cells
//! the same way, so only the span up to the last non-blank element of each
//! dimension is ever allocated. In streaming mode the rows that were already
//! written out are dropped from the front of the sequence and `row_offset`
//! keeps absolute row numbers stable.

use std::sync::{Arc, OnceLock};

use log::debug;

use crate::address::{format_cell, RangeAddress};
use crate::config::OdsConfig;
use crate::error::{Result, RustyodsError};
use crate::sparse::{Blank, SparseVec};
use crate::style::defaults::DEFAULT_TABLE_STYLE;
use crate::value::CellValue;

/// Rarely used per-cell data, boxed to keep `Cell` small.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct CellExtras {
    pub(crate) tooltip: Option<String>,
    pub(crate) validation: Option<Arc<str>>,
    pub(crate) attributes: Vec<(String, String)>,
}

/// One cell of a table.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub(crate) value: CellValue,
    /// Visual style chosen by the caller.
    pub(crate) style: Option<Arc<str>>,
    /// Data style chosen by the caller.
    pub(crate) data_style: Option<Arc<str>>,
    /// Style written to the document: the visual style, or the child style
    /// binding it to a data style.
    pub(crate) rendered_style: Option<Arc<str>>,
    pub(crate) rows_spanned: u32,
    pub(crate) columns_spanned: u32,
    pub(crate) covered: bool,
    pub(crate) extras: Option<Box<CellExtras>>,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            value: CellValue::Void,
            style: None,
            data_style: None,
            rendered_style: None,
            rows_spanned: 1,
            columns_spanned: 1,
            covered: false,
            extras: None,
        }
    }
}

impl Blank for Cell {
    fn is_blank(&self) -> bool {
        self.value.is_void()
            && self.style.is_none()
            && self.data_style.is_none()
            && self.rendered_style.is_none()
            && !self.is_merge_anchor()
            && !self.covered
            && self.extras.is_none()
    }
}

impl Cell {
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn data_style(&self) -> Option<&str> {
        self.data_style.as_deref()
    }

    /// Name of the style referenced from the written cell.
    pub fn rendered_style(&self) -> Option<&str> {
        self.rendered_style.as_deref()
    }

    /// Merge span as (rows, columns).
    pub fn span(&self) -> (u32, u32) {
        (self.rows_spanned, self.columns_spanned)
    }

    pub fn is_merge_anchor(&self) -> bool {
        self.rows_spanned > 1 || self.columns_spanned > 1
    }

    /// Whether another cell's merge hides this one.
    pub fn is_covered(&self) -> bool {
        self.covered
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.extras.as_ref().and_then(|e| e.tooltip.as_deref())
    }

    pub fn validation(&self) -> Option<&str> {
        self.extras.as_ref().and_then(|e| e.validation.as_deref())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        self.extras.as_ref().map(|e| e.attributes.as_slice()).unwrap_or(&[])
    }

    pub(crate) fn extras_mut(&mut self) -> &mut CellExtras {
        self.extras.get_or_insert_with(Default::default)
    }

    /// Drop the extras box once it holds nothing.
    pub(crate) fn compact(&mut self) {
        if self.extras.as_deref().is_some_and(|e| *e == CellExtras::default()) {
            self.extras = None;
        }
    }
}

/// One row of a table.
#[derive(Clone, Debug, Default)]
pub struct Row {
    pub(crate) cells: SparseVec<Cell>,
    pub(crate) style: Option<Arc<str>>,
    pub(crate) default_cell_style: Option<Arc<str>>,
}

impl Blank for Row {
    fn is_blank(&self) -> bool {
        self.cells.is_empty() && self.style.is_none() && self.default_cell_style.is_none()
    }
}

impl Row {
    pub fn cell(&self, column: u32) -> &Cell {
        self.cells.get(column)
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn default_cell_style(&self) -> Option<&str> {
        self.default_cell_style.as_deref()
    }

    /// Number of materialized cells.
    pub fn width(&self) -> u32 {
        self.cells.materialized_len() as u32
    }
}

/// Column declaration: style and default cell style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnSlot {
    pub(crate) style: Option<Arc<str>>,
    pub(crate) default_cell_style: Option<Arc<str>>,
}

impl Blank for ColumnSlot {
    fn is_blank(&self) -> bool {
        self.style.is_none() && self.default_cell_style.is_none()
    }
}

/// Sheet protection, with the key already hashed by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct TableProtection {
    /// Base64 digest of the protection password.
    pub key: String,
    /// Digest algorithm URI, e.g. `http://www.w3.org/2000/09/xmldsig#sha256`.
    pub algorithm: String,
}

impl TableProtection {
    pub fn new<K: Into<String>, A: Into<String>>(key: K, algorithm: A) -> Self {
        TableProtection {
            key: key.into(),
            algorithm: algorithm.into(),
        }
    }
}

/// Whether the `table:table-header-rows` wrapper has been opened or closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum HeaderState {
    #[default]
    Pending,
    Open,
    Closed,
}

/// Validate a table name.
pub fn validate_table_name(name: &str) -> Result<()> {
    let invalid = |reason| RustyodsError::InvalidTableName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.chars().count() > 255 {
        return Err(invalid("name is longer than 255 characters"));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(invalid("name must not start or end with an apostrophe"));
    }
    if name.contains(['[', ']', '*', '?', ':', '/', '\\']) {
        return Err(invalid("name contains one of [ ] * ? : / \\"));
    }
    Ok(())
}

/// A named table (sheet).
#[derive(Clone, Debug)]
pub struct Table {
    name: String,
    pub(crate) style: Arc<str>,
    pub(crate) rows: SparseVec<Row>,
    pub(crate) columns: SparseVec<ColumnSlot>,
    /// Rows before this index were written out and dropped.
    pub(crate) row_offset: u32,
    max_rows: u32,
    max_columns: u32,
    pub(crate) header_rows: u32,
    pub(crate) frozen_rows: u32,
    pub(crate) frozen_columns: u32,
    pub(crate) protection: Option<TableProtection>,
    pub(crate) autofilters: Vec<RangeAddress>,
    pub(crate) header_written: bool,
    pub(crate) header_state: HeaderState,
    pub(crate) closed: bool,
}

impl Table {
    pub fn new<S: Into<String>>(name: S, config: &OdsConfig) -> Result<Self> {
        let name = name.into();
        validate_table_name(&name)?;
        debug!("creating table '{}'", name);
        Ok(Table {
            name,
            style: Arc::from(DEFAULT_TABLE_STYLE),
            rows: SparseVec::new(config.max_rows),
            columns: SparseVec::new(config.max_columns),
            row_offset: 0,
            max_rows: config.max_rows,
            max_columns: config.max_columns,
            header_rows: 0,
            frozen_rows: 0,
            frozen_columns: 0,
            protection: None,
            autofilters: Vec::new(),
            header_written: false,
            header_state: HeaderState::Pending,
            closed: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn max_rows(&self) -> u32 {
        self.max_rows
    }

    pub fn max_columns(&self) -> u32 {
        self.max_columns
    }

    /// Cell at a coordinate; blank for anything never written or already flushed.
    pub fn cell(&self, row: u32, column: u32) -> &Cell {
        match row.checked_sub(self.row_offset) {
            Some(local) => self.rows.get(local).cell(column),
            None => blank_cell(),
        }
    }

    pub fn value(&self, row: u32, column: u32) -> &CellValue {
        &self.cell(row, column).value
    }

    pub fn row(&self, row: u32) -> Option<&Row> {
        let local = row.checked_sub(self.row_offset)?;
        Some(self.rows.get(local))
    }

    /// One past the last non-blank row, counting flushed rows.
    pub fn row_count(&self) -> u32 {
        self.row_offset + self.rows.materialized_len() as u32
    }

    /// Widest materialized extent over rows and column declarations.
    pub fn column_count(&self) -> u32 {
        self.rows
            .iter()
            .map(Row::width)
            .chain(std::iter::once(self.columns.materialized_len() as u32))
            .max()
            .unwrap_or(0)
    }

    /// Rows still held in memory.
    pub fn buffered_rows(&self) -> usize {
        self.rows.materialized_len()
    }

    /// Number of leading rows repeated on every printed page.
    pub fn set_header_rows(&mut self, rows: u32) {
        self.header_rows = rows;
    }

    pub fn header_rows(&self) -> u32 {
        self.header_rows
    }

    /// Freeze the first `rows` rows and `columns` columns when viewed.
    pub fn freeze_panes(&mut self, rows: u32, columns: u32) {
        self.frozen_rows = rows;
        self.frozen_columns = columns;
    }

    pub fn frozen_panes(&self) -> (u32, u32) {
        (self.frozen_rows, self.frozen_columns)
    }

    pub fn protect(&mut self, protection: TableProtection) {
        self.protection = Some(protection);
    }

    pub fn protection(&self) -> Option<&TableProtection> {
        self.protection.as_ref()
    }

    /// Add an autofilter over the rectangle between two zero-based corners.
    pub fn add_autofilter(&mut self, row1: u32, column1: u32, row2: u32, column2: u32) -> Result<()> {
        for (row, column) in [(row1, column1), (row2, column2)] {
            self.check_bounds(row, column)?;
        }
        self.autofilters
            .push(RangeAddress::in_table(&self.name, row1, column1, row2, column2));
        Ok(())
    }

    pub fn autofilters(&self) -> &[RangeAddress] {
        &self.autofilters
    }

    pub(crate) fn check_bounds(&self, row: u32, column: u32) -> Result<()> {
        if row >= self.max_rows {
            return Err(RustyodsError::IndexOutOfBounds {
                index: row,
                max: self.max_rows - 1,
            });
        }
        if column >= self.max_columns {
            return Err(RustyodsError::IndexOutOfBounds {
                index: column,
                max: self.max_columns - 1,
            });
        }
        Ok(())
    }

    fn local_row(&self, row: u32) -> Result<u32> {
        if self.closed || row < self.row_offset {
            return Err(RustyodsError::RowFlushed {
                table: self.name.clone(),
                row,
            });
        }
        Ok(row - self.row_offset)
    }

    pub(crate) fn row_mut(&mut self, row: u32) -> Result<&mut Row> {
        self.check_bounds(row, 0)?;
        let local = self.local_row(row)?;
        self.rows.entry(local)
    }

    pub(crate) fn cell_mut(&mut self, row: u32, column: u32) -> Result<&mut Cell> {
        self.check_bounds(row, column)?;
        let local = self.local_row(row)?;
        self.rows.entry(local)?.cells.entry(column)
    }

    pub(crate) fn column_mut(&mut self, column: u32) -> Result<&mut ColumnSlot> {
        self.check_bounds(0, column)?;
        self.columns.entry(column)
    }

    /// Prune blanks left behind after mutating `row`.
    pub(crate) fn trim_row(&mut self, row: u32) {
        if let Some(local) = row.checked_sub(self.row_offset) {
            if let Some(r) = self.rows.get_mut(local) {
                r.cells.trim();
            }
        }
        self.rows.trim();
        self.columns.trim();
    }

    /// Declare a merge anchored at (`row`, `column`) and mark the other cells
    /// of the rectangle as covered. A 1x1 span removes the merge.
    pub(crate) fn merge(&mut self, row: u32, column: u32, rows: u32, columns: u32) -> Result<()> {
        let rows = rows.max(1);
        let columns = columns.max(1);
        let anchor = self.cell(row, column);
        if anchor.covered {
            return Err(RustyodsError::CoveredCell(format_cell(row, column)));
        }
        let last_row = row.saturating_add(rows - 1);
        let last_column = column.saturating_add(columns - 1);
        self.check_bounds(last_row, last_column)?;
        self.local_row(row)?;

        let (old_rows, old_columns) = anchor.span();
        let in_old = |r: u32, c: u32| r < row + old_rows && c < column + old_columns;
        for r in row..=last_row {
            for c in column..=last_column {
                if (r, c) == (row, column) {
                    continue;
                }
                let other = self.cell(r, c);
                if other.is_merge_anchor() || (other.covered && !in_old(r, c)) {
                    return Err(RustyodsError::MergeOverlap {
                        anchor: format_cell(row, column),
                        other: format_cell(r, c),
                    });
                }
            }
        }

        self.set_covered(row, column, old_rows, old_columns, false)?;
        self.set_covered(row, column, rows, columns, true)?;
        let cell = self.cell_mut(row, column)?;
        cell.rows_spanned = rows;
        cell.columns_spanned = columns;
        for r in row..=last_row.max(row + old_rows - 1) {
            self.trim_row(r);
        }
        Ok(())
    }

    fn set_covered(&mut self, row: u32, column: u32, rows: u32, columns: u32, covered: bool) -> Result<()> {
        for r in row..row + rows {
            for c in column..column + columns {
                if (r, c) == (row, column) {
                    continue;
                }
                if !covered && self.cell(r, c).is_blank() {
                    continue;
                }
                self.cell_mut(r, c)?.covered = covered;
            }
        }
        Ok(())
    }

    /// Remove the rows before `upto` from memory and return them.
    pub(crate) fn take_rows_before(&mut self, upto: u32) -> Vec<Row> {
        if upto <= self.row_offset {
            return Vec::new();
        }
        let count = (upto - self.row_offset) as usize;
        let taken = self.rows.take_front(count);
        self.row_offset = upto;
        taken
    }
}

fn blank_cell() -> &'static Cell {
    static BLANK: OnceLock<Cell> = OnceLock::new();
    BLANK.get_or_init(Cell::default)
}

/// Document-level named range (`table:named-range`).
#[derive(Clone, Debug, PartialEq)]
pub struct NamedRange {
    pub name: String,
    pub range: RangeAddress,
}

/// Content validation rule that cells reference by name.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentValidation {
    pub name: String,
    /// Condition, e.g. `of:cell-content-is-whole-number() and of:cell-content()>0`.
    pub condition: String,
    pub allow_empty: bool,
    pub base_cell: Option<crate::address::CellAddress>,
    pub error_message: Option<String>,
}

impl ContentValidation {
    pub fn new<N: Into<String>, C: Into<String>>(name: N, condition: C) -> Self {
        ContentValidation {
            name: name.into(),
            condition: condition.into(),
            allow_empty: true,
            base_cell: None,
            error_message: None,
        }
    }

    pub fn with_allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    pub fn with_base_cell(mut self, address: crate::address::CellAddress) -> Self {
        self.base_cell = Some(address);
        self
    }

    pub fn with_error_message<S: Into<String>>(mut self, message: S) -> Self {
        self.error_message = Some(message.into());
        self
    }
}
