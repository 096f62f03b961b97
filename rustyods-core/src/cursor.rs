//! Progressive population of a table.
//!
//! A [`TableCursor`] borrows one table together with the document's style
//! container, so that every style a cell references is registered (or, once
//! the container is frozen, checked) at the moment it is used.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};

use crate::address::format_cell;
use crate::error::{Result, RustyodsError};
use crate::streaming::StreamState;
use crate::style::defaults::{data_style_for, DEFAULT_CELL_STYLE};
use crate::style::{DataStyle, OdsStyle, StyleContainer, TableCellStyle, TableColumnStyle, TableRowStyle};
use crate::table::{Cell, Table};
use crate::value::CellValue;

/// Stateful walker over one table.
///
/// Navigation never skips covered cells: a value written to a covered cell is
/// stored but not rendered. Use [`TableCursor::next_uncovered`] to step over
/// merged areas.
pub struct TableCursor<'a> {
    table: &'a mut Table,
    styles: &'a mut StyleContainer,
    stream: Option<&'a mut StreamState>,
    row: u32,
    column: u32,
}

impl<'a> TableCursor<'a> {
    pub(crate) fn new(
        table: &'a mut Table,
        styles: &'a mut StyleContainer,
        stream: Option<&'a mut StreamState>,
    ) -> Self {
        let row = table.row_offset;
        TableCursor {
            table,
            styles,
            stream,
            row,
            column: 0,
        }
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Current position as `A1` text.
    pub fn address(&self) -> String {
        format_cell(self.row, self.column)
    }

    pub fn table(&self) -> &Table {
        &*self.table
    }

    /// Cell under the cursor.
    pub fn cell(&self) -> &Cell {
        self.table.cell(self.row, self.column)
    }

    pub fn value(&self) -> &CellValue {
        &self.cell().value
    }

    // Navigation

    /// Advance one column.
    pub fn next(&mut self) -> Result<&mut Self> {
        let column = self.column + 1;
        self.table.check_bounds(self.row, column)?;
        self.column = column;
        Ok(self)
    }

    /// Advance to the first column of the next row.
    pub fn next_row(&mut self) -> Result<&mut Self> {
        self.to_row(self.row + 1)?;
        self.column = 0;
        Ok(self)
    }

    /// Jump to `column` in the current row.
    pub fn to(&mut self, column: u32) -> Result<&mut Self> {
        self.table.check_bounds(self.row, column)?;
        self.column = column;
        Ok(self)
    }

    /// Jump to `row`, keeping the column.
    pub fn to_row(&mut self, row: u32) -> Result<&mut Self> {
        self.table.check_bounds(row, self.column)?;
        self.row = row;
        self.flush_if_needed()?;
        Ok(self)
    }

    /// Jump to (`row`, `column`).
    pub fn to_cell(&mut self, row: u32, column: u32) -> Result<&mut Self> {
        self.to_row(row)?;
        self.to(column)
    }

    /// Advance one column, then past any covered cells.
    pub fn next_uncovered(&mut self) -> Result<&mut Self> {
        self.next()?;
        while self.cell().is_covered() {
            self.next()?;
        }
        Ok(self)
    }

    fn flush_if_needed(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.as_deref_mut() {
            if self.table.buffered_rows() >= stream.flush_threshold() {
                stream.flush_rows(self.table, self.row)?;
            }
        }
        Ok(())
    }

    // Cell values

    pub fn set_value<V: Into<CellValue>>(&mut self, value: V) -> Result<&mut Self> {
        let value = value.into();
        let cell = self.table.cell(self.row, self.column);
        let rendered = render(self.styles, cell.style.as_ref(), cell.data_style.as_ref(), &value)?;
        self.commit(rendered, |cell| cell.value = value)?;
        Ok(self)
    }

    pub fn set_string_value(&mut self, value: &str) -> Result<&mut Self> {
        self.set_value(value)
    }

    pub fn set_float_value(&mut self, value: f64) -> Result<&mut Self> {
        self.set_value(value)
    }

    pub fn set_boolean_value(&mut self, value: bool) -> Result<&mut Self> {
        self.set_value(value)
    }

    /// Amount in the ISO 4217 `currency`.
    ///
    /// The code is written as `office:currency`, but the default
    /// `currency-data` format displays a euro sign. Other currencies need
    /// their own format, e.g. `DataStyle::currency("usd", 2, "$")` passed to
    /// [`TableCursor::set_data_style`].
    pub fn set_currency_value(&mut self, value: f64, currency: &str) -> Result<&mut Self> {
        self.set_value(CellValue::Currency {
            value,
            currency: currency.to_string(),
        })
    }

    /// Fraction: 0.25 is 25%.
    pub fn set_percentage_value(&mut self, value: f64) -> Result<&mut Self> {
        self.set_value(CellValue::Percentage(value))
    }

    pub fn set_date_value(&mut self, value: NaiveDateTime) -> Result<&mut Self> {
        self.set_value(value)
    }

    pub fn set_time_value(&mut self, value: Duration) -> Result<&mut Self> {
        self.set_value(value)
    }

    /// Formula text such as `=SUM(A1:A3)`.
    pub fn set_formula(&mut self, formula: &str) -> Result<&mut Self> {
        self.set_value(CellValue::Formula(formula.to_string()))
    }

    /// Reset value, styles and extras of the current cell. A merge anchored
    /// here stays in place.
    pub fn clear(&mut self) -> Result<&mut Self> {
        let cell = self.table.cell_mut(self.row, self.column)?;
        cell.value = CellValue::Void;
        cell.style = None;
        cell.data_style = None;
        cell.rendered_style = None;
        cell.extras = None;
        self.table.trim_row(self.row);
        Ok(self)
    }

    // Cell styles

    /// Apply a cell style, registering it on first use.
    pub fn set_style(&mut self, style: &TableCellStyle) -> Result<&mut Self> {
        self.styles.register_if_absent(style)?;
        let name: Arc<str> = Arc::from(style.name());
        let cell = self.table.cell(self.row, self.column);
        let rendered = render(self.styles, Some(&name), cell.data_style.as_ref(), &cell.value)?;
        self.commit(rendered, |cell| cell.style = Some(name))?;
        Ok(self)
    }

    /// Apply a data style, registering it on first use.
    pub fn set_data_style(&mut self, style: &DataStyle) -> Result<&mut Self> {
        self.styles.register_if_absent(style)?;
        let name: Arc<str> = Arc::from(style.name());
        let cell = self.table.cell(self.row, self.column);
        let rendered = render(self.styles, cell.style.as_ref(), Some(&name), &cell.value)?;
        self.commit(rendered, |cell| cell.data_style = Some(name))?;
        Ok(self)
    }

    /// Merge `rows` x `columns` cells anchored at the cursor. A 1x1 span
    /// removes an existing merge.
    pub fn set_cell_merge(&mut self, rows: u32, columns: u32) -> Result<&mut Self> {
        self.table.merge(self.row, self.column, rows, columns)?;
        Ok(self)
    }

    /// Annotation shown when hovering the cell.
    pub fn set_tooltip<S: Into<String>>(&mut self, tooltip: S) -> Result<&mut Self> {
        self.table.cell_mut(self.row, self.column)?.extras_mut().tooltip = Some(tooltip.into());
        Ok(self)
    }

    /// Reference a content validation declared on the document.
    pub fn set_validation(&mut self, name: &str) -> Result<&mut Self> {
        self.table.cell_mut(self.row, self.column)?.extras_mut().validation = Some(Arc::from(name));
        Ok(self)
    }

    /// Extra attribute written verbatim on the cell element.
    pub fn set_attribute<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) -> Result<&mut Self> {
        let name = name.into();
        let value = value.into();
        let extras = self.table.cell_mut(self.row, self.column)?.extras_mut();
        match extras.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => extras.attributes.push((name, value)),
        }
        Ok(self)
    }

    // Rows and columns

    pub fn set_row_style(&mut self, style: &TableRowStyle) -> Result<&mut Self> {
        self.styles.register_if_absent(style)?;
        self.table.row_mut(self.row)?.style = Some(Arc::from(style.name()));
        Ok(self)
    }

    pub fn set_row_default_cell_style(&mut self, style: &TableCellStyle) -> Result<&mut Self> {
        self.styles.register_if_absent(style)?;
        self.table.row_mut(self.row)?.default_cell_style = Some(Arc::from(style.name()));
        Ok(self)
    }

    /// Style of the cursor's column. Fails once the table's columns have
    /// been streamed out.
    pub fn set_column_style(&mut self, style: &TableColumnStyle) -> Result<&mut Self> {
        self.check_columns_open()?;
        self.styles.register_if_absent(style)?;
        self.table.column_mut(self.column)?.style = Some(Arc::from(style.name()));
        Ok(self)
    }

    pub fn set_column_default_cell_style(&mut self, style: &TableCellStyle) -> Result<&mut Self> {
        self.check_columns_open()?;
        self.styles.register_if_absent(style)?;
        self.table.column_mut(self.column)?.default_cell_style = Some(Arc::from(style.name()));
        Ok(self)
    }

    fn check_columns_open(&self) -> Result<()> {
        if self.table.header_written {
            return Err(RustyodsError::RowFlushed {
                table: self.table.name().to_string(),
                row: self.table.row_offset,
            });
        }
        Ok(())
    }

    /// Apply `update` to the current cell along with its new rendered style,
    /// then prune blanks.
    fn commit(&mut self, rendered: Option<Arc<str>>, update: impl FnOnce(&mut Cell)) -> Result<()> {
        let cell = self.table.cell_mut(self.row, self.column)?;
        update(cell);
        cell.rendered_style = rendered;
        cell.compact();
        self.table.trim_row(self.row);
        Ok(())
    }
}

/// Rendered style of a cell holding `value` with the given styles.
///
/// Values whose type has a default data style get it unless the cell names
/// its own. A data style is bound to the visual style through a child style,
/// since cells cannot reference data styles directly.
fn render(
    styles: &mut StyleContainer,
    style: Option<&Arc<str>>,
    data_style: Option<&Arc<str>>,
    value: &CellValue,
) -> Result<Option<Arc<str>>> {
    let data = data_style.map(|d| &**d).or_else(|| data_style_for(value));
    match data {
        Some(data) => {
            let base = style.map_or(DEFAULT_CELL_STYLE, |s| &**s);
            Ok(Some(styles.child_by_name(base, data)?))
        }
        None => Ok(style.cloned()),
    }
}

impl std::fmt::Debug for TableCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableCursor")
            .field("table", &self.table.name())
            .field("row", &self.row)
            .field("column", &self.column)
            .field("streaming", &self.stream.is_some())
            .finish()
    }
}
