//! XML rendering of the document parts.
//!
//! Tables are rendered row by row into `String` buffers. In buffered mode the
//! table bodies are rendered in parallel; in streaming mode the same row
//! renderer is fed one flushed batch at a time.

use chrono::{SecondsFormat, Utc};
use rayon::prelude::*;

use crate::config::Metadata;
use crate::sparse::Blank;
use crate::style::defaults::{DEFAULT_CELL_STYLE, DEFAULT_COLUMN_STYLE};
use crate::style::StyleContainer;
use crate::table::{Cell, ColumnSlot, ContentValidation, HeaderState, NamedRange, Row, Table};
use crate::xml::{push_attr, push_int_attr, push_text_element, DOCUMENT_NAMESPACES, OFFICE_VERSION, XML_PROLOG};

pub(crate) const XML_MEDIA_TYPE: &str = "text/xml";

fn open_root(out: &mut String, root: &str, namespaces: &str) {
    out.push_str(XML_PROLOG);
    out.push('<');
    out.push_str(root);
    out.push_str(namespaces);
    push_attr(out, "office:version", OFFICE_VERSION);
    out.push('>');
}

/// `meta.xml`.
pub(crate) fn meta_xml(metadata: &Metadata, generator: &str) -> String {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut out = String::with_capacity(1024);
    open_root(
        &mut out,
        "office:document-meta",
        concat!(
            " xmlns:office=\"urn:oasis:names:tc:opendocument:xmlns:office:1.0\"",
            " xmlns:meta=\"urn:oasis:names:tc:opendocument:xmlns:meta:1.0\"",
            " xmlns:dc=\"http://purl.org/dc/elements/1.1/\"",
        ),
    );
    out.push_str("<office:meta>");
    push_text_element(&mut out, "meta:generator", generator);
    push_text_element(&mut out, "meta:creation-date", &now);
    push_text_element(&mut out, "dc:date", &now);
    if let Some(title) = &metadata.title {
        push_text_element(&mut out, "dc:title", title);
    }
    if let Some(subject) = &metadata.subject {
        push_text_element(&mut out, "dc:subject", subject);
    }
    if let Some(description) = &metadata.description {
        push_text_element(&mut out, "dc:description", description);
    }
    if let Some(creator) = &metadata.creator {
        push_text_element(&mut out, "meta:initial-creator", creator);
        push_text_element(&mut out, "dc:creator", creator);
    }
    for keyword in &metadata.keywords {
        push_text_element(&mut out, "meta:keyword", keyword);
    }
    out.push_str("</office:meta></office:document-meta>");
    out
}

/// `styles.xml`: common styles, page layouts and master pages.
pub(crate) fn styles_xml(styles: &StyleContainer) -> String {
    let mut out = String::with_capacity(8 * 1024);
    open_root(&mut out, "office:document-styles", DOCUMENT_NAMESPACES);
    out.push_str("<office:font-face-decls/><office:styles>");
    styles.write_common_styles(&mut out);
    out.push_str("</office:styles><office:automatic-styles>");
    styles.write_page_layouts(&mut out);
    out.push_str("</office:automatic-styles><office:master-styles>");
    styles.write_master_pages(&mut out);
    out.push_str("</office:master-styles></office:document-styles>");
    out
}

/// Everything in `content.xml` before the first table.
pub(crate) fn content_prolog(styles: &StyleContainer, validations: &[ContentValidation]) -> String {
    let mut out = String::with_capacity(8 * 1024);
    open_root(&mut out, "office:document-content", DOCUMENT_NAMESPACES);
    out.push_str("<office:scripts/><office:font-face-decls/><office:automatic-styles>");
    styles.write_automatic_styles(&mut out);
    out.push_str("</office:automatic-styles><office:body><office:spreadsheet>");
    if !validations.is_empty() {
        out.push_str("<table:content-validations>");
        for validation in validations {
            write_validation(&mut out, validation);
        }
        out.push_str("</table:content-validations>");
    }
    out
}

fn write_validation(out: &mut String, validation: &ContentValidation) {
    out.push_str("<table:content-validation");
    push_attr(out, "table:name", &validation.name);
    push_attr(out, "table:condition", &validation.condition);
    push_attr(
        out,
        "table:allow-empty-cell",
        if validation.allow_empty { "true" } else { "false" },
    );
    if let Some(base) = &validation.base_cell {
        push_attr(out, "table:base-cell-address", &base.to_string());
    }
    match &validation.error_message {
        Some(message) => {
            out.push_str("><table:error-message table:display=\"true\">");
            push_text_element(out, "text:p", message);
            out.push_str("</table:error-message></table:content-validation>");
        }
        None => out.push_str("/>"),
    }
}

/// Everything in `content.xml` after the last table.
pub(crate) fn content_epilog(named_ranges: &[NamedRange], tables: &[Table]) -> String {
    let mut out = String::new();
    if !named_ranges.is_empty() {
        out.push_str("<table:named-expressions>");
        for range in named_ranges {
            out.push_str("<table:named-range");
            push_attr(&mut out, "table:name", &range.name);
            push_attr(&mut out, "table:base-cell-address", &range.range.start.to_string());
            push_attr(&mut out, "table:cell-range-address", &range.range.to_string());
            out.push_str("/>");
        }
        out.push_str("</table:named-expressions>");
    }
    let filters: Vec<_> = tables.iter().flat_map(|t| t.autofilters.iter()).collect();
    if !filters.is_empty() {
        out.push_str("<table:database-ranges>");
        for (i, range) in filters.into_iter().enumerate() {
            out.push_str("<table:database-range");
            push_attr(&mut out, "table:name", &format!("__Anonymous_Sheet_DB__{}", i));
            push_attr(&mut out, "table:target-range-address", &range.to_string());
            out.push_str(" table:display-filter-buttons=\"true\"/>");
        }
        out.push_str("</table:database-ranges>");
    }
    out.push_str("</office:spreadsheet></office:body></office:document-content>");
    out
}

/// Whole `content.xml` of a buffered document.
pub(crate) fn content_xml(
    styles: &StyleContainer,
    validations: &[ContentValidation],
    tables: &[Table],
    named_ranges: &[NamedRange],
) -> String {
    let bodies: Vec<String> = tables.par_iter().map(render_table).collect();
    let mut out = content_prolog(styles, validations);
    out.reserve(bodies.iter().map(String::len).sum::<usize>() + 256);
    for body in &bodies {
        out.push_str(body);
    }
    out.push_str(&content_epilog(named_ranges, tables));
    out
}

fn render_table(table: &Table) -> String {
    let mut out = String::with_capacity(256 + table.buffered_rows() * 64);
    write_table_start(&mut out, table);
    let mut header = HeaderState::default();
    write_rows(&mut out, table.rows.iter(), table.row_offset, table.header_rows, &mut header);
    write_table_end(&mut out, header, table.row_count() == 0);
    out
}

/// `<table:table>` start tag and column declarations.
pub(crate) fn write_table_start(out: &mut String, table: &Table) {
    out.push_str("<table:table");
    push_attr(out, "table:name", table.name());
    push_attr(out, "table:style-name", table.style());
    if let Some(protection) = &table.protection {
        out.push_str(" table:protected=\"true\"");
        push_attr(out, "table:protection-key", &protection.key);
        push_attr(out, "table:protection-key-digest-algorithm", &protection.algorithm);
    }
    out.push('>');
    write_columns(out, table);
}

fn write_columns(out: &mut String, table: &Table) {
    let width = table.column_count().max(1);
    let mut column = 0;
    while column < width {
        let slot = table.columns.get(column);
        let mut repeat = 1;
        while column + repeat < width && table.columns.get(column + repeat) == slot {
            repeat += 1;
        }
        write_column(out, slot, repeat);
        column += repeat;
    }
}

fn write_column(out: &mut String, slot: &ColumnSlot, repeat: u32) {
    out.push_str("<table:table-column");
    push_attr(out, "table:style-name", slot.style.as_deref().unwrap_or(DEFAULT_COLUMN_STYLE));
    if repeat > 1 {
        push_int_attr(out, "table:number-columns-repeated", u64::from(repeat));
    }
    push_attr(
        out,
        "table:default-cell-style-name",
        slot.default_cell_style.as_deref().unwrap_or(DEFAULT_CELL_STYLE),
    );
    out.push_str("/>");
}

/// Close the header wrapper if needed and end the table. A table with no
/// rows still gets one empty row.
pub(crate) fn write_table_end(out: &mut String, header: HeaderState, empty: bool) {
    if header == HeaderState::Open {
        out.push_str("</table:table-header-rows>");
    }
    if empty {
        out.push_str("<table:table-row><table:table-cell/></table:table-row>");
    }
    out.push_str("</table:table>");
}

fn enter_row(out: &mut String, index: u32, header_rows: u32, header: &mut HeaderState) {
    if index < header_rows && *header == HeaderState::Pending {
        out.push_str("<table:table-header-rows>");
        *header = HeaderState::Open;
    } else if index >= header_rows && *header == HeaderState::Open {
        out.push_str("</table:table-header-rows>");
        *header = HeaderState::Closed;
    }
}

/// Render `rows`, the first of which has absolute index `first`.
pub(crate) fn write_rows<'a>(
    out: &mut String,
    rows: impl IntoIterator<Item = &'a Row>,
    first: u32,
    header_rows: u32,
    header: &mut HeaderState,
) {
    let mut index = first;
    let mut blank_start = first;
    let mut blank_count = 0;
    for row in rows {
        if row.is_blank() {
            if blank_count == 0 {
                blank_start = index;
            }
            blank_count += 1;
        } else {
            write_blank_rows(out, blank_start, blank_count, header_rows, header);
            blank_count = 0;
            enter_row(out, index, header_rows, header);
            write_row(out, row);
        }
        index += 1;
    }
    write_blank_rows(out, blank_start, blank_count, header_rows, header);
}

/// A run of blank rows, split where the header section ends.
fn write_blank_rows(out: &mut String, start: u32, count: u32, header_rows: u32, header: &mut HeaderState) {
    if count == 0 {
        return;
    }
    let end = start + count;
    let mut runs = [(start, end), (end, end)];
    if start < header_rows && header_rows < end {
        runs = [(start, header_rows), (header_rows, end)];
    }
    for (from, to) in runs {
        if from == to {
            continue;
        }
        enter_row(out, from, header_rows, header);
        out.push_str("<table:table-row");
        if to - from > 1 {
            push_int_attr(out, "table:number-rows-repeated", u64::from(to - from));
        }
        out.push_str("><table:table-cell/></table:table-row>");
    }
}

fn write_row(out: &mut String, row: &Row) {
    out.push_str("<table:table-row");
    if let Some(style) = row.style() {
        push_attr(out, "table:style-name", style);
    }
    if let Some(style) = row.default_cell_style() {
        push_attr(out, "table:default-cell-style-name", style);
    }
    out.push('>');

    let mut blank_run = 0u32;
    for cell in row.cells.iter() {
        if cell.is_blank() {
            blank_run += 1;
            continue;
        }
        write_blank_cells(out, blank_run);
        blank_run = 0;
        write_cell(out, cell);
    }
    write_blank_cells(out, blank_run);
    if row.cells.is_empty() {
        out.push_str("<table:table-cell/>");
    }
    out.push_str("</table:table-row>");
}

fn write_blank_cells(out: &mut String, count: u32) {
    match count {
        0 => {}
        1 => out.push_str("<table:table-cell/>"),
        n => {
            out.push_str("<table:table-cell");
            push_int_attr(out, "table:number-columns-repeated", u64::from(n));
            out.push_str("/>");
        }
    }
}

fn write_cell(out: &mut String, cell: &Cell) {
    if cell.covered {
        out.push_str("<table:covered-table-cell/>");
        return;
    }
    out.push_str("<table:table-cell");
    if let Some(style) = cell.rendered_style() {
        push_attr(out, "table:style-name", style);
    }
    cell.value.push_attributes(out);
    if cell.rows_spanned > 1 {
        push_int_attr(out, "table:number-rows-spanned", u64::from(cell.rows_spanned));
    }
    if cell.columns_spanned > 1 {
        push_int_attr(out, "table:number-columns-spanned", u64::from(cell.columns_spanned));
    }
    if let Some(validation) = cell.validation() {
        push_attr(out, "table:content-validation-name", validation);
    }
    for (name, value) in cell.attributes() {
        push_attr(out, name, value);
    }

    let text = cell.value.display_text();
    let tooltip = cell.tooltip();
    if text.is_empty() && tooltip.is_none() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    if let Some(tooltip) = tooltip {
        out.push_str("<office:annotation>");
        push_text_element(out, "text:p", tooltip);
        out.push_str("</office:annotation>");
    }
    if !text.is_empty() {
        push_text_element(out, "text:p", &text);
    }
    out.push_str("</table:table-cell>");
}

/// `settings.xml`, carrying frozen panes per table.
pub(crate) fn settings_xml(tables: &[Table]) -> String {
    let mut out = String::with_capacity(1024);
    open_root(
        &mut out,
        "office:document-settings",
        concat!(
            " xmlns:office=\"urn:oasis:names:tc:opendocument:xmlns:office:1.0\"",
            " xmlns:config=\"urn:oasis:names:tc:opendocument:xmlns:config:1.0\"",
        ),
    );
    out.push_str(
        "<office:settings><config:config-item-set config:name=\"ooo:view-settings\"><config:config-item-map-indexed config:name=\"Views\"><config:config-item-map-entry>",
    );
    config_item(&mut out, "ViewId", "string", "view1");
    out.push_str("<config:config-item-map-named config:name=\"Tables\">");
    for table in tables {
        let (rows, columns) = table.frozen_panes();
        if rows == 0 && columns == 0 {
            continue;
        }
        out.push_str("<config:config-item-map-entry");
        push_attr(&mut out, "config:name", table.name());
        out.push('>');
        let mut buffer = itoa::Buffer::new();
        let split = |n: u32| if n > 0 { "2" } else { "0" };
        config_item(&mut out, "HorizontalSplitMode", "short", split(columns));
        config_item(&mut out, "VerticalSplitMode", "short", split(rows));
        config_item(&mut out, "HorizontalSplitPosition", "int", buffer.format(columns));
        config_item(&mut out, "VerticalSplitPosition", "int", buffer.format(rows));
        config_item(&mut out, "ActiveSplitRange", "short", "2");
        config_item(&mut out, "PositionLeft", "int", "0");
        config_item(&mut out, "PositionRight", "int", buffer.format(columns));
        config_item(&mut out, "PositionTop", "int", "0");
        config_item(&mut out, "PositionBottom", "int", buffer.format(rows));
        out.push_str("</config:config-item-map-entry>");
    }
    out.push_str("</config:config-item-map-named>");
    if let Some(first) = tables.first() {
        config_item(&mut out, "ActiveTable", "string", first.name());
    }
    out.push_str(
        "</config:config-item-map-entry></config:config-item-map-indexed></config:config-item-set></office:settings></office:document-settings>",
    );
    out
}

fn config_item(out: &mut String, name: &str, kind: &str, value: &str) {
    out.push_str("<config:config-item");
    push_attr(out, "config:name", name);
    push_attr(out, "config:type", kind);
    out.push('>');
    out.push_str(&crate::xml::escape_xml(value));
    out.push_str("</config:config-item>");
}
