#![no_main]

//! Fuzz target driving a table cursor with arbitrary operations.
//!
//! Any sequence of writes, merges and style changes must either succeed or
//! return an error, and the resulting document must always save.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rustyods_core::{DataStyle, Document, OdsConfig, TableCellStyle};

#[derive(Arbitrary, Debug)]
enum Op {
    Move { row: u16, column: u8 },
    Next,
    NextRow,
    Text(String),
    Number(f64),
    Flag(bool),
    Percent(f64),
    Clear,
    Merge { rows: u8, columns: u8 },
    Style(u8),
    Data(u8),
    Tooltip(String),
}

fuzz_target!(|ops: Vec<Op>| {
    let mut doc = Document::with_config(OdsConfig::new().with_limits(1024, 64));
    if doc.add_table("Fuzz").is_err() {
        return;
    }
    let Ok(mut cursor) = doc.cursor("Fuzz") else {
        return;
    };
    for op in ops.iter().take(256) {
        let _ = match op {
            Op::Move { row, column } => cursor.to_cell(u32::from(*row), u32::from(*column)).map(|_| ()),
            Op::Next => cursor.next().map(|_| ()),
            Op::NextRow => cursor.next_row().map(|_| ()),
            Op::Text(text) => cursor.set_value(text.as_str()).map(|_| ()),
            Op::Number(value) => cursor.set_float_value(*value).map(|_| ()),
            Op::Flag(value) => cursor.set_boolean_value(*value).map(|_| ()),
            Op::Percent(value) => cursor.set_percentage_value(*value).map(|_| ()),
            Op::Clear => cursor.clear().map(|_| ()),
            Op::Merge { rows, columns } => cursor
                .set_cell_merge(u32::from(*rows % 8), u32::from(*columns % 8))
                .map(|_| ()),
            Op::Style(n) => cursor
                .set_style(&TableCellStyle::new(format!("s{}", n % 4)))
                .map(|_| ()),
            Op::Data(n) => cursor
                .set_data_style(&DataStyle::float(format!("d{}", n % 4), n % 6))
                .map(|_| ()),
            Op::Tooltip(text) => cursor.set_tooltip(text.as_str()).map(|_| ()),
        };
    }
    drop(cursor);
    let bytes = doc.save_to_bytes().expect("a buffered document always saves");
    assert!(bytes.starts_with(b"PK"));
});
