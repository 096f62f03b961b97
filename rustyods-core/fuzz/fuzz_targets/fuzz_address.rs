#![no_main]

//! Fuzz target for cell and range address parsing in rustyods-core.
//!
//! Checks that:
//! - No input makes the parsers panic
//! - Parsed addresses format back to text that parses to the same address
//! - Column letters round trip for every index in range

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rustyods_core::{column_to_letters, letters_to_column, parse_address, parse_range, MAX_COLUMNS};

#[derive(Arbitrary, Debug)]
struct AddressFuzzInput {
    text: String,
    column: u32,
}

fn fuzz_parse_address(input: &str) {
    if let Ok(address) = parse_address(input) {
        let formatted = address.to_string();
        let reparsed = parse_address(&formatted).unwrap_or_else(|e| {
            panic!("{:?} formatted as {:?} which fails to parse: {}", input, formatted, e)
        });
        assert_eq!(reparsed, address, "round trip changed {:?}", input);
    }
}

fn fuzz_parse_range(input: &str) {
    if let Ok(range) = parse_range(input) {
        let ((r1, c1), (r2, c2)) = range.normalized();
        assert!(r1 <= r2 && c1 <= c2);
        let reparsed = parse_range(&range.to_string()).expect("formatted range must parse");
        assert_eq!(reparsed, range);
    }
}

fn fuzz_letters(input: &str, column: u32) {
    if let Ok(index) = letters_to_column(input) {
        assert!(index < MAX_COLUMNS);
    }
    let column = column % MAX_COLUMNS;
    let letters = column_to_letters(column);
    assert_eq!(letters_to_column(&letters).ok(), Some(column));
}

fuzz_target!(|input: AddressFuzzInput| {
    fuzz_parse_address(&input.text);
    fuzz_parse_range(&input.text);
    fuzz_letters(&input.text, input.column);
});
