//! # rustyods-core
//!
//! Writer for OpenDocument spreadsheets (`.ods`).
//!
//! Tables are sparse: rows and cells are allocated only up to the last
//! non-blank position. Styles live in a [`StyleContainer`] that deduplicates
//! the (cell style, data style) combinations cells actually use. Documents are
//! either buffered and saved at once, or streamed to their destination in row
//! batches once their styles are frozen.
//!
//! ```
//! use rustyods_core::{DataStyle, Document, TableCellStyle};
//!
//! let mut doc = Document::new();
//! doc.add_table("Sheet1")?;
//! let two_decimals = DataStyle::float("two-dec", 2);
//! let mut cursor = doc.cursor("Sheet1")?;
//! cursor.set_value("Hello")?.next()?.set_value(2.75)?.set_data_style(&two_decimals)?;
//! cursor.to_cell(4, 2)?.set_style(&TableCellStyle::new("Default"))?;
//! let bytes = doc.save_to_bytes()?;
//! assert_eq!(&bytes[..2], b"PK");
//! # Ok::<(), rustyods_core::RustyodsError>(())
//! ```

pub mod address;
pub mod bus;
pub mod config;
pub mod container;
pub mod cursor;
pub mod document;
pub mod error;
pub mod sparse;
mod streaming;
pub mod style;
pub mod table;
pub mod value;
mod writer;
pub mod xml;

#[cfg(feature = "fast-hash")]
pub(crate) type HashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "fast-hash"))]
pub(crate) type HashMap<K, V> = std::collections::HashMap<K, V>;

pub use address::{
    column_to_letters, format_cell, format_range, letters_to_column, parse_address, parse_range, AddressError,
    CellAddress, RangeAddress,
};
pub use bus::{BusSender, DocumentBus, Instruction, Operation};
pub use config::{CompressionLevel, ContainerOptions, Metadata, OdsConfig, MAX_COLUMNS, MAX_ROWS};
pub use container::{EncryptedData, Encrypter, EncryptionParameters, OdsContainer};
pub use cursor::TableCursor;
pub use document::Document;
pub use error::{Result, RustyodsError};
pub use sparse::{Blank, SparseVec};
pub use style::{
    Alignment, Border, BorderStyle, ChildCellStyle, DataFormat, DataStyle, DateToken, EntryMode, Font,
    HorizontalAlign, Length, MasterPage, OdsStyle, Orientation, PageLayout, Protection, StyleContainer,
    StyleFamily, StyleObject, TableCellStyle, TableColumnStyle, TableRowStyle, TableStyle, TextStyle,
    VerticalAlign, Visibility,
};
pub use table::{Cell, ColumnSlot, ContentValidation, NamedRange, Row, Table, TableProtection};
pub use value::{CellValue, ValueType};
