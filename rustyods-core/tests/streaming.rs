mod common;

use common::{count_with, elements, entry_names, open, read_part, text, SharedBuffer};
use rustyods_core::{
    CompressionLevel, ContainerOptions, DataStyle, Document, EntryMode, Length, OdsConfig, RustyodsError,
    TableCellStyle, TableColumnStyle, TableStyle,
};

fn config(threshold: usize) -> OdsConfig {
    OdsConfig::new()
        .with_flush_threshold(threshold)
        .with_compression(CompressionLevel::Fast)
}

#[test]
fn test_streams_multiple_tables_to_file() {
    let temp = tempfile::NamedTempFile::new().unwrap();
    let mut doc = Document::create_streaming(temp.path(), config(8)).unwrap();
    let base = TableCellStyle::new("Amount");
    let two_decimals = DataStyle::float("two-dec", 2);
    doc.add_style(base.clone(), EntryMode::Create).unwrap();
    doc.add_child_cell_style(&base, &two_decimals).unwrap();
    doc.freeze_styles().unwrap();

    for name in ["First", "Second", "Third"] {
        doc.add_table(name).unwrap();
        let mut cursor = doc.cursor(name).unwrap();
        for i in 0..50u32 {
            cursor.set_value(format!("{}-{}", name, i)).unwrap().next().unwrap();
            cursor.set_style(&base).unwrap().set_data_style(&two_decimals).unwrap();
            cursor.set_value(f64::from(i) / 4.0).unwrap();
            cursor.next_row().unwrap();
            assert!(cursor.table().buffered_rows() <= 9);
        }
    }
    doc.close().unwrap();
    assert!(doc.is_closed());

    let file = std::fs::File::open(temp.path()).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(
        entry_names(&mut archive),
        vec![
            "mimetype",
            "styles.xml",
            "content.xml",
            "meta.xml",
            "settings.xml",
            "META-INF/manifest.xml"
        ]
    );
    let content = read_part(&mut archive, "content.xml");
    let found = elements(&content);
    let tables: Vec<_> = found
        .iter()
        .filter(|e| e.name == "table:table")
        .filter_map(|e| e.attr("table:name"))
        .collect();
    assert_eq!(tables, vec!["First", "Second", "Third"]);
    assert_eq!(
        count_with(&found, "table:table-cell", "table:style-name", "Amount-_-two-dec"),
        150
    );
    assert_eq!(count_with(&found, "style:style", "style:name", "Amount-_-two-dec"), 1);
    let all_text = text(&content);
    assert!(all_text.contains("First-0"));
    assert!(all_text.contains("Third-49"));
}

#[test]
fn test_content_requires_frozen_styles() {
    let buffer = SharedBuffer::default();
    let mut doc =
        Document::streaming_to_writer(buffer, config(4), ContainerOptions::new(CompressionLevel::Fast)).unwrap();
    assert!(matches!(doc.add_table("T"), Err(RustyodsError::StylesNotFrozen(_))));
    doc.freeze_styles().unwrap();
    assert!(matches!(
        doc.add_style(TableCellStyle::new("Late"), EntryMode::Create),
        Err(RustyodsError::StylesFrozen(_))
    ));
    doc.add_table("T").unwrap();

    // an unseen combination cannot be derived anymore
    let mut cursor = doc.cursor("T").unwrap();
    assert!(matches!(
        cursor.set_data_style(&DataStyle::float("fresh", 3)),
        Err(RustyodsError::StylesFrozen(_))
    ));
    // seeded children stay usable
    cursor.set_percentage_value(0.5).unwrap();
    doc.close().unwrap();
}

#[test]
fn test_flushed_rows_are_read_only() {
    let buffer = SharedBuffer::default();
    let mut doc =
        Document::streaming_to_writer(buffer, config(2), ContainerOptions::new(CompressionLevel::Fast)).unwrap();
    doc.freeze_styles().unwrap();
    doc.add_table("T").unwrap();
    {
        let mut cursor = doc.cursor("T").unwrap();
        for i in 0..5 {
            cursor.set_value(i).unwrap().next_row().unwrap();
        }
        assert!(matches!(
            cursor.to_row(0).and_then(|c| c.set_value("late")),
            Err(RustyodsError::RowFlushed { row: 0, .. })
        ));
    }
    assert!(matches!(
        doc.set_table_style("T", &TableStyle::new("ta1")),
        Err(RustyodsError::RowFlushed { .. })
    ));
    doc.close().unwrap();
}

#[test]
fn test_column_styles_close_at_first_flush() {
    let buffer = SharedBuffer::default();
    let mut doc = Document::streaming_to_writer(buffer.clone(), config(2), ContainerOptions::new(CompressionLevel::Fast))
        .unwrap();
    let wide = TableColumnStyle::new("co2", Length::Cm(5.0));
    let narrow = TableColumnStyle::new("co3", Length::Cm(1.0));
    doc.add_style(wide.clone(), EntryMode::Create).unwrap();
    doc.add_style(narrow.clone(), EntryMode::Create).unwrap();
    doc.freeze_styles().unwrap();
    doc.add_table("T").unwrap();
    {
        let mut cursor = doc.cursor("T").unwrap();
        cursor.set_column_style(&wide).unwrap();
        for i in 0..3 {
            cursor.set_value(i).unwrap().next_row().unwrap();
        }
        assert!(matches!(
            cursor.to(1).and_then(|c| c.set_column_style(&narrow)),
            Err(RustyodsError::RowFlushed { .. })
        ));
        assert!(matches!(
            cursor.set_column_default_cell_style(&TableCellStyle::new("Default")),
            Err(RustyodsError::RowFlushed { .. })
        ));
    }
    doc.close().unwrap();

    let content = read_part(&mut open(buffer.bytes()), "content.xml");
    let found = elements(&content);
    assert_eq!(count_with(&found, "table:table-column", "table:style-name", "co2"), 1);
    assert_eq!(count_with(&found, "table:table-column", "table:style-name", "co3"), 0);
}

#[test]
fn test_streaming_to_writer_round_trips() {
    let buffer = SharedBuffer::default();
    let mut doc = Document::streaming_to_writer(
        buffer.clone(),
        config(3),
        ContainerOptions::new(CompressionLevel::Default),
    )
    .unwrap();
    doc.add_named_range("Head", "$Rows.$A$1:$Rows.$A$2").unwrap();
    doc.freeze_styles().unwrap();
    doc.add_table("Rows").unwrap();
    {
        let mut cursor = doc.cursor("Rows").unwrap();
        for i in 0..10u32 {
            cursor.set_value(i).unwrap().next_row().unwrap();
        }
        // sparse gap, then a final row
        cursor.to_row(20).unwrap().set_value("tail").unwrap();
    }
    doc.close().unwrap();

    let mut archive = open(buffer.bytes());
    let content = read_part(&mut archive, "content.xml");
    let found = elements(&content);
    let values: Vec<_> = found
        .iter()
        .filter(|e| e.name == "table:table-cell")
        .filter_map(|e| e.attr("office:value"))
        .collect();
    assert_eq!(values, vec!["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]);
    assert!(text(&content).contains("tail"));
    assert_eq!(count_with(&found, "table:named-range", "table:name", "Head"), 1);
}

#[test]
fn test_close_freezes_styles() {
    let buffer = SharedBuffer::default();
    let mut doc =
        Document::streaming_to_writer(buffer.clone(), config(16), ContainerOptions::new(CompressionLevel::None))
            .unwrap();
    doc.add_style(TableCellStyle::new("Bold"), EntryMode::Create).unwrap();
    doc.close().unwrap();
    assert!(doc.styles().is_frozen());

    let mut archive = open(buffer.bytes());
    let styles = elements(&read_part(&mut archive, "styles.xml"));
    assert_eq!(count_with(&styles, "style:style", "style:name", "Bold"), 1);
    // an empty spreadsheet body is still written
    let content = elements(&read_part(&mut archive, "content.xml"));
    assert!(content.iter().any(|e| e.name == "office:spreadsheet"));
}
