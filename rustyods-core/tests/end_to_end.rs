mod common;

use std::sync::Arc;

use common::{count_with, elements, entry_names, open, read_part, text};
use rustyods_core::{
    CompressionLevel, ContainerOptions, ContentValidation, DataStyle, Document, EncryptedData, Encrypter,
    EncryptionParameters, EntryMode, Font, Metadata, OdsConfig, Result, TableCellStyle, Visibility,
};

#[test]
fn test_shared_child_style_declared_once() {
    let mut doc = Document::new();
    doc.add_table("Sheet1").unwrap();
    let base = TableCellStyle::new("Number").with_font(Font::new().with_bold(true));
    let two_decimals = DataStyle::float("two-dec", 2);
    {
        let mut cursor = doc.cursor("Sheet1").unwrap();
        cursor.set_value("Hello").unwrap();
        cursor.next().unwrap();
        cursor.set_style(&base).unwrap().set_data_style(&two_decimals).unwrap();
        cursor.set_value(3.25).unwrap();
        cursor.to_cell(4, 2).unwrap();
        cursor.set_style(&base).unwrap().set_data_style(&two_decimals).unwrap();
        cursor.set_value(2.5).unwrap();
    }

    let mut archive = open(doc.save_to_bytes().unwrap());
    let content = read_part(&mut archive, "content.xml");
    let styles = read_part(&mut archive, "styles.xml");
    let content_elements = elements(&content);
    let style_elements = elements(&styles);

    let data_declarations = count_with(&content_elements, "number:number-style", "style:name", "two-dec")
        + count_with(&style_elements, "number:number-style", "style:name", "two-dec");
    assert_eq!(data_declarations, 1);

    let child = "Number-_-two-dec";
    assert_eq!(count_with(&content_elements, "style:style", "style:name", child), 1);
    assert_eq!(count_with(&style_elements, "style:style", "style:name", child), 0);
    let declaration = content_elements
        .iter()
        .find(|e| e.name == "style:style" && e.attr("style:name") == Some(child))
        .unwrap();
    assert_eq!(declaration.attr("style:parent-style-name"), Some("Number"));
    assert_eq!(declaration.attr("style:data-style-name"), Some("two-dec"));

    let referencing: Vec<_> = content_elements
        .iter()
        .filter(|e| e.name == "table:table-cell" && e.attr("table:style-name") == Some(child))
        .collect();
    assert_eq!(referencing.len(), 2);
    assert_eq!(referencing[0].attr("office:value"), Some("3.25"));
    assert_eq!(referencing[1].attr("office:value"), Some("2.5"));

    // the common base style lives in styles.xml
    assert_eq!(count_with(&style_elements, "style:style", "style:name", "Number"), 1);
    assert!(text(&content).contains("Hello"));
}

#[test]
fn test_buffered_entry_order() {
    let mut doc = Document::new();
    doc.add_table("A").unwrap();
    let mut archive = open(doc.save_to_bytes().unwrap());
    assert_eq!(
        entry_names(&mut archive),
        vec![
            "mimetype",
            "meta.xml",
            "styles.xml",
            "content.xml",
            "settings.xml",
            "META-INF/manifest.xml"
        ]
    );
    let mimetype = archive.by_index(0).unwrap();
    assert_eq!(mimetype.compression(), zip::CompressionMethod::Stored);
    drop(mimetype);

    let manifest = elements(&read_part(&mut archive, "META-INF/manifest.xml"));
    for path in ["/", "meta.xml", "styles.xml", "content.xml", "settings.xml"] {
        assert_eq!(
            count_with(&manifest, "manifest:file-entry", "manifest:full-path", path),
            1,
            "{}",
            path
        );
    }
}

#[test]
fn test_covered_cells_are_stored_but_not_rendered() {
    let mut doc = Document::new();
    doc.add_table("Merged").unwrap();
    {
        let mut cursor = doc.cursor("Merged").unwrap();
        cursor.set_value("anchor").unwrap().set_cell_merge(2, 3).unwrap();
        // traversal does not skip covered cells
        cursor.next().unwrap();
        assert_eq!(cursor.column(), 1);
        assert!(cursor.cell().is_covered());
        cursor.to_cell(1, 1).unwrap().set_value("hidden").unwrap();
    }
    let table = doc.table("Merged").unwrap();
    for (r, c) in [(0, 1), (0, 2), (1, 0), (1, 1), (1, 2)] {
        assert!(table.cell(r, c).is_covered());
    }
    assert_eq!(table.value(1, 1).display_text(), "hidden");

    let mut archive = open(doc.save_to_bytes().unwrap());
    let content = read_part(&mut archive, "content.xml");
    let found = elements(&content);
    assert!(!text(&content).contains("hidden"));
    assert_eq!(found.iter().filter(|e| e.name == "table:covered-table-cell").count(), 5);
    let anchor = found
        .iter()
        .find(|e| e.name == "table:table-cell" && e.attr("table:number-columns-spanned").is_some())
        .unwrap();
    assert_eq!(anchor.attr("table:number-columns-spanned"), Some("3"));
    assert_eq!(anchor.attr("table:number-rows-spanned"), Some("2"));
}

#[test]
fn test_default_data_styles_bind_to_values() {
    let mut doc = Document::new();
    doc.add_table("Types").unwrap();
    {
        let mut cursor = doc.cursor("Types").unwrap();
        cursor.set_percentage_value(0.25).unwrap().next().unwrap();
        cursor.set_currency_value(9.5, "EUR").unwrap().next().unwrap();
        cursor.set_boolean_value(true).unwrap().next().unwrap();
        cursor.set_float_value(1.0).unwrap();
    }
    let mut archive = open(doc.save_to_bytes().unwrap());
    let found = elements(&read_part(&mut archive, "content.xml"));
    let cells: Vec<_> = found.iter().filter(|e| e.name == "table:table-cell").collect();
    assert_eq!(cells[0].attr("table:style-name"), Some("Default-_-percentage-data"));
    assert_eq!(cells[0].attr("office:value-type"), Some("percentage"));
    assert_eq!(cells[1].attr("table:style-name"), Some("Default-_-currency-data"));
    assert_eq!(cells[1].attr("office:currency"), Some("EUR"));
    assert_eq!(cells[2].attr("table:style-name"), Some("Default-_-boolean-data"));
    assert_eq!(cells[3].attr("table:style-name"), None);

    let declaration = found
        .iter()
        .find(|e| e.name == "style:style" && e.attr("style:name") == Some("Default-_-percentage-data"))
        .unwrap();
    assert_eq!(declaration.attr("style:data-style-name"), Some("percentage-data"));
    assert_eq!(declaration.attr("style:parent-style-name"), Some("Default"));
}

#[test]
fn test_visibility_routing() {
    let mut doc = Document::new();
    doc.add_style(TableCellStyle::new("Heading"), EntryMode::Create).unwrap();
    doc.add_style(
        TableCellStyle::new("ce1").with_visibility(Visibility::Automatic),
        EntryMode::Create,
    )
    .unwrap();
    assert!(!doc.add_style(TableCellStyle::new("Heading"), EntryMode::Create).unwrap());
    let mut archive = open(doc.save_to_bytes().unwrap());
    let styles = elements(&read_part(&mut archive, "styles.xml"));
    let content = elements(&read_part(&mut archive, "content.xml"));

    assert_eq!(count_with(&styles, "style:style", "style:name", "Heading"), 1);
    assert_eq!(count_with(&content, "style:style", "style:name", "Heading"), 0);
    assert_eq!(count_with(&content, "style:style", "style:name", "ce1"), 1);
    assert_eq!(count_with(&styles, "style:style", "style:name", "ce1"), 0);
    assert_eq!(count_with(&styles, "style:page-layout", "style:name", "Mpm1"), 1);
    assert_eq!(count_with(&styles, "style:master-page", "style:name", "Default"), 1);
    assert_eq!(count_with(&content, "style:style", "style:name", "ta1"), 1);
}

#[test]
fn test_document_declarations() {
    let mut doc = Document::new();
    doc.set_metadata(Metadata::new().with_title("Report").with_creator("ops"));
    doc.add_table("Data").unwrap();
    doc.add_named_range("Totals", "$Data.$B$2:$Data.$B$9").unwrap();
    doc.add_autofilter("Data", "A1:C10").unwrap();
    doc.add_validation(
        ContentValidation::new("positive", "of:cell-content()>0").with_error_message("must be positive"),
    )
    .unwrap();
    doc.table_mut("Data").unwrap().freeze_panes(1, 0);
    doc.table_mut("Data").unwrap().set_header_rows(1);
    {
        let mut cursor = doc.cursor("Data").unwrap();
        cursor.set_value("Amount").unwrap().next_row().unwrap();
        cursor.set_value(5).unwrap().set_validation("positive").unwrap();
        cursor.set_tooltip("checked").unwrap();
    }

    let mut archive = open(doc.save_to_bytes().unwrap());
    let content = read_part(&mut archive, "content.xml");
    let found = elements(&content);
    assert_eq!(
        count_with(&found, "table:named-range", "table:cell-range-address", "$Data.$B$2:$Data.$B$9"),
        1
    );
    assert_eq!(
        count_with(&found, "table:database-range", "table:target-range-address", "$Data.$A$1:$Data.$C$10"),
        1
    );
    assert_eq!(count_with(&found, "table:content-validation", "table:name", "positive"), 1);
    assert_eq!(
        count_with(&found, "table:table-cell", "table:content-validation-name", "positive"),
        1
    );
    assert!(found.iter().any(|e| e.name == "table:table-header-rows"));
    assert!(found.iter().any(|e| e.name == "office:annotation"));
    assert!(text(&content).contains("must be positive"));

    let meta = read_part(&mut archive, "meta.xml");
    assert!(text(&meta).contains("Report"));
    let settings = read_part(&mut archive, "settings.xml");
    assert_eq!(count_with(&elements(&settings), "config:config-item-map-entry", "config:name", "Data"), 1);
}

#[test]
fn test_save_to_file() {
    let temp = tempfile::NamedTempFile::new().unwrap();
    let mut doc = Document::with_config(OdsConfig::new().with_compression(CompressionLevel::Fast));
    doc.add_table("T").unwrap();
    doc.cursor("T").unwrap().set_value("on disk").unwrap();
    doc.save(temp.path()).unwrap();

    let file = std::fs::File::open(temp.path()).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert!(text(&read_part(&mut archive, "content.xml")).contains("on disk"));
}

/// Toy strategy: XOR with the password. Good enough to observe the
/// container's handling of encrypted parts.
struct XorEncrypter;

impl Encrypter for XorEncrypter {
    fn encrypt(&self, plain: &[u8], password: &str) -> Result<EncryptedData> {
        let key = password.as_bytes();
        let data = plain
            .iter()
            .enumerate()
            .map(|(i, b)| b ^ key[i % key.len()])
            .collect();
        Ok(EncryptedData {
            data,
            parameters: EncryptionParameters::aes256_cbc(vec![1; 32], vec![2; 16], vec![3; 16], 100_000),
        })
    }
}

#[test]
fn test_encrypted_save() {
    let mut doc = Document::new();
    doc.add_table("Secret").unwrap();
    doc.cursor("Secret").unwrap().set_value("classified").unwrap();
    let options = ContainerOptions::new(CompressionLevel::Default).with_encryption(Arc::new(XorEncrypter), "pw");
    let bytes = doc.save_with(std::io::Cursor::new(Vec::new()), &options).unwrap().into_inner();

    let mut archive = open(bytes);
    {
        let content = archive.by_name("content.xml").unwrap();
        assert_eq!(content.compression(), zip::CompressionMethod::Stored);
    }
    let manifest = read_part(&mut archive, "META-INF/manifest.xml");
    let found = elements(&manifest);
    assert_eq!(found.iter().filter(|e| e.name == "manifest:encryption-data").count(), 4);
    let content_entry = found
        .iter()
        .find(|e| e.name == "manifest:file-entry" && e.attr("manifest:full-path") == Some("content.xml"))
        .unwrap();
    assert!(content_entry.attr("manifest:size").is_some());
    assert_eq!(read_part(&mut archive, "mimetype"), "application/vnd.oasis.opendocument.spreadsheet");
}
