//! Document: tables, styles and the save entry points.

use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};

use crate::address::parse_range;
use crate::config::{ContainerOptions, Metadata, OdsConfig};
use crate::container::OdsContainer;
use crate::cursor::TableCursor;
use crate::error::{Result, RustyodsError};
use crate::streaming::StreamState;
use crate::style::{
    defaults, ChildCellStyle, DataStyle, EntryMode, OdsStyle, StyleContainer, StyleObject, TableCellStyle,
    TableStyle,
};
use crate::table::{ContentValidation, NamedRange, Table};
use crate::writer::{content_xml, meta_xml, settings_xml, styles_xml, XML_MEDIA_TYPE};

/// A spreadsheet document.
///
/// Buffered documents (`new`, `with_config`) keep everything in memory until
/// one of the `save*` methods is called. Streaming documents
/// (`create_streaming`, `streaming_to_writer`) write to their destination as
/// they are filled: every style has to be registered before
/// [`Document::freeze_styles`], after which tables and rows are flushed
/// incrementally and [`Document::close`] finishes the file.
#[derive(Debug)]
pub struct Document {
    config: OdsConfig,
    styles: StyleContainer,
    tables: Vec<Table>,
    named_ranges: Vec<NamedRange>,
    validations: Vec<ContentValidation>,
    metadata: Metadata,
    stream: Option<StreamState>,
    streaming: bool,
    closed: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty buffered document.
    pub fn new() -> Self {
        Self::with_config(OdsConfig::default())
    }

    pub fn with_config(config: OdsConfig) -> Self {
        let mut styles = StyleContainer::new();
        defaults::seed(&mut styles);
        Document {
            config,
            styles,
            tables: Vec::new(),
            named_ranges: Vec::new(),
            validations: Vec::new(),
            metadata: Metadata::default(),
            stream: None,
            streaming: false,
            closed: false,
        }
    }

    /// Create a streaming document writing to the file at `path`.
    pub fn create_streaming<P: AsRef<Path>>(path: P, config: OdsConfig) -> Result<Self> {
        let options = ContainerOptions::new(config.compression);
        let stream = StreamState::create(path, options, config.flush_threshold)?;
        Ok(Self::streaming(config, stream))
    }

    /// Create a streaming document writing to `writer`.
    pub fn streaming_to_writer<W>(writer: W, config: OdsConfig, options: ContainerOptions) -> Result<Self>
    where
        W: Write + Seek + Send + 'static,
    {
        let stream = StreamState::new(Box::new(writer), options, config.flush_threshold)?;
        Ok(Self::streaming(config, stream))
    }

    fn streaming(config: OdsConfig, stream: StreamState) -> Self {
        let mut document = Self::with_config(config);
        document.stream = Some(stream);
        document.streaming = true;
        document
    }

    pub fn config(&self) -> &OdsConfig {
        &self.config
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(RustyodsError::Closed);
        }
        Ok(())
    }

    /// Streaming documents accept content only once styles are frozen.
    fn check_content_allowed(&self, operation: &'static str) -> Result<()> {
        self.check_open()?;
        if self.streaming && !self.styles.is_frozen() {
            return Err(RustyodsError::StylesNotFrozen(operation));
        }
        Ok(())
    }

    // Styles

    pub fn styles(&self) -> &StyleContainer {
        &self.styles
    }

    /// Register a style. Returns whether the container changed.
    pub fn add_style(&mut self, style: impl Into<StyleObject>, mode: EntryMode) -> Result<bool> {
        self.check_open()?;
        self.styles.add_style(style, mode)
    }

    /// Pre-register the child binding `base` to `data`, so that it stays
    /// usable after the styles are frozen.
    pub fn add_child_cell_style(&mut self, base: &TableCellStyle, data: &DataStyle) -> Result<ChildCellStyle> {
        self.check_open()?;
        self.styles.add_child_cell_style(base, data)
    }

    /// Freeze the style container. In streaming mode this also writes
    /// `styles.xml` and starts `content.xml`.
    pub fn freeze_styles(&mut self) -> Result<()> {
        self.check_open()?;
        self.styles.freeze();
        if let Some(stream) = self.stream.as_mut() {
            stream.begin_content(&self.styles, &self.validations)?;
        }
        Ok(())
    }

    // Metadata

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }

    // Tables

    /// Add a table and return its index. In streaming mode the previous
    /// table is flushed and closed.
    pub fn add_table(&mut self, name: &str) -> Result<usize> {
        self.check_content_allowed("adding a table")?;
        if self.table_index(name).is_some() {
            return Err(RustyodsError::TableAlreadyExists(name.to_string()));
        }
        let table = Table::new(name, &self.config)?;
        if let (Some(stream), Some(previous)) = (self.stream.as_mut(), self.tables.last_mut()) {
            stream.finish_table(previous)?;
        }
        self.tables.push(table);
        Ok(self.tables.len() - 1)
    }

    pub fn table_index(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.name() == name)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.check_open()?;
        self.tables
            .iter_mut()
            .find(|t| t.name() == name)
            .ok_or_else(|| RustyodsError::TableNotFound(name.to_string()))
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Cursor over the table called `name`, positioned on its first
    /// writable row.
    pub fn cursor(&mut self, name: &str) -> Result<TableCursor<'_>> {
        let index = self
            .table_index(name)
            .ok_or_else(|| RustyodsError::TableNotFound(name.to_string()))?;
        self.cursor_at(index)
    }

    pub fn cursor_at(&mut self, index: usize) -> Result<TableCursor<'_>> {
        self.check_content_allowed("writing content")?;
        let table = self
            .tables
            .get_mut(index)
            .ok_or_else(|| RustyodsError::TableNotFound(format!("#{}", index)))?;
        Ok(TableCursor::new(table, &mut self.styles, self.stream.as_mut()))
    }

    /// Set the style of a table that has not started streaming yet.
    pub fn set_table_style(&mut self, table: &str, style: &TableStyle) -> Result<()> {
        self.check_open()?;
        self.styles.register_if_absent(style)?;
        let target = self.table_mut(table)?;
        if target.header_written {
            return Err(RustyodsError::RowFlushed {
                table: table.to_string(),
                row: target.row_offset,
            });
        }
        target.style = Arc::from(style.name());
        Ok(())
    }

    /// Add an autofilter to `table` over `range`, e.g. `A1:C10`.
    pub fn add_autofilter(&mut self, table: &str, range: &str) -> Result<()> {
        let ((row1, column1), (row2, column2)) = parse_range(range)?.normalized();
        self.table_mut(table)?
            .add_autofilter(row1, column1, row2, column2)
    }

    // Document-level declarations

    /// Declare a named range, e.g. `("Totals", "$Sheet1.$B$2:$Sheet1.$B$9")`.
    /// The range must start with a table-qualified address.
    pub fn add_named_range(&mut self, name: &str, range: &str) -> Result<()> {
        self.check_open()?;
        if self.named_ranges.iter().any(|r| r.name == name) {
            return Err(RustyodsError::NamedRangeAlreadyExists(name.to_string()));
        }
        let range = parse_range(range)?;
        if range.start.table.is_none() {
            return Err(RustyodsError::custom(format!(
                "named range '{}' must name the table of its first cell",
                name
            )));
        }
        self.named_ranges.push(NamedRange {
            name: name.to_string(),
            range,
        });
        Ok(())
    }

    pub fn named_ranges(&self) -> &[NamedRange] {
        &self.named_ranges
    }

    /// Declare a content validation that cells reference by name.
    ///
    /// Validations precede the tables in `content.xml`, so a streaming
    /// document needs them before its styles are frozen.
    pub fn add_validation(&mut self, validation: ContentValidation) -> Result<()> {
        self.check_open()?;
        if self.stream.as_ref().is_some_and(StreamState::is_content_open) {
            return Err(RustyodsError::LateDeclaration(validation.name));
        }
        self.validations.retain(|v| v.name != validation.name);
        self.validations.push(validation);
        Ok(())
    }

    pub fn validations(&self) -> &[ContentValidation] {
        &self.validations
    }

    // Saving

    fn check_buffered(&self) -> Result<()> {
        self.check_open()?;
        if self.streaming {
            return Err(RustyodsError::custom(
                "streaming documents are written incrementally; call close()",
            ));
        }
        Ok(())
    }

    /// Save to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.check_buffered()?;
        let file = File::create(path.as_ref())?;
        let writer = BufWriter::with_capacity(1024 * 1024, file); // 1MB buffer
        let mut writer = self.save_to_writer(writer)?;
        writer.flush()?;
        debug!("saved {}", path.as_ref().display());
        Ok(())
    }

    /// Save to an in-memory buffer.
    pub fn save_to_bytes(&self) -> Result<Vec<u8>> {
        let cursor = self.save_to_writer(Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Save to any seekable writer and hand it back.
    pub fn save_to_writer<W: Write + Seek>(&self, writer: W) -> Result<W> {
        self.save_with(writer, &ContainerOptions::new(self.config.compression))
    }

    /// Save with explicit container options, e.g. an encryption strategy.
    pub fn save_with<W: Write + Seek>(&self, writer: W, options: &ContainerOptions) -> Result<W> {
        self.check_buffered()?;
        let mut container = OdsContainer::new(writer, options.clone())?;
        let meta = meta_xml(&self.metadata, &self.config.generator);
        container.put_entry("meta.xml", XML_MEDIA_TYPE, meta.as_bytes())?;
        container.put_entry("styles.xml", XML_MEDIA_TYPE, styles_xml(&self.styles).as_bytes())?;
        let content = content_xml(&self.styles, &self.validations, &self.tables, &self.named_ranges);
        container.put_entry("content.xml", XML_MEDIA_TYPE, content.as_bytes())?;
        container.put_entry("settings.xml", XML_MEDIA_TYPE, settings_xml(&self.tables).as_bytes())?;
        let writer = container.finish()?;
        debug!(
            "document saved: {} tables, {} bytes of content",
            self.tables.len(),
            content.len()
        );
        Ok(writer)
    }

    /// Finish a streaming document. Styles are frozen first if they were
    /// not already.
    pub fn close(&mut self) -> Result<()> {
        self.check_open()?;
        let mut stream = self
            .stream
            .take()
            .ok_or_else(|| RustyodsError::custom("buffered documents are written with save()"))?;
        self.closed = true;
        if !stream.is_content_open() {
            self.styles.freeze();
            stream.begin_content(&self.styles, &self.validations)?;
        }
        stream.finish(
            &mut self.tables,
            &self.named_ranges,
            &self.metadata,
            &self.config.generator,
        )
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        if self.stream.is_some() && !self.closed {
            warn!("streaming document dropped without close(); the output is incomplete");
        }
    }
}
