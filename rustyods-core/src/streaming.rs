//! Streaming write support for documents too large to buffer.
//!
//! A streaming document writes `styles.xml` and opens `content.xml` as soon as
//! its styles are frozen. From then on rows are flushed to the open entry in
//! batches, each table is closed the moment the next one is added, and
//! `close()` writes the trailing declarations and the remaining parts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::config::{ContainerOptions, Metadata};
use crate::container::{OdsContainer, WriteSeek};
use crate::error::{Result, RustyodsError};
use crate::style::StyleContainer;
use crate::table::{ContentValidation, NamedRange, Table};
use crate::writer::{
    content_epilog, content_prolog, meta_xml, settings_xml, styles_xml, write_rows, write_table_end,
    write_table_start, XML_MEDIA_TYPE,
};

/// Writer side of a streaming document.
pub(crate) struct StreamState {
    container: OdsContainer<Box<dyn WriteSeek + Send>>,
    flush_threshold: usize,
    content_open: bool,
}

impl StreamState {
    /// Create the file at `path` and write the `mimetype` entry.
    pub(crate) fn create<P: AsRef<Path>>(path: P, options: ContainerOptions, flush_threshold: usize) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        let writer = BufWriter::with_capacity(1024 * 1024, file); // 1MB buffer
        debug!("streaming document to {}", path.as_ref().display());
        Self::new(Box::new(writer), options, flush_threshold)
    }

    pub(crate) fn new(
        writer: Box<dyn WriteSeek + Send>,
        options: ContainerOptions,
        flush_threshold: usize,
    ) -> Result<Self> {
        Ok(StreamState {
            container: OdsContainer::new(writer, options)?,
            flush_threshold: flush_threshold.max(1),
            content_open: false,
        })
    }

    pub(crate) fn flush_threshold(&self) -> usize {
        self.flush_threshold
    }

    pub(crate) fn is_content_open(&self) -> bool {
        self.content_open
    }

    /// Write `styles.xml`, then open `content.xml` up to the first table.
    pub(crate) fn begin_content(&mut self, styles: &StyleContainer, validations: &[ContentValidation]) -> Result<()> {
        if self.content_open {
            return Ok(());
        }
        self.container
            .put_entry("styles.xml", XML_MEDIA_TYPE, styles_xml(styles).as_bytes())?;
        self.container.start_entry("content.xml", XML_MEDIA_TYPE)?;
        self.container
            .write(content_prolog(styles, validations).as_bytes())?;
        self.content_open = true;
        Ok(())
    }

    fn require_content(&self) -> Result<()> {
        if self.content_open {
            Ok(())
        } else {
            Err(RustyodsError::StylesNotFrozen("writing rows"))
        }
    }

    /// Write and drop every row of `table` before `upto`.
    pub(crate) fn flush_rows(&mut self, table: &mut Table, upto: u32) -> Result<()> {
        self.require_content()?;
        let mut out = String::new();
        if !table.header_written {
            write_table_start(&mut out, table);
            table.header_written = true;
        }
        let first = table.row_offset;
        let rows = table.take_rows_before(upto);
        if !rows.is_empty() {
            out.reserve(rows.len() * 64);
            write_rows(&mut out, rows.iter(), first, table.header_rows, &mut table.header_state);
            debug!("flushed rows {}..{} of '{}'", first, upto, table.name());
        }
        if !out.is_empty() {
            self.container.write(out.as_bytes())?;
        }
        Ok(())
    }

    /// Flush what is left of `table` and close its element.
    pub(crate) fn finish_table(&mut self, table: &mut Table) -> Result<()> {
        if table.closed {
            return Ok(());
        }
        let end = table.row_count();
        self.flush_rows(table, end)?;
        let mut out = String::new();
        write_table_end(&mut out, table.header_state, table.row_offset == 0);
        self.container.write(out.as_bytes())?;
        table.closed = true;
        debug!("closed table '{}' after {} rows", table.name(), end);
        Ok(())
    }

    /// Close `content.xml`, write the remaining parts and the manifest.
    pub(crate) fn finish(
        mut self,
        tables: &mut [Table],
        named_ranges: &[NamedRange],
        metadata: &Metadata,
        generator: &str,
    ) -> Result<()> {
        self.require_content()?;
        for table in tables.iter_mut() {
            self.finish_table(table)?;
        }
        self.container
            .write(content_epilog(named_ranges, tables).as_bytes())?;
        self.container.close_entry()?;
        self.container
            .put_entry("meta.xml", XML_MEDIA_TYPE, meta_xml(metadata, generator).as_bytes())?;
        self.container
            .put_entry("settings.xml", XML_MEDIA_TYPE, settings_xml(tables).as_bytes())?;
        let mut writer = self.container.finish()?;
        writer.flush()?;
        debug!("streaming document closed");
        Ok(())
    }
}

impl std::fmt::Debug for StreamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamState")
            .field("flush_threshold", &self.flush_threshold)
            .field("content_open", &self.content_open)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OdsConfig;
    use crate::style::defaults;
    use crate::value::CellValue;
    use std::io::Read;
    use tempfile::NamedTempFile;

    fn content_of(path: &Path) -> String {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut xml = String::new();
        archive
            .by_name("content.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_rows_before_content_fail() {
        let temp = NamedTempFile::new().unwrap();
        let mut state = StreamState::create(temp.path(), ContainerOptions::default(), 10).unwrap();
        let mut table = Table::new("T", &OdsConfig::default()).unwrap();
        assert!(matches!(
            state.flush_rows(&mut table, 1),
            Err(RustyodsError::StylesNotFrozen(_))
        ));
    }

    #[test]
    fn test_batches_form_one_table() {
        let temp = NamedTempFile::new().unwrap();
        let mut styles = StyleContainer::new();
        defaults::seed(&mut styles);
        styles.freeze();

        let mut state = StreamState::create(temp.path(), ContainerOptions::default(), 2).unwrap();
        state.begin_content(&styles, &[]).unwrap();
        let mut table = Table::new("Data", &OdsConfig::default()).unwrap();
        for r in 0..3 {
            table.cell_mut(r, 0).unwrap().value = CellValue::from(r);
        }
        state.flush_rows(&mut table, 2).unwrap();
        assert_eq!(table.buffered_rows(), 1);
        table.cell_mut(5, 1).unwrap().value = CellValue::from("tail");
        let mut tables = vec![table];
        state
            .finish(&mut tables, &[], &Metadata::default(), "test")
            .unwrap();

        let xml = content_of(temp.path());
        assert_eq!(xml.matches("<table:table ").count(), 1);
        assert_eq!(xml.matches("</table:table>").count(), 1);
        assert!(xml.contains("<text:p>0</text:p>"));
        assert!(xml.contains("<text:p>2</text:p>"));
        assert!(xml.contains("table:number-rows-repeated=\"2\""));
        assert!(xml.contains("<text:p>tail</text:p>"));
        assert!(xml.ends_with("</office:spreadsheet></office:body></office:document-content>"));
    }
}
