//! Document and container configuration.

use std::fmt;
use std::sync::Arc;

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::container::Encrypter;

/// Maximum number of rows a table can address.
pub const MAX_ROWS: u32 = 1_048_576;
/// Maximum number of columns a table can address (XFD).
pub const MAX_COLUMNS: u32 = 16_384;

/// Compression level for the XML parts of the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - fastest saves, largest files
    None,
    /// Fast compression (deflate level 1)
    Fast,
    /// Default compression (deflate level 6)
    #[default]
    Default,
    /// Best compression (deflate level 9)
    Best,
}

impl CompressionLevel {
    /// Zip options for a regular (non-encrypted) entry.
    pub(crate) fn file_options(self) -> SimpleFileOptions {
        let stored = SimpleFileOptions::default()
            .large_file(false)
            .compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default()
            .large_file(false)
            .compression_method(CompressionMethod::Deflated);
        match self {
            CompressionLevel::None => stored,
            CompressionLevel::Fast => deflated.compression_level(Some(1)),
            CompressionLevel::Default => deflated.compression_level(Some(6)),
            CompressionLevel::Best => deflated.compression_level(Some(9)),
        }
    }

    /// Matching flate2 level, used when deflating ahead of encryption.
    pub(crate) fn flate2_level(self) -> flate2::Compression {
        match self {
            CompressionLevel::None => flate2::Compression::none(),
            CompressionLevel::Fast => flate2::Compression::fast(),
            CompressionLevel::Default => flate2::Compression::default(),
            CompressionLevel::Best => flate2::Compression::best(),
        }
    }
}

/// Settings that govern how a document is built and flushed.
#[derive(Clone, Debug)]
pub struct OdsConfig {
    /// Compression used when the document is saved.
    pub compression: CompressionLevel,
    /// Number of buffered rows that triggers a flush in streaming mode.
    pub flush_threshold: usize,
    /// Value of `meta:generator`.
    pub generator: String,
    /// Addressable row bound.
    pub max_rows: u32,
    /// Addressable column bound.
    pub max_columns: u32,
}

impl Default for OdsConfig {
    fn default() -> Self {
        OdsConfig {
            compression: CompressionLevel::Default,
            flush_threshold: 1024,
            generator: format!("rustyods/{}", env!("CARGO_PKG_VERSION")),
            max_rows: MAX_ROWS,
            max_columns: MAX_COLUMNS,
        }
    }
}

impl OdsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }

    /// Set the streaming flush threshold. Zero is treated as one.
    pub fn with_flush_threshold(mut self, rows: usize) -> Self {
        self.flush_threshold = rows.max(1);
        self
    }

    pub fn with_generator<S: Into<String>>(mut self, generator: S) -> Self {
        self.generator = generator.into();
        self
    }

    /// Narrow the addressable space. Values above the format maximum are clamped.
    pub fn with_limits(mut self, max_rows: u32, max_columns: u32) -> Self {
        self.max_rows = max_rows.clamp(1, MAX_ROWS);
        self.max_columns = max_columns.clamp(1, MAX_COLUMNS);
        self
    }
}

/// Descriptive metadata written to `meta.xml`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subject<S: Into<String>>(mut self, subject: S) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_creator<S: Into<String>>(mut self, creator: S) -> Self {
        self.creator = Some(creator.into());
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_keyword<S: Into<String>>(mut self, keyword: S) -> Self {
        self.keywords.push(keyword.into());
        self
    }
}

/// Container-writer strategy: compression tuning and optional encryption.
#[derive(Clone, Default)]
pub struct ContainerOptions {
    pub compression: CompressionLevel,
    pub(crate) encryption: Option<(Arc<dyn Encrypter>, String)>,
}

impl ContainerOptions {
    pub fn new(compression: CompressionLevel) -> Self {
        ContainerOptions {
            compression,
            encryption: None,
        }
    }

    /// Encrypt every XML part with `encrypter`, keyed by `password`.
    pub fn with_encryption<S: Into<String>>(mut self, encrypter: Arc<dyn Encrypter>, password: S) -> Self {
        self.encryption = Some((encrypter, password.into()));
        self
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption.is_some()
    }
}

impl fmt::Debug for ContainerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerOptions")
            .field("compression", &self.compression)
            .field("encrypted", &self.is_encrypted())
            .finish()
    }
}
