//! The zip package: entries, manifest and optional encryption.
//!
//! `mimetype` is always the first entry and always stored uncompressed. Every
//! other entry is recorded for `META-INF/manifest.xml`, which is written by
//! [`OdsContainer::finish`].

use std::io::{Seek, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{debug, trace};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ContainerOptions;
use crate::error::{Result, RustyodsError};
use crate::xml::{push_attr, push_int_attr, XML_PROLOG};

pub const MIMETYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

pub const SHA256_1K_CHECKSUM: &str = "urn:oasis:names:tc:opendocument:xmlns:manifest:1.0#sha256-1k";
pub const AES256_CBC: &str = "http://www.w3.org/2001/04/xmlenc#aes256-cbc";
pub const SHA256: &str = "http://www.w3.org/2000/09/xmldsig#sha256";
pub const PBKDF2: &str = "PBKDF2";

/// Everything a reader needs to decrypt an entry, as listed in the manifest.
#[derive(Clone, Debug, PartialEq)]
pub struct EncryptionParameters {
    pub checksum_type: String,
    /// Digest of the first kilobyte of the compressed plaintext.
    pub checksum: Vec<u8>,
    pub algorithm: String,
    pub initialisation_vector: Vec<u8>,
    pub start_key_generation: String,
    pub key_derivation: String,
    pub key_size: u32,
    pub iteration_count: u32,
    pub salt: Vec<u8>,
}

impl EncryptionParameters {
    /// AES-256-CBC with a PBKDF2-derived key.
    pub fn aes256_cbc(checksum: Vec<u8>, iv: Vec<u8>, salt: Vec<u8>, iteration_count: u32) -> Self {
        EncryptionParameters {
            checksum_type: SHA256_1K_CHECKSUM.to_string(),
            checksum,
            algorithm: AES256_CBC.to_string(),
            initialisation_vector: iv,
            start_key_generation: SHA256.to_string(),
            key_derivation: PBKDF2.to_string(),
            key_size: 32,
            iteration_count,
            salt,
        }
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<manifest:encryption-data");
        push_attr(out, "manifest:checksum-type", &self.checksum_type);
        push_attr(out, "manifest:checksum", &BASE64.encode(&self.checksum));
        out.push_str("><manifest:algorithm");
        push_attr(out, "manifest:algorithm-name", &self.algorithm);
        push_attr(
            out,
            "manifest:initialisation-vector",
            &BASE64.encode(&self.initialisation_vector),
        );
        out.push_str("/><manifest:start-key-generation");
        push_attr(out, "manifest:start-key-generation-name", &self.start_key_generation);
        push_int_attr(out, "manifest:key-size", u64::from(self.key_size));
        out.push_str("/><manifest:key-derivation");
        push_attr(out, "manifest:key-derivation-name", &self.key_derivation);
        push_int_attr(out, "manifest:key-size", u64::from(self.key_size));
        push_int_attr(out, "manifest:iteration-count", u64::from(self.iteration_count));
        push_attr(out, "manifest:salt", &BASE64.encode(&self.salt));
        out.push_str("/></manifest:encryption-data>");
    }
}

/// Ciphertext plus the parameters used to produce it.
#[derive(Clone, Debug)]
pub struct EncryptedData {
    pub data: Vec<u8>,
    pub parameters: EncryptionParameters,
}

/// Pluggable encryption strategy.
///
/// Receives the deflated bytes of one entry; the container stores the result
/// as is and lists the parameters in the manifest.
pub trait Encrypter: Send + Sync {
    fn encrypt(&self, plain: &[u8], password: &str) -> Result<EncryptedData>;
}

/// Anything the package can be written to.
pub trait WriteSeek: Write + Seek {}

impl<T: Write + Seek> WriteSeek for T {}

#[derive(Debug)]
struct ManifestEntry {
    path: String,
    media_type: &'static str,
    size: u64,
    encryption: Option<EncryptionParameters>,
}

#[derive(Debug)]
struct OpenEntry {
    path: String,
    media_type: &'static str,
    size: u64,
    /// Plaintext held back until the entry is closed, when encrypting.
    buffer: Option<Vec<u8>>,
}

/// Zip writer that tracks entries for the manifest.
pub struct OdsContainer<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: ContainerOptions,
    manifest: Vec<ManifestEntry>,
    current: Option<OpenEntry>,
}

impl<W: Write + Seek> OdsContainer<W> {
    /// Start a package on `writer` and write the `mimetype` entry.
    pub fn new(writer: W, options: ContainerOptions) -> Result<Self> {
        let mut zip = ZipWriter::new(writer);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file("mimetype", stored)?;
        zip.write_all(MIMETYPE.as_bytes())?;
        Ok(OdsContainer {
            zip,
            options,
            manifest: Vec::new(),
            current: None,
        })
    }

    /// Write a whole entry at once.
    pub fn put_entry(&mut self, path: &str, media_type: &'static str, data: &[u8]) -> Result<()> {
        self.start_entry(path, media_type)?;
        self.write(data)?;
        self.close_entry()
    }

    pub fn start_entry(&mut self, path: &str, media_type: &'static str) -> Result<()> {
        if let Some(open) = &self.current {
            return Err(RustyodsError::custom(format!(
                "entry '{}' is still open",
                open.path
            )));
        }
        let buffer = if self.options.is_encrypted() {
            Some(Vec::new())
        } else {
            self.zip
                .start_file(path, self.options.compression.file_options())?;
            None
        };
        debug!("opened entry {}", path);
        self.current = Some(OpenEntry {
            path: path.to_string(),
            media_type,
            size: 0,
            buffer,
        });
        Ok(())
    }

    /// Append bytes to the open entry.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        let open = self
            .current
            .as_mut()
            .ok_or_else(|| RustyodsError::custom("no entry is open"))?;
        open.size += data.len() as u64;
        match &mut open.buffer {
            Some(buffer) => buffer.extend_from_slice(data),
            None => self.zip.write_all(data)?,
        }
        Ok(())
    }

    pub fn close_entry(&mut self) -> Result<()> {
        let open = self
            .current
            .take()
            .ok_or_else(|| RustyodsError::custom("no entry is open"))?;
        let encryption = match (open.buffer, &self.options.encryption) {
            (Some(plain), Some((encrypter, password))) => {
                let compressed = deflate(&plain, self.options.compression.flate2_level())?;
                let encrypted = encrypter.encrypt(&compressed, password)?;
                let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
                self.zip.start_file(open.path.as_str(), stored)?;
                self.zip.write_all(&encrypted.data)?;
                Some(encrypted.parameters)
            }
            _ => None,
        };
        debug!("closed entry {} ({} bytes)", open.path, open.size);
        self.manifest.push(ManifestEntry {
            path: open.path,
            media_type: open.media_type,
            size: open.size,
            encryption,
        });
        Ok(())
    }

    /// Paths of the entries written so far, excluding `mimetype`.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.manifest.iter().map(|e| e.path.as_str())
    }

    /// Write the manifest and finish the archive.
    pub fn finish(mut self) -> Result<W> {
        if self.current.is_some() {
            self.close_entry()?;
        }
        let manifest = self.manifest_xml();
        self.zip.start_file(
            "META-INF/manifest.xml",
            self.options.compression.file_options(),
        )?;
        self.zip.write_all(manifest.as_bytes())?;
        Ok(self.zip.finish()?)
    }

    fn manifest_xml(&self) -> String {
        let mut out = String::with_capacity(512 + self.manifest.len() * 160);
        out.push_str(XML_PROLOG);
        out.push_str(
            "<manifest:manifest xmlns:manifest=\"urn:oasis:names:tc:opendocument:xmlns:manifest:1.0\" manifest:version=\"1.2\">",
        );
        out.push_str("<manifest:file-entry manifest:full-path=\"/\" manifest:version=\"1.2\"");
        push_attr(&mut out, "manifest:media-type", MIMETYPE);
        out.push_str("/>");
        for entry in &self.manifest {
            trace!("manifest entry {} ({})", entry.path, entry.media_type);
            out.push_str("<manifest:file-entry");
            push_attr(&mut out, "manifest:full-path", &entry.path);
            push_attr(&mut out, "manifest:media-type", entry.media_type);
            match &entry.encryption {
                Some(parameters) => {
                    push_int_attr(&mut out, "manifest:size", entry.size);
                    out.push('>');
                    parameters.write_xml(&mut out);
                    out.push_str("</manifest:file-entry>");
                }
                None => out.push_str("/>"),
            }
        }
        out.push_str("</manifest:manifest>");
        out
    }
}

/// Raw deflate, as the package format expects for encrypted entries.
fn deflate(data: &[u8], level: flate2::Compression) -> Result<Vec<u8>> {
    let mut encoder = flate2::write::DeflateEncoder::new(Vec::with_capacity(data.len() / 2), level);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
