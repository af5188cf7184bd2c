//! Artwork download, decode and JPEG persistence.
//!
//! Fetching is split in two: an [`ImageSource`] turns a URL into bytes, and
//! [`ArtworkFetcher`] decodes those bytes and writes the JPEG. The file only
//! appears at its destination once it is complete; the encoded bytes are
//! written to a temporary file next to it and renamed into place.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use log::{debug, warn};
use thiserror::Error;

use crate::http::{self, Failure};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const JPEG_QUALITY: u8 = 90;

/// Refuse bodies larger than this; no cover art comes close.
pub const MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

const TEMP_PREFIX: &str = ".artwork-";
const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Download timed out. Please check your internet connection.")]
    Timeout,
    #[error("Connection failed. Please check your internet connection.")]
    ConnectionFailed,
    #[error("Failed to download album artwork: {0}")]
    RequestFailed(String),
    #[error("Failed to process image: {0}")]
    DecodeFailed(String),
    #[error("Failed to save image: {0}")]
    WriteFailed(String),
}

impl From<Failure> for FetchError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Timeout => FetchError::Timeout,
            Failure::ConnectionFailed => FetchError::ConnectionFailed,
            Failure::Status(code, text) => FetchError::RequestFailed(format!("HTTP {} {}", code, text)),
            Failure::Other(detail) => FetchError::RequestFailed(detail),
        }
    }
}

/// Something that can turn an image URL into its raw bytes.
pub trait ImageSource {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Plain HTTP GET with a single overall timeout.
pub struct HttpImageSource {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpImageSource {
    pub fn new(timeout: Duration) -> Self {
        Self::with_max_bytes(timeout, MAX_IMAGE_BYTES)
    }

    /// Source that rejects bodies longer than `max_bytes`.
    pub fn with_max_bytes(timeout: Duration, max_bytes: u64) -> Self {
        HttpImageSource {
            agent: http::agent(timeout),
            max_bytes,
        }
    }
}

impl Default for HttpImageSource {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ImageSource for HttpImageSource {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| FetchError::from(http::classify(e)))?;

        let body = read_body(response.into_reader(), self.max_bytes)?;
        debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

/// Read a whole response body, failing if it is longer than `limit` bytes.
fn read_body(reader: impl Read, limit: u64) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|e| {
            if http::is_timeout(&e) {
                FetchError::Timeout
            } else {
                FetchError::RequestFailed(e.to_string())
            }
        })?;
    if body.len() as u64 > limit {
        return Err(FetchError::RequestFailed(format!(
            "response exceeds {} bytes",
            limit
        )));
    }
    Ok(body)
}

/// Downloads artwork and stores it as JPEG.
pub struct ArtworkFetcher<S> {
    source: S,
}

impl<S: ImageSource> ArtworkFetcher<S> {
    pub fn new(source: S) -> Self {
        ArtworkFetcher { source }
    }

    /// Download `url`, decode it and write it to `destination` as JPEG,
    /// replacing any existing file. Nothing is left at `destination` unless
    /// the whole sequence succeeds.
    pub fn fetch(&self, url: &str, destination: &Path) -> Result<(), FetchError> {
        let bytes = self.source.get(url)?;
        let image = decode(&bytes)?;
        write_jpeg(&image, destination)
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, FetchError> {
    image::load_from_memory(bytes).map_err(|e| FetchError::DecodeFailed(e.to_string()))
}

fn write_jpeg(image: &DynamicImage, destination: &Path) -> Result<(), FetchError> {
    let dir = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    // Encode fully before touching the disk so the temp file only lives for
    // one write and a rename. JPEG has no alpha channel.
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY)
        .encode_image(&image.to_rgb8())
        .map_err(write_failed)?;

    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(write_failed)?;
    temp.write_all(&encoded).map_err(write_failed)?;
    temp.persist(destination).map_err(|e| write_failed(e.error))?;
    debug!("Wrote {} ({} bytes)", destination.display(), encoded.len());
    Ok(())
}

fn write_failed(error: impl std::fmt::Display) -> FetchError {
    FetchError::WriteFailed(error.to_string())
}

/// Delete temp files an interrupted write left in `dir`. Returns how many
/// were removed.
pub fn remove_stale_temp_files(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !(name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)) {
            continue;
        }
        if !entry.file_type()?.is_file() {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => {
                debug!("Removed stale temp file {}", entry.path().display());
                removed += 1;
            }
            Err(e) => warn!("Cannot remove stale temp file {}: {}", entry.path().display(), e),
        }
    }
    Ok(removed)
}
