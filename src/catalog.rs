//! Album records returned by the music catalog, and the catalog interface.
//!
//! The concrete remote client lives in [`crate::spotify`]; everything else in
//! the pipeline only sees the [`Catalog`] trait and these plain record types.

use log::warn;
use thiserror::Error;

/// Artist name used whenever a record carries no artist.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

// ── Record types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Absolute HTTP(S) URL of the artwork.
    pub url: String,
}

/// One album as returned by a catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumRecord {
    pub title: String,
    /// Credited artists; only the first one is ever shown.
    pub artists: Vec<ArtistRef>,
    /// Artwork, largest first.
    pub images: Vec<ImageRef>,
}

impl AlbumRecord {
    /// A record with no artists and no images.
    pub fn new(title: impl Into<String>) -> Self {
        AlbumRecord {
            title: title.into(),
            artists: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn with_artist(mut self, name: impl Into<String>) -> Self {
        self.artists.push(ArtistRef { name: name.into() });
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.push(ImageRef { url: url.into() });
        self
    }
}

// ── Accessors ────────────────────────────────────────────────────────────────

/// URL of the preferred (first, highest-resolution) image, if any.
pub fn image_url(record: Option<&AlbumRecord>) -> Option<&str> {
    record?.images.first().map(|image| image.url.as_str())
}

/// Name of the first credited artist, or [`UNKNOWN_ARTIST`].
pub fn artist_name(record: Option<&AlbumRecord>) -> &str {
    record
        .and_then(|r| r.artists.first())
        .map(|artist| artist.name.as_str())
        .unwrap_or(UNKNOWN_ARTIST)
}

// ── Catalog interface ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The service rejected the client credentials.
    #[error("credentials rejected: {0}")]
    Auth(String),
    #[error("request timed out")]
    Timeout,
    #[error("connection failed")]
    ConnectionFailed,
    #[error("{0}")]
    Request(String),
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// A searchable album catalog.
pub trait Catalog {
    /// Search albums by free text. Results keep the service's ranking and
    /// are bounded by `limit`.
    fn search(&mut self, query: &str, limit: u32) -> Result<Vec<AlbumRecord>, CatalogError>;

    /// Make one cheap authenticated request. `Err(CatalogError::Auth)` means
    /// the credentials were rejected; other errors mean no answer was had.
    fn check(&mut self) -> Result<(), CatalogError>;

    /// Whether the credentials are accepted. Never fails; any error counts
    /// as "not valid".
    fn validate(&mut self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(e) => {
                warn!("Credential check failed: {}", e);
                false
            }
        }
    }
}
