//! Spotify Web API album search.
//!
//! Authentication uses the client-credentials flow: the client id/secret pair
//! is exchanged for a bearer token, which is cached until shortly before it
//! expires and then exchanged again from the same pair.

use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::debug;
use serde::Deserialize;

use crate::catalog::{AlbumRecord, ArtistRef, Catalog, CatalogError, ImageRef};
use crate::credentials::Credentials;
use crate::http::{self, Failure};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Refresh this long before the service says the token expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

// ── API response types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    albums: Option<AlbumPage>,
}

#[derive(Debug, Deserialize)]
struct AlbumPage {
    // The service occasionally returns `null` entries.
    #[serde(default)]
    items: Vec<Option<ApiAlbum>>,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    #[serde(default)]
    name: String,
    artists: Option<Vec<ApiArtist>>,
    images: Option<Vec<ApiImage>>,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    #[serde(default)]
    url: String,
}

impl From<ApiAlbum> for AlbumRecord {
    fn from(api: ApiAlbum) -> Self {
        AlbumRecord {
            title: api.name,
            artists: api
                .artists
                .unwrap_or_default()
                .into_iter()
                .map(|a| ArtistRef { name: a.name })
                .collect(),
            images: api
                .images
                .unwrap_or_default()
                .into_iter()
                .filter(|i| !i.url.is_empty())
                .map(|i| ImageRef { url: i.url })
                .collect(),
        }
    }
}

fn records_from_response(response: SearchResponse) -> Vec<AlbumRecord> {
    response
        .albums
        .map(|page| page.items.into_iter().flatten().map(AlbumRecord::from).collect())
        .unwrap_or_default()
}

/// Statuses meaning "credentials rejected" from the token endpoint, which
/// answers `invalid_client` with 400.
const TOKEN_AUTH_STATUSES: &[u16] = &[400, 401, 403];
/// Statuses meaning "token rejected" from the API; a 400 there is a bad query.
const API_AUTH_STATUSES: &[u16] = &[401, 403];

fn catalog_error(error: ureq::Error, auth_statuses: &[u16]) -> CatalogError {
    match http::classify(error) {
        Failure::Timeout => CatalogError::Timeout,
        Failure::ConnectionFailed => CatalogError::ConnectionFailed,
        Failure::Status(code, text) if auth_statuses.contains(&code) => {
            CatalogError::Auth(format!("HTTP {} {}", code, text))
        }
        Failure::Status(code, text) => CatalogError::Request(format!("HTTP {} {}", code, text)),
        Failure::Other(detail) => CatalogError::Request(detail),
    }
}

// ── Client ───────────────────────────────────────────────────────────────────

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Album catalog backed by the Spotify Web API.
pub struct SpotifyCatalog {
    credentials: Credentials,
    agent: ureq::Agent,
    token_url: String,
    api_base: String,
    token: Option<AccessToken>,
}

impl SpotifyCatalog {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoints(credentials, TOKEN_URL, API_BASE)
    }

    /// Client talking to alternative endpoints (`api_base` without trailing
    /// slash, e.g. `https://api.spotify.com/v1`).
    pub fn with_endpoints(credentials: Credentials, token_url: &str, api_base: &str) -> Self {
        SpotifyCatalog {
            credentials,
            agent: http::agent(REQUEST_TIMEOUT),
            token_url: token_url.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Current bearer token, exchanging the credentials for a new one when
    /// there is none or it is about to expire.
    fn access_token(&mut self) -> Result<String, CatalogError> {
        if let Some(token) = &self.token {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
            debug!("Access token expired, requesting a new one");
        }

        let basic = BASE64.encode(format!(
            "{}:{}",
            self.credentials.client_id, self.credentials.client_secret
        ));
        let response = self
            .agent
            .post(&self.token_url)
            .set("Authorization", &format!("Basic {}", basic))
            .send_form(&[("grant_type", "client_credentials")])
            .map_err(|e| catalog_error(e, TOKEN_AUTH_STATUSES))?;
        let token: TokenResponse = response
            .into_json()
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        debug!("Obtained access token valid for {}s", token.expires_in);
        self.token = Some(AccessToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }
}

impl Catalog for SpotifyCatalog {
    fn search(&mut self, query: &str, limit: u32) -> Result<Vec<AlbumRecord>, CatalogError> {
        let token = self.access_token()?;
        let url = format!("{}/search", self.api_base);

        let result = self
            .agent
            .get(&url)
            .query("q", query)
            .query("type", "album")
            .query("limit", &limit.to_string())
            .set("Authorization", &format!("Bearer {}", token))
            .call();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let err = catalog_error(e, API_AUTH_STATUSES);
                if matches!(err, CatalogError::Auth(_)) {
                    // Revoked or expired early; the next call starts fresh.
                    self.token = None;
                }
                return Err(err);
            }
        };

        let parsed: SearchResponse = response
            .into_json()
            .map_err(|e| CatalogError::Parse(e.to_string()))?;
        let mut records = records_from_response(parsed);
        records.truncate(limit as usize);
        debug!("Search {:?}: {} album(s)", query, records.len());
        Ok(records)
    }

    fn check(&mut self) -> Result<(), CatalogError> {
        self.search("test", 1).map(|_| ())
    }
}
