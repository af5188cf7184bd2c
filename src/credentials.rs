//! Catalog API credentials, cached as a small JSON file.
//!
//! The file holds exactly `{"client_id": "...", "client_secret": "..."}`.
//! A missing, unreadable or corrupted file is the same as no saved
//! credentials: the user is asked again and the file is overwritten.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::console::Console;

const CREDENTIALS_FILE_NAME: &str = ".spotify_credentials.json";

/// Client-identity pair for the catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Credentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Both halves present.
    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Client ID and Client Secret cannot be empty.")]
    EmptyField,
    #[error("Cannot save credentials: {0}")]
    Io(#[from] io::Error),
    #[error("Cannot encode credentials: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// JSON file holding one [`Credentials`] pair.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore { path: path.into() }
    }

    /// `~/.spotify_credentials.json`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CREDENTIALS_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved credentials, or `None` when there is nothing usable on disk.
    pub fn load(&self) -> Option<Credentials> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Cannot read credentials file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Credentials>(&content) {
            Ok(creds) if creds.is_complete() => Some(creds),
            Ok(_) => {
                warn!("Credentials file {} has empty fields", self.path.display());
                None
            }
            Err(e) => {
                warn!("Corrupted credentials file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Overwrite the file with `creds`. Incomplete pairs are rejected before
    /// anything is written.
    pub fn save(&self, creds: &Credentials) -> Result<(), CredentialError> {
        if !creds.is_complete() {
            return Err(CredentialError::EmptyField);
        }
        let json = serde_json::to_string(creds)?;
        fs::write(&self.path, json)?;
        debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }

    /// Saved credentials if there are any, otherwise ask until the user
    /// enters a complete pair. Returns `Ok(None)` if input ends first.
    pub fn get_or_prompt<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
    ) -> io::Result<Option<Credentials>> {
        if let Some(creds) = self.load() {
            console.info("Using saved Spotify credentials.")?;
            return Ok(Some(creds));
        }

        loop {
            let Some(client_id) = console.prompt("Your Spotify Client ID: ")? else {
                return Ok(None);
            };
            let Some(client_secret) = console.prompt("Your Spotify Client Secret: ")? else {
                return Ok(None);
            };
            let creds = Credentials::new(client_id.trim(), client_secret.trim());

            match self.save(&creds) {
                Ok(()) => return Ok(Some(creds)),
                Err(CredentialError::EmptyField) => {
                    console.error("Error: Client ID and Client Secret cannot be empty.")?;
                }
                Err(e) => {
                    // Still usable for this session, just not remembered.
                    console.error(&format!("Error: {}", e))?;
                    return Ok(Some(creds));
                }
            }
        }
    }
}
