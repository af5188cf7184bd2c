//! The read → search → choose → download loop.
//!
//! [`start`] wires the real collaborators together (credentials, the Spotify
//! catalog, the HTTP image source). [`App`] itself only sees the [`Catalog`]
//! and [`ImageSource`] traits, so tests drive it with in-memory fakes.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::catalog::{artist_name, image_url, AlbumRecord, Catalog, CatalogError};
use crate::config::Config;
use crate::console::Console;
use crate::credentials::CredentialStore;
use crate::fetcher::{self, ArtworkFetcher, HttpImageSource, ImageSource};
use crate::sanitize::sanitize;
use crate::selector;
use crate::spotify::SpotifyCatalog;

/// Typed at the query prompt to quit (case-insensitive).
pub const EXIT_COMMAND: &str = "exit";

pub const EXIT_INVALID_CREDENTIALS: i32 = 1;
pub const EXIT_DIRECTORY_CREATION: i32 = 2;
pub const EXIT_IO: i32 = 3;
pub const EXIT_CATALOG_UNAVAILABLE: i32 = 4;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid Spotify credentials")]
    InvalidCredentials,
    /// The credential check never got an answer from the service.
    #[error("Cannot reach Spotify: {0}")]
    CatalogUnavailable(CatalogError),
    #[error("Unable to create directory {}: {source}", path.display())]
    DirectoryCreation { path: PathBuf, source: io::Error },
    #[error("Console I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl AppError {
    /// Process exit status for this failure. A clean exit is 0.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidCredentials => EXIT_INVALID_CREDENTIALS,
            AppError::CatalogUnavailable(_) => EXIT_CATALOG_UNAVAILABLE,
            AppError::DirectoryCreation { .. } => EXIT_DIRECTORY_CREATION,
            AppError::Io(_) => EXIT_IO,
        }
    }
}

/// What a line typed at the query prompt means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Exit,
    Blank,
    Query(String),
}

/// Classify one query-prompt line. End of input counts as exit.
pub fn classify_input(line: Option<&str>) -> Input {
    let Some(line) = line else {
        return Input::Exit;
    };
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case(EXIT_COMMAND) {
        Input::Exit
    } else if trimmed.is_empty() {
        Input::Blank
    } else {
        Input::Query(trimmed.to_string())
    }
}

/// How a single query ended. Every variant returns to the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Saved(PathBuf),
    NotFound,
    NoArtwork,
    SearchFailed,
    FetchFailed,
}

/// `<dir>/<sanitized title>.jpg`
pub fn artwork_path(dir: &Path, title: &str) -> PathBuf {
    dir.join(format!("{}.jpg", sanitize(title)))
}

/// Create `dir` (and parents) unless it already exists. An existing
/// directory is cleared of temp files left by an interrupted download.
pub fn ensure_directory<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    dir: &Path,
) -> Result<(), AppError> {
    if dir.is_dir() {
        if let Err(e) = fetcher::remove_stale_temp_files(dir) {
            warn!("Cannot scan {} for stale temp files: {}", dir.display(), e);
        }
        return Ok(());
    }
    match fs::create_dir_all(dir) {
        Ok(()) => {
            console.info(&format!("Created directory: {}", dir.display()))?;
            Ok(())
        }
        Err(source) => {
            let err = AppError::DirectoryCreation {
                path: dir.to_path_buf(),
                source,
            };
            console.error(&format!("Error: {}", err))?;
            Err(err)
        }
    }
}

/// Check the catalog accepts its credentials before anything else happens.
/// A rejection and an unreachable service are reported differently.
pub fn connect<C: Catalog, R: BufRead, W: Write>(
    mut catalog: C,
    console: &mut Console<R, W>,
) -> Result<C, AppError> {
    match catalog.check() {
        Ok(()) => Ok(catalog),
        Err(CatalogError::Auth(detail)) => {
            debug!("Credential check rejected: {}", detail);
            console.error("Invalid Spotify credentials. Please check your Client ID and Client Secret.")?;
            console.info("Exiting due to invalid credentials.")?;
            Err(AppError::InvalidCredentials)
        }
        Err(e) => {
            let err = AppError::CatalogUnavailable(e);
            console.error(&format!("Error: {}. Please check your internet connection.", err))?;
            console.info("Exiting the program.")?;
            Err(err)
        }
    }
}

pub struct App<C, S> {
    catalog: C,
    fetcher: ArtworkFetcher<S>,
    output_dir: PathBuf,
    search_limit: u32,
}

impl<C: Catalog, S: ImageSource> App<C, S> {
    pub fn new(catalog: C, fetcher: ArtworkFetcher<S>, output_dir: PathBuf, search_limit: u32) -> Self {
        App {
            catalog,
            fetcher,
            output_dir,
            search_limit,
        }
    }

    /// Make sure the output directory exists, then serve queries until the
    /// user types `exit` or input ends.
    pub fn run<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> Result<(), AppError> {
        ensure_directory(console, &self.output_dir)?;

        loop {
            let line = console.prompt("Enter the album name (or type 'exit' to quit): ")?;
            match classify_input(line.as_deref()) {
                Input::Exit => {
                    console.info("Exiting the program.")?;
                    return Ok(());
                }
                Input::Blank => {
                    console.info("Please enter a valid album name.")?;
                }
                Input::Query(query) => match self.handle_query(console, &query) {
                    Ok(outcome) => debug!("Query {:?} finished: {:?}", query, outcome),
                    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                        console.info("Exiting the program.")?;
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                },
            }
        }
    }

    /// Search, let the user choose, download. Input ending at the selection
    /// prompt is an `UnexpectedEof` error.
    pub fn handle_query<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
        query: &str,
    ) -> io::Result<QueryOutcome> {
        let candidates = match self.catalog.search(query, self.search_limit) {
            Ok(candidates) => candidates,
            Err(e) => {
                console.error(&format!("Error: Search failed: {}", e))?;
                return Ok(QueryOutcome::SearchFailed);
            }
        };

        match selector::choose(console, candidates)? {
            Some(album) => self.download(console, &album),
            None => {
                console.info("No matching album found.")?;
                Ok(QueryOutcome::NotFound)
            }
        }
    }

    fn download<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        album: &AlbumRecord,
    ) -> io::Result<QueryOutcome> {
        let Some(url) = image_url(Some(album)) else {
            console.info("No album artwork found.")?;
            return Ok(QueryOutcome::NoArtwork);
        };

        console.info(&format!(
            "Selected album: {} by {}",
            album.title,
            artist_name(Some(album))
        ))?;

        let destination = artwork_path(&self.output_dir, &album.title);
        match self.fetcher.fetch(url, &destination) {
            Ok(()) => {
                console.success(&format!("Album artwork saved to {}", destination.display()))?;
                Ok(QueryOutcome::Saved(destination))
            }
            Err(e) => {
                console.error(&format!("Error: {}", e))?;
                Ok(QueryOutcome::FetchFailed)
            }
        }
    }
}

/// Full interactive session with the real Spotify catalog.
pub fn start<R: BufRead, W: Write>(config: &Config, console: &mut Console<R, W>) -> Result<(), AppError> {
    console.info("Welcome to Album Artwork Downloader!")?;
    console.info("This program downloads the album artwork of a given album from Spotify.")?;
    console.info("You can type 'exit' to quit the program at any time.")?;

    let store = CredentialStore::new(config.credentials_file());
    let Some(credentials) = store.get_or_prompt(console)? else {
        console.info("Exiting the program.")?;
        return Ok(());
    };

    let catalog = connect(SpotifyCatalog::new(credentials), console)?;
    info!("Spotify credentials accepted");

    let fetcher = ArtworkFetcher::new(HttpImageSource::new(config.download_timeout()));
    let mut app = App::new(catalog, fetcher, config.output_dir(), config.search_limit());
    app.run(console)
}
