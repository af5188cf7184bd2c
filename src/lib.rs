pub mod app;
pub mod catalog;
pub mod config;
pub mod console;
pub mod credentials;
pub mod fetcher;
pub mod http;
pub mod sanitize;
pub mod selector;
pub mod spotify;

pub use app::{App, AppError};
pub use catalog::{artist_name, image_url, AlbumRecord, ArtistRef, Catalog, CatalogError, ImageRef};
pub use config::Config;
pub use console::Console;
pub use credentials::{CredentialStore, Credentials};
pub use fetcher::{ArtworkFetcher, FetchError, HttpImageSource, ImageSource};
pub use sanitize::sanitize;
pub use spotify::SpotifyCatalog;
