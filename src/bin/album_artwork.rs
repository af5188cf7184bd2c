//! Interactive album artwork downloader.
//!
//! Asks for an album name, lets the user pick among the Spotify matches and
//! saves the cover as `<album title>.jpg` under `~/Pictures/albumartworks`.
//!
//! Usage:
//!     album_artwork
//!
//! Settings are read from `~/.config/album-artwork/config.toml` if present;
//! `RUST_LOG=debug` shows diagnostic logging.

use std::process;

use albumart::app;
use albumart::{Config, Console};
use log::{debug, warn};

fn main() {
    let mut logger = colog::default_builder();
    logger.filter(None, log::LevelFilter::Warn);
    logger.parse_default_env();
    logger.init();

    // Ctrl-C at any blocking step ends the session like `exit` does.
    if let Err(e) = ctrlc::set_handler(|| {
        println!("\nExiting the program.");
        process::exit(0);
    }) {
        warn!("Cannot install Ctrl-C handler: {}", e);
    }

    let mut console = Console::stdio();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            let _ = console.warning(&format!("Warning: Ignoring unreadable settings file: {}", e));
            Config::new()
        }
    };
    debug!("Using settings: {:?}", config);

    if let Err(e) = app::start(&config, &mut console) {
        debug!("Session ended with error: {}", e);
        if let app::AppError::Io(ref io_err) = e {
            eprintln!("Error: {}", io_err);
        }
        process::exit(e.exit_code());
    }
}
