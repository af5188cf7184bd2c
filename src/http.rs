//! Shared `ureq` plumbing: agent construction and failure classification.

use std::error::Error;
use std::io;
use std::time::Duration;

pub const USER_AGENT: &str = "AlbumArtworkDownloader/0.1";

/// Build an agent whose whole request (connect + headers + body) is bounded
/// by `timeout`.
pub fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

/// What went wrong with a request, independent of the caller's error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Timeout,
    ConnectionFailed,
    /// Non-2xx response.
    Status(u16, String),
    Other(String),
}

pub fn classify(error: ureq::Error) -> Failure {
    match error {
        ureq::Error::Status(code, response) => {
            Failure::Status(code, response.status_text().to_string())
        }
        ureq::Error::Transport(transport) => {
            if transport_timed_out(&transport) {
                Failure::Timeout
            } else if matches!(
                transport.kind(),
                ureq::ErrorKind::ConnectionFailed | ureq::ErrorKind::Dns
            ) {
                Failure::ConnectionFailed
            } else {
                Failure::Other(transport.to_string())
            }
        }
    }
}

/// True for I/O errors raised by an expired socket deadline.
pub fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    ) || error.to_string().to_ascii_lowercase().contains("timed out")
}

fn transport_timed_out(transport: &ureq::Transport) -> bool {
    let mut source = transport.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if is_timeout(io_err) {
                return true;
            }
        }
        source = err.source();
    }
    transport.to_string().to_ascii_lowercase().contains("timed out")
}
