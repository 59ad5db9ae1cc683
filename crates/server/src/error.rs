//! Server errors.

use minicoin_api::CodecError;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while serving connections.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Codec(#[from] CodecError),

    #[error("connection timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, ServerError>;
