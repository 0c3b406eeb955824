//! Error types for the PetFriends client.
//!
//! # Design
//! Remote status codes are never errors here: a 403 or 500 is data the
//! caller asserts on, carried in `Reply::status`. `ApiError` only covers
//! failures on this side of the wire.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP round trip itself failed (connection, TLS, body read).
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    #[error("failed to read photo {}: {source}", .path.display())]
    PhotoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("failed to read settings file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to load .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}
