//! Synchronous API client for the PetFriends pet-management service.
//!
//! # Overview
//! Authenticates, lists, creates, updates, photographs and deletes pet
//! records. Every operation answers with a `Reply`: the HTTP status code and
//! the decoded JSON body (or raw text when it does not decode). Status codes
//! are never turned into errors; the end-to-end suite asserts on them.
//!
//! # Design
//! - `PetFriendsClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`, so the I/O boundary is explicit.
//! - `Transport` executes requests; `UreqTransport` is the blocking default.
//! - `PetFriends` pairs the two into one call per operation.
//! - `Settings` carries base URL, credentials and the fixture directory
//!   explicitly instead of through globals.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::PetFriends;
pub use client::PetFriendsClient;
pub use config::Settings;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Multipart};
pub use transport::{Transport, UreqTransport};
pub use types::{AuthKey, Body, Credentials, NewPet, Pet, PetFilter, PetList, PetPhoto, Reply};
