//! # NadeoServices map client
//!
//! Looks up maps by UID and downloads their files from NadeoServices,
//! keeping an access/refresh token pair cached and renewed on demand.
//!
//! Modules:
//! - `client` — authenticated client owning the HTTP session and token cache
//! - `cache` — token state and the reuse / refresh / re-authenticate decision
//! - `parser` — access token payload decoding
//! - `credentials` — ordered credential sources
//! - `config` — YAML service configuration
//! - `importer` — add-maps workflow over storage, playlist and notifier collaborators

pub mod cache;
pub mod client;
pub mod config;
pub mod credentials;
pub mod helpers;
pub mod importer;
pub mod observability;
pub mod parser;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::client::{MapDownload, MapInfo, TokenClient};
pub use crate::config::service::{ServiceConfig, ServiceEndpoints};
pub use crate::credentials::Credentials;
