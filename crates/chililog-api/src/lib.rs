// chililog-api: Async Rust client for the Chililog server REST API

pub mod auth;
pub mod client;
pub mod documents;
pub mod error;
pub mod headers;
pub mod models;
pub mod repositories;
pub mod transport;

pub use auth::Authenticated;
pub use client::ApiClient;
pub use documents::Resource;
pub use error::Error;
pub use headers::ServerInfo;
pub use repositories::RepositoryAction;
pub use transport::{TlsMode, TransportConfig};
