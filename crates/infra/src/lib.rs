//! # Tokenline Infrastructure
//!
//! Everything that performs I/O on behalf of the domain types.
//!
//! This crate contains:
//! - The authenticated API client with token refresh (`api`)
//! - The retrying transport it sends through (`http`)
//! - Credential stores (`credentials`)
//! - Configuration loading and logging setup
//! - Data loaders built on the client (`loaders`)

pub mod api;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod http;
pub mod loaders;
pub mod observability;

// Re-export commonly used items
pub use api::*;
pub use credentials::{
    open_store, CredentialStore, FileCredentialStore, KeychainCredentialStore,
    MemoryCredentialStore,
};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
