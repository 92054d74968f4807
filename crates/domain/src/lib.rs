//! # Tokenline Domain
//!
//! Domain types shared by every Tokenline crate.
//!
//! This crate contains:
//! - Domain error type and Result definition
//! - Configuration structures
//! - Credential keys and endpoint constants
//! - Wire payloads and the data shapes handed to callers
//!
//! ## Architecture
//! - No dependencies on other Tokenline crates
//! - No I/O; pure data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
