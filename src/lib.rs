//! # MemVault
//!
//! A semantic memory service for content-management backends.
//!
//! ## Features
//!
//! - **Store:** embed a text memory via Together AI and upsert it into a
//!   Pinecone index with project/type/title metadata
//! - **Recall:** top-5 similarity search for a query, optionally filtered
//!   by project
//! - **Stateless:** both operations are per-request pass-throughs; clients
//!   are constructed once at startup and injected into handlers

pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod server;
pub mod service;

pub use config::Config;
pub use error::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");
