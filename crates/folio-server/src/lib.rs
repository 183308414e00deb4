//! # folio-server
//!
//! HTTP backend for the folio portfolio application: accounts and login
//! sessions, profiles, projects with PUBLIC/PRIVATE visibility, and a per-user
//! audit log.

pub mod audit;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use observability::shutdown_tracing;
pub use server::{AppState, FolioServer, ServerBuilder, build_app};
