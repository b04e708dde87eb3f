//! KitabCorner application library
//!
//! Wires the configured collaborators into the `books` and `admin` modules and
//! runs them behind the HTTP server.

pub mod app;
pub mod modules;

pub use app::{build_registry, serve, AppServices};
