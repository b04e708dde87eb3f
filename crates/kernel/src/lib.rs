//! Core traits, settings, and the module registry shared by every KitabCorner crate.

pub mod callable;
pub mod module;
pub mod payload;
pub mod registry;
pub mod settings;

pub use callable::{Callable, CallableError};
pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
