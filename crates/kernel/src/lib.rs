//! Core building blocks shared by every Bookshelf crate: layered settings,
//! the module lifecycle, and the per-request context.

pub mod context;
pub mod module;
pub mod registry;
pub mod settings;

pub use context::{CancelHandle, ContextError, RequestContext, RequestTimeout};
pub use module::{InitCtx, Module, SchemaStatement};
pub use registry::ModuleRegistry;
