//! Named resource registries
//!
//! Provides the name → shared handle store used for render passes and
//! render pipelines.

mod name_registry;

pub use name_registry::NameRegistry;
