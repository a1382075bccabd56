//! CMDB Core - Object rendering and reference resolution
//!
//! This crate merges user-editable type schemas with stored configuration
//! items, including:
//! - Type, Object, User and ACL models
//! - Field merging with permissive date parsing
//! - Single-hop reference resolution with summary line templates
//! - Depth-bounded, cycle-guarded reference-section expansion
//! - External link and object summary rendering
//! - Reverse-reference discovery, pagination and inbound reference clearing
//!
//! Persistence and access control are collaborators behind the
//! [`ObjectStore`] and [`AccessControl`] traits.

pub mod access;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod references;
pub mod render;
pub mod store;

// Re-export commonly used types
pub use access::{AccessControl, AllowAllAccess, TypeAclAccess};
pub use config::EngineConfig;
pub use errors::{CmdbError, ExError, ExErrorKind, Result};
pub use model::{Object, Type, User};
pub use references::{clear_references, PagedResult, ReferenceQuery, ReverseReferenceFinder};
pub use render::{Reference, RenderEngine, RenderRequest, RenderResult};
pub use store::{MemoryStore, ObjectStore, ObjectStoreMut};

// Paths used by the exported logging macros
#[doc(hidden)]
pub mod __private {
    pub use cmdb_core_types::schema;
    pub use tracing;
}
