//! YAML-backed policy storage for the authorization engine.
//!
//! Policies are plain YAML documents listing users, roles, permission rules
//! and collect terms. [`PolicyLoader`] reads them from disk and
//! [`MemoryPolicyStore`] serves them through [`authz::PolicyStorage`].

pub mod document;
pub mod error;
pub mod loader;
pub mod store;

pub use document::PolicyDocument;
pub use error::{PolicyStoreError, Result};
pub use loader::PolicyLoader;
pub use store::MemoryPolicyStore;
