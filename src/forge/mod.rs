//! forge
//!
//! Abstraction for the remote hosting service (GitHub v1).
//!
//! # Architecture
//!
//! The `Forge` trait defines the narrow capability set the publish pipeline
//! needs: read a file at a path on a branch, read the branch's recursive
//! tree, create blobs/trees/commits, and read/move a branch ref. The
//! pipeline never imports a concrete implementation; it takes `&dyn Forge`,
//! which keeps it testable against the in-memory mock.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait, error taxonomy, and object types
//! - [`github`]: GitHub implementation using the REST git-data API
//! - [`mock`]: In-memory implementation for deterministic testing

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
