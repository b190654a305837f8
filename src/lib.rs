//! Treepush - commit local file changes to a GitHub branch without a clone
//!
//! Treepush is a single-binary tool for CI jobs that regenerate files and
//! need to push them back. It diffs local file contents against a branch via
//! the GitHub REST API, uploads blobs only for the files that actually
//! changed, layers a new tree onto the branch's current tree, creates a
//! commit with a single parent, and advances the branch reference.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the pipeline)
//! - [`config`] - Explicit configuration value object built once at startup
//! - [`forge`] - Abstraction for the remote hosting service (GitHub v1)
//! - [`publish`] - The diff → blob → tree → commit → ref pipeline
//! - [`ui`] - Output utilities
//!
//! # Behavior Invariants
//!
//! 1. A run produces at most one commit, with exactly one parent (the branch
//!    head at the start of the run)
//! 2. The branch reference is moved only when a commit was produced
//! 3. "Object not found on the branch" is the only absorbed remote error; it
//!    means "this file is new" and forces a commit for that file
//! 4. All other remote failures abort the run unchanged

pub mod cli;
pub mod config;
pub mod forge;
pub mod publish;
pub mod ui;
