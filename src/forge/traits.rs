//! forge::traits
//!
//! Forge trait definition for interacting with remote hosting services.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! All methods return `Result` to handle API errors gracefully.
//!
//! The trait is deliberately narrow: it exposes exactly the git-data
//! capabilities the publish pipeline needs (read content, read tree, write
//! blob/tree/commit, read/move a branch ref) so the pipeline can be driven
//! against an in-memory fake in tests.
//!
//! # Example
//!
//! ```ignore
//! use treepush::forge::{Forge, TreeEntry};
//!
//! async fn upload(forge: &dyn Forge) -> Result<(), ForgeError> {
//!     let sha = forge.create_blob("hello\n").await?;
//!     let base = forge.get_branch_tree("main").await?;
//!     let tree = forge
//!         .create_tree(&base.sha, &[TreeEntry::blob("greeting.txt", &sha)])
//!         .await?;
//!     println!("new tree {}", tree);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Errors from forge operations.
///
/// These error types map to common failure modes when interacting
/// with remote hosting services like GitHub.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested object was not found on the branch.
    ///
    /// This is the only variant the pipeline ever absorbs: during change
    /// detection it means "the file does not exist remotely yet."
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Git mode string for a regular (non-executable) file blob.
pub const REGULAR_FILE_MODE: &str = "100644";

/// One entry submitted to tree construction: a path mapped to an uploaded
/// blob. Ephemeral; exists only between blob upload and tree creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path of the file within the repository
    pub path: String,
    /// Content hash of the uploaded blob
    pub sha: String,
    /// Git mode string (always [`REGULAR_FILE_MODE`] for this tool)
    pub mode: String,
}

impl TreeEntry {
    /// Create a regular-file blob entry.
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sha: sha.into(),
            mode: REGULAR_FILE_MODE.to_string(),
        }
    }
}

/// Handle to a tree object in the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeHandle {
    /// Content hash of the tree
    pub sha: String,
}

/// A commit object in the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Content hash of the commit
    pub sha: String,
    /// Hash of the tree this commit snapshots
    pub tree: String,
    /// Parent commit hashes (exactly one for commits this tool creates)
    pub parents: Vec<String>,
    /// Commit message
    pub message: String,
}

/// A named mutable pointer to a branch head commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Fully qualified ref name (e.g., "refs/heads/main")
    pub ref_name: String,
    /// Hash of the commit the ref currently points at
    pub sha: String,
}

/// The Forge trait for interacting with remote hosting services.
///
/// v1 implements GitHub only. The [`mock`] implementation backs all
/// pipeline tests.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. Callers should handle:
/// - `NotFound`: object absent on the branch (absorbed only by change detection)
/// - `AuthRequired` / `AuthFailed` / `RateLimited` / `ApiError` /
///   `NetworkError`: fatal, surface to the operator
///
/// [`mock`]: crate::forge::mock
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Get the decoded text content of the file at `path` on `branch`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no object exists at that path on the branch
    async fn get_content(&self, path: &str, branch: &str) -> Result<String, ForgeError>;

    /// Get the full recursive tree at the head of `branch`.
    ///
    /// The returned handle anchors tree creation: entries layered onto it
    /// inherit everything the base tree already contains.
    async fn get_branch_tree(&self, branch: &str) -> Result<TreeHandle, ForgeError>;

    /// Upload text content as a blob; returns the remote-assigned hash.
    ///
    /// Blobs are immutable; ownership transfers to the remote store.
    async fn create_blob(&self, content: &str) -> Result<String, ForgeError>;

    /// Create a tree from `entries` layered on `base_tree`.
    ///
    /// Paths not named in `entries` are inherited from the base unchanged;
    /// that merge is the remote system's behavior, not computed here.
    /// Returns the new tree's hash.
    async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry])
        -> Result<String, ForgeError>;

    /// Get a commit object by hash.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no commit with that hash exists
    async fn get_commit(&self, sha: &str) -> Result<Commit, ForgeError>;

    /// Create a commit referencing `tree` with the given parents and message.
    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<Commit, ForgeError>;

    /// Get the mutable reference for `branch`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the branch does not exist
    async fn get_branch_ref(&self, branch: &str) -> Result<BranchRef, ForgeError>;

    /// Move the reference for `branch` to point at `commit_sha`.
    ///
    /// This is the only externally visible mutation a successful run
    /// performs. Not atomic with commit creation: a failure between the two
    /// leaves an unreferenced commit in the store, and a rerun repairs it.
    async fn update_branch_ref(&self, branch: &str, commit_sha: &str) -> Result<(), ForgeError>;
}
