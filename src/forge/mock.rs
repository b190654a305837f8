//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge is a tiny in-memory git object store: content-addressed
//! blobs, full-snapshot trees, commits, and branch refs. `create_tree` layers
//! new entries onto a cloned base snapshot, which reproduces the remote
//! system's merge behavior (paths not named in the new entries are inherited
//! unchanged). It allows configuring failure scenarios and records every
//! operation for verification.
//!
//! # Example
//!
//! ```
//! use treepush::forge::mock::MockForge;
//! use treepush::forge::Forge;
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::with_files(vec![("README.md", "hello\n")]);
//!
//! let content = forge.get_content("README.md", "main").await.unwrap();
//! assert_eq!(content, "hello\n");
//!
//! let head = forge.get_branch_ref("main").await.unwrap();
//! assert_eq!(head.ref_name, "refs/heads/main");
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use super::traits::{BranchRef, Commit, Forge, ForgeError, TreeEntry, TreeHandle};

/// Branch seeded by the constructors.
const SEED_BRANCH: &str = "main";

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    /// Blob contents by sha.
    blobs: HashMap<String, String>,
    /// Full path→blob-sha snapshots by tree sha.
    trees: HashMap<String, BTreeMap<String, String>>,
    /// Commits by sha.
    commits: HashMap<String, Commit>,
    /// Branch name → head commit sha.
    refs: HashMap<String, String>,
    /// Counter for assigning object ids.
    next_oid: u64,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail get_content with the given error.
    GetContent(ForgeError),
    /// Fail get_branch_tree with the given error.
    GetBranchTree(ForgeError),
    /// Fail create_blob with the given error.
    CreateBlob(ForgeError),
    /// Fail create_tree with the given error.
    CreateTree(ForgeError),
    /// Fail get_commit with the given error.
    GetCommit(ForgeError),
    /// Fail create_commit with the given error.
    CreateCommit(ForgeError),
    /// Fail get_branch_ref with the given error.
    GetBranchRef(ForgeError),
    /// Fail update_branch_ref with the given error.
    UpdateBranchRef(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone)]
pub enum MockOperation {
    GetContent {
        path: String,
        branch: String,
    },
    GetBranchTree {
        branch: String,
    },
    CreateBlob {
        content: String,
    },
    CreateTree {
        base_tree: String,
        paths: Vec<String>,
    },
    GetCommit {
        sha: String,
    },
    CreateCommit {
        message: String,
        tree: String,
        parents: Vec<String>,
    },
    GetBranchRef {
        branch: String,
    },
    UpdateBranchRef {
        branch: String,
        commit_sha: String,
    },
}

impl MockForge {
    /// Create a mock forge whose `main` branch holds an empty tree.
    pub fn new() -> Self {
        Self::with_files(Vec::new())
    }

    /// Create a mock forge whose `main` branch holds the given files.
    ///
    /// # Example
    ///
    /// ```
    /// use treepush::forge::mock::MockForge;
    ///
    /// let forge = MockForge::with_files(vec![
    ///     ("README.md", "hello\n"),
    ///     ("docs/guide.md", "guide\n"),
    /// ]);
    /// assert_eq!(forge.commit_count(), 1);
    /// ```
    pub fn with_files(files: Vec<(&str, &str)>) -> Self {
        let mut inner = MockForgeInner {
            blobs: HashMap::new(),
            trees: HashMap::new(),
            commits: HashMap::new(),
            refs: HashMap::new(),
            next_oid: 1,
            fail_on: None,
            operations: Vec::new(),
        };

        let mut snapshot = BTreeMap::new();
        for (path, content) in files {
            let blob_sha = inner.next_sha("blob");
            inner.blobs.insert(blob_sha.clone(), content.to_string());
            snapshot.insert(path.to_string(), blob_sha);
        }

        let tree_sha = inner.next_sha("tree");
        inner.trees.insert(tree_sha.clone(), snapshot);

        let commit_sha = inner.next_sha("commit");
        inner.commits.insert(
            commit_sha.clone(),
            Commit {
                sha: commit_sha.clone(),
                tree: tree_sha,
                parents: Vec::new(),
                message: "seed".to_string(),
            },
        );
        inner.refs.insert(SEED_BRANCH.to_string(), commit_sha);

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use treepush::forge::mock::{MockForge, FailOn};
    /// use treepush::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::CreateBlob(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    ///
    /// Useful for verifying the mock was called correctly.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Get the head commit sha of a branch (for test verification).
    pub fn branch_head(&self, branch: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.refs.get(branch).cloned()
    }

    /// Get a commit by sha (for test verification).
    pub fn commit_sync(&self, sha: &str) -> Option<Commit> {
        let inner = self.inner.lock().unwrap();
        inner.commits.get(sha).cloned()
    }

    /// Get the count of commits in the store.
    pub fn commit_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.commits.len()
    }

    /// Get the count of blobs in the store.
    pub fn blob_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.blobs.len()
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail<T>(&self, expected: &str) -> Option<Result<T, ForgeError>> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::GetContent(e)) if expected == "get_content" => Some(Err(e.clone())),
            Some(FailOn::GetBranchTree(e)) if expected == "get_branch_tree" => {
                Some(Err(e.clone()))
            }
            Some(FailOn::CreateBlob(e)) if expected == "create_blob" => Some(Err(e.clone())),
            Some(FailOn::CreateTree(e)) if expected == "create_tree" => Some(Err(e.clone())),
            Some(FailOn::GetCommit(e)) if expected == "get_commit" => Some(Err(e.clone())),
            Some(FailOn::CreateCommit(e)) if expected == "create_commit" => Some(Err(e.clone())),
            Some(FailOn::GetBranchRef(e)) if expected == "get_branch_ref" => Some(Err(e.clone())),
            Some(FailOn::UpdateBranchRef(e)) if expected == "update_branch_ref" => {
                Some(Err(e.clone()))
            }
            _ => None,
        }
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

impl MockForgeInner {
    /// Assign the next object id, prefixed by kind for readable assertions.
    fn next_sha(&mut self, kind: &str) -> String {
        let sha = format!("{}{:04}", kind, self.next_oid);
        self.next_oid += 1;
        sha
    }

    /// Resolve branch → head commit → tree snapshot.
    fn branch_snapshot(&self, branch: &str) -> Result<&BTreeMap<String, String>, ForgeError> {
        let head = self
            .refs
            .get(branch)
            .ok_or_else(|| ForgeError::NotFound(format!("branch {}", branch)))?;
        let commit = self
            .commits
            .get(head)
            .ok_or_else(|| ForgeError::NotFound(format!("commit {}", head)))?;
        self.trees
            .get(&commit.tree)
            .ok_or_else(|| ForgeError::NotFound(format!("tree {}", commit.tree)))
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_content(&self, path: &str, branch: &str) -> Result<String, ForgeError> {
        self.record(MockOperation::GetContent {
            path: path.to_string(),
            branch: branch.to_string(),
        });

        if let Some(result) = self.check_fail("get_content") {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        let snapshot = inner.branch_snapshot(branch)?;
        let blob_sha = snapshot
            .get(path)
            .ok_or_else(|| ForgeError::NotFound(path.to_string()))?;
        inner
            .blobs
            .get(blob_sha)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("blob {}", blob_sha)))
    }

    async fn get_branch_tree(&self, branch: &str) -> Result<TreeHandle, ForgeError> {
        self.record(MockOperation::GetBranchTree {
            branch: branch.to_string(),
        });

        if let Some(result) = self.check_fail("get_branch_tree") {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        let head = inner
            .refs
            .get(branch)
            .ok_or_else(|| ForgeError::NotFound(format!("branch {}", branch)))?;
        let commit = inner
            .commits
            .get(head)
            .ok_or_else(|| ForgeError::NotFound(format!("commit {}", head)))?;
        Ok(TreeHandle {
            sha: commit.tree.clone(),
        })
    }

    async fn create_blob(&self, content: &str) -> Result<String, ForgeError> {
        self.record(MockOperation::CreateBlob {
            content: content.to_string(),
        });

        if let Some(result) = self.check_fail("create_blob") {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        let sha = inner.next_sha("blob");
        inner.blobs.insert(sha.clone(), content.to_string());
        Ok(sha)
    }

    async fn create_tree(
        &self,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, ForgeError> {
        self.record(MockOperation::CreateTree {
            base_tree: base_tree.to_string(),
            paths: entries.iter().map(|e| e.path.clone()).collect(),
        });

        if let Some(result) = self.check_fail("create_tree") {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        let mut snapshot = inner
            .trees
            .get(base_tree)
            .ok_or_else(|| ForgeError::NotFound(format!("tree {}", base_tree)))?
            .clone();

        for entry in entries {
            if !inner.blobs.contains_key(&entry.sha) {
                return Err(ForgeError::ApiError {
                    status: 422,
                    message: format!("tree entry references unknown blob {}", entry.sha),
                });
            }
            snapshot.insert(entry.path.clone(), entry.sha.clone());
        }

        let sha = inner.next_sha("tree");
        inner.trees.insert(sha.clone(), snapshot);
        Ok(sha)
    }

    async fn get_commit(&self, sha: &str) -> Result<Commit, ForgeError> {
        self.record(MockOperation::GetCommit {
            sha: sha.to_string(),
        });

        if let Some(result) = self.check_fail("get_commit") {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        inner
            .commits
            .get(sha)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("commit {}", sha)))
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<Commit, ForgeError> {
        self.record(MockOperation::CreateCommit {
            message: message.to_string(),
            tree: tree.to_string(),
            parents: parents.to_vec(),
        });

        if let Some(result) = self.check_fail("create_commit") {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        if !inner.trees.contains_key(tree) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: format!("commit references unknown tree {}", tree),
            });
        }

        let sha = inner.next_sha("commit");
        let commit = Commit {
            sha: sha.clone(),
            tree: tree.to_string(),
            parents: parents.to_vec(),
            message: message.to_string(),
        };
        inner.commits.insert(sha, commit.clone());
        Ok(commit)
    }

    async fn get_branch_ref(&self, branch: &str) -> Result<BranchRef, ForgeError> {
        self.record(MockOperation::GetBranchRef {
            branch: branch.to_string(),
        });

        if let Some(result) = self.check_fail("get_branch_ref") {
            return result;
        }

        let inner = self.inner.lock().unwrap();
        let sha = inner
            .refs
            .get(branch)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("branch {}", branch)))?;
        Ok(BranchRef {
            ref_name: format!("refs/heads/{}", branch),
            sha,
        })
    }

    async fn update_branch_ref(&self, branch: &str, commit_sha: &str) -> Result<(), ForgeError> {
        self.record(MockOperation::UpdateBranchRef {
            branch: branch.to_string(),
            commit_sha: commit_sha.to_string(),
        });

        if let Some(result) = self.check_fail("update_branch_ref") {
            return result;
        }

        let mut inner = self.inner.lock().unwrap();
        if !inner.commits.contains_key(commit_sha) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: format!("ref update targets unknown commit {}", commit_sha),
            });
        }
        if !inner.refs.contains_key(branch) {
            return Err(ForgeError::NotFound(format!("branch {}", branch)));
        }
        inner.refs.insert(branch.to_string(), commit_sha.to_string());
        Ok(())
    }
}
