//! publish
//!
//! The diff → blob → tree → commit → ref pipeline.
//!
//! # Architecture
//!
//! One pass, strictly sequential, over three responsibilities:
//!
//! - [`detect`] - decide per file whether its content differs from the
//!   branch (or is entirely new)
//! - [`tree`] - upload blobs for the changed files and layer a new tree
//!   onto the branch's current tree
//! - [`commit`] - wrap the tree in a single-parent commit, then advance the
//!   branch reference
//!
//! The pipeline mutates remote state in exactly one place: the final ref
//! move, and only when a commit was produced. Commit creation and the ref
//! move are not atomic; a failure between them leaves an unreferenced
//! commit, and a rerun detects the same differences and repairs it.

pub mod commit;
pub mod detect;
pub mod tree;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Config;
use crate::forge::{Forge, ForgeError};
use crate::ui::output::{self, Verbosity};

/// One candidate file: a local path paired with the path it lives at in the
/// remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Path of the modified file on the local filesystem
    pub local: PathBuf,
    /// Path of the file within the remote repository
    pub remote: String,
}

/// Errors from the publish pipeline.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A forge operation failed (other than the absorbed not-found case).
    #[error(transparent)]
    Forge(#[from] ForgeError),

    /// A local file could not be read as text.
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        /// The local path that failed to read
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },
}

/// Outcome of a publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// No file differed from the branch; nothing was committed and the
    /// branch reference was not touched.
    Skipped,
    /// A commit was created and the branch reference now points at it.
    Published {
        /// Hash of the new commit
        commit_sha: String,
        /// Remote paths included in the commit, in input order
        paths: Vec<String>,
    },
}

/// Read a local file's content as text.
pub(crate) fn read_local(path: &Path) -> Result<String, PublishError> {
    std::fs::read_to_string(path).map_err(|source| PublishError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Run the full pipeline: detect changes, build a tree, commit, advance the
/// branch.
///
/// Returns [`PublishOutcome::Skipped`] when no file differs; this is the
/// normal "nothing to do" outcome, not an error.
pub async fn run(
    forge: &dyn Forge,
    config: &Config,
    verbosity: Verbosity,
) -> Result<PublishOutcome, PublishError> {
    let mut changed: Vec<&FileChange> = Vec::new();
    for change in &config.changes {
        let decision = detect::diff(forge, change, &config.branch).await?;
        output::print(
            format!(
                "Diffing {} against {} on {}... {}",
                change.local.display(),
                change.remote,
                config.branch,
                decision
            ),
            verbosity,
        );
        if decision.needs_commit() {
            changed.push(change);
        }
    }

    let new_tree = tree::build_tree(forge, &changed, &config.branch, verbosity).await?;

    let Some(tree_sha) = new_tree else {
        output::print("No changes. Skipping commit", verbosity);
        return Ok(PublishOutcome::Skipped);
    };

    let new_commit =
        commit::create_publish_commit(forge, &tree_sha, &config.branch, &config.message, verbosity)
            .await?;
    commit::advance_branch(forge, &config.branch, &new_commit, verbosity).await?;

    Ok(PublishOutcome::Published {
        commit_sha: new_commit.sha,
        paths: changed.iter().map(|c| c.remote.clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::forge::mock::MockForge;
    use tempfile::NamedTempFile;

    fn local_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn config_for(changes: Vec<FileChange>) -> Config {
        Config {
            org: "octocat".to_string(),
            repo: "hello-world".to_string(),
            token: "token".to_string(),
            branch: "main".to_string(),
            message: "push from ci build 1".to_string(),
            changes,
            api_base: None,
        }
    }

    #[tokio::test]
    async fn unchanged_files_skip_without_touching_the_ref() {
        let forge = MockForge::with_files(vec![("README.md", "hello\n")]);
        let head_before = forge.branch_head("main").unwrap();
        let file = local_file("hello\n");

        let outcome = run(
            &forge,
            &config_for(vec![FileChange {
                local: file.path().to_path_buf(),
                remote: "README.md".to_string(),
            }]),
            Verbosity::Quiet,
        )
        .await
        .unwrap();

        assert_eq!(outcome, PublishOutcome::Skipped);
        assert_eq!(forge.branch_head("main").unwrap(), head_before);
        assert_eq!(forge.commit_count(), 1);
    }

    #[tokio::test]
    async fn changed_file_produces_one_commit_and_moves_the_ref() {
        let forge = MockForge::with_files(vec![("README.md", "hello\n")]);
        let head_before = forge.branch_head("main").unwrap();
        let file = local_file("hello, world\n");

        let outcome = run(
            &forge,
            &config_for(vec![FileChange {
                local: file.path().to_path_buf(),
                remote: "README.md".to_string(),
            }]),
            Verbosity::Quiet,
        )
        .await
        .unwrap();

        let PublishOutcome::Published { commit_sha, paths } = outcome else {
            panic!("expected a published outcome");
        };
        assert_eq!(paths, vec!["README.md".to_string()]);
        assert_eq!(forge.branch_head("main").unwrap(), commit_sha);

        let commit = forge.commit_sync(&commit_sha).unwrap();
        assert_eq!(commit.parents, vec![head_before]);
        assert_eq!(commit.message, "push from ci build 1");
    }

    #[tokio::test]
    async fn unreadable_local_file_is_a_read_error() {
        let forge = MockForge::with_files(vec![("README.md", "hello\n")]);

        let err = run(
            &forge,
            &config_for(vec![FileChange {
                local: PathBuf::from("/nonexistent/treepush-missing.txt"),
                remote: "README.md".to_string(),
            }]),
            Verbosity::Quiet,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PublishError::ReadFile { .. }));
    }
}
