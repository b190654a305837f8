//! publish::commit
//!
//! Commit creation and branch publication.
//!
//! The two steps are deliberately separate: `create_publish_commit` writes
//! an immutable commit object, `advance_branch` performs the single
//! externally visible mutation of a run. There is no atomicity between
//! them; a failure in between leaves an unreferenced commit that the next
//! run supersedes.

use super::PublishError;
use crate::forge::{Commit, Forge};
use crate::ui::output::{self, Verbosity};

/// Create a commit wrapping `tree_sha`, parented on the current head of
/// `branch`.
///
/// The parent is the commit the branch ref resolves to at this moment,
/// fetched via its hash; the new commit has exactly that one parent.
pub async fn create_publish_commit(
    forge: &dyn Forge,
    tree_sha: &str,
    branch: &str,
    message: &str,
    verbosity: Verbosity,
) -> Result<Commit, PublishError> {
    let head_ref = forge.get_branch_ref(branch).await?;
    let parent = forge.get_commit(&head_ref.sha).await?;

    output::print(
        format!("Creating commit from tree {} on branch {}", tree_sha, branch),
        verbosity,
    );
    let commit = forge
        .create_commit(message, tree_sha, &[parent.sha])
        .await?;
    output::debug(format!("created commit {}", commit.sha), verbosity);

    Ok(commit)
}

/// Move the branch reference to point at `commit`.
///
/// Called only when a commit was produced.
pub async fn advance_branch(
    forge: &dyn Forge,
    branch: &str,
    commit: &Commit,
    verbosity: Verbosity,
) -> Result<(), PublishError> {
    let head_ref = forge.get_branch_ref(branch).await?;
    output::print(
        format!("Committing to {} with sha {}", head_ref.ref_name, commit.sha),
        verbosity,
    );
    forge.update_branch_ref(branch, &commit.sha).await?;
    Ok(())
}
