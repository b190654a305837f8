//! publish::tree
//!
//! Tree construction: upload blobs for the changed files and layer them
//! onto the branch's current tree.

use super::{read_local, FileChange, PublishError};
use crate::forge::{Forge, TreeEntry};
use crate::ui::output::{self, Verbosity};

/// Build a new tree containing the changed files.
///
/// For each changed entry, in input order: read the local content, upload it
/// as a blob, and record a tree entry mapping the entry's remote path to the
/// blob's hash with regular-file mode. The entries are then layered onto the
/// branch's current recursive tree; paths not in the change set are
/// inherited unchanged by the remote system.
///
/// Returns `None` when the changed set is empty. That is the normal
/// "nothing to do" outcome, and in that case no remote call is made at all.
pub async fn build_tree(
    forge: &dyn Forge,
    changed: &[&FileChange],
    branch: &str,
    verbosity: Verbosity,
) -> Result<Option<String>, PublishError> {
    if changed.is_empty() {
        return Ok(None);
    }

    let mut entries = Vec::with_capacity(changed.len());
    for change in changed {
        let content = read_local(&change.local)?;
        let blob_sha = forge.create_blob(&content).await?;
        output::print(
            format!("Adding {} to tree with sha {}", change.remote, blob_sha),
            verbosity,
        );
        entries.push(TreeEntry::blob(&change.remote, blob_sha));
    }

    let base = forge.get_branch_tree(branch).await?;
    output::debug(format!("base tree {}", base.sha), verbosity);

    let tree_sha = forge.create_tree(&base.sha, &entries).await?;
    output::debug(format!("created tree {}", tree_sha), verbosity);

    Ok(Some(tree_sha))
}
