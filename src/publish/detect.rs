//! publish::detect
//!
//! Change detection: does a local file differ from its remote counterpart?

use std::fmt;

use super::{read_local, FileChange, PublishError};
use crate::forge::{Forge, ForgeError};

/// Outcome of diffing one file against the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No object exists at the reference path on the branch.
    New,
    /// Remote object exists and its content differs.
    Changed,
    /// Remote object exists and its content is byte-identical.
    Unchanged,
}

impl Decision {
    /// Whether this file belongs in the commit.
    pub fn needs_commit(self) -> bool {
        !matches!(self, Decision::Unchanged)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::New => write!(f, "New file"),
            Decision::Changed => write!(f, "Changes found"),
            Decision::Unchanged => write!(f, "No changes found"),
        }
    }
}

/// Diff `change` against `branch`.
///
/// Reads the local file as text and fetches the remote object at the
/// reference path:
///
/// - remote object absent (`NotFound`): [`Decision::New`], no content
///   comparison performed
/// - remote object present: [`Decision::Changed`] iff the contents differ
///   byte-for-byte, [`Decision::Unchanged`] otherwise
///
/// Purely a predicate; mutates no remote state. `NotFound` is the only
/// absorbed error. Anything else (auth, network, rate limit) propagates
/// unchanged; a missing remote object and a failing remote are not the same
/// thing.
pub async fn diff(
    forge: &dyn Forge,
    change: &FileChange,
    branch: &str,
) -> Result<Decision, PublishError> {
    let local = read_local(&change.local)?;

    match forge.get_content(&change.remote, branch).await {
        Ok(remote) if local == remote => Ok(Decision::Unchanged),
        Ok(_) => Ok(Decision::Changed),
        Err(ForgeError::NotFound(_)) => Ok(Decision::New),
        Err(err) => Err(err.into()),
    }
}
