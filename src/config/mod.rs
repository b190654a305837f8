//! config
//!
//! Explicit configuration value object for a publish run.
//!
//! # Design
//!
//! All operator input (flags and their environment fallbacks) is collected
//! into a single [`Config`] at startup and passed by reference into the
//! pipeline; nothing downstream reads the process environment. The two
//! comma-separated path lists from the CLI surface are validated and zipped
//! here into explicit local/remote pairs, so a length mismatch fails fast
//! instead of silently mispairing files.

use std::path::PathBuf;

use thiserror::Error;

use crate::publish::FileChange;

/// Errors constructing the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value was not supplied by flag or environment.
    #[error("missing required value: {0}")]
    Missing(&'static str),

    /// The two positional path lists have different lengths.
    #[error("updated files and source refs must pair up: got {files} files but {refs} refs")]
    MismatchedLists {
        /// Number of local file paths supplied
        files: usize,
        /// Number of remote reference paths supplied
        refs: usize,
    },
}

/// Configuration for one publish run, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository owner (user or organization)
    pub org: String,
    /// Repository name
    pub repo: String,
    /// Bearer token for the forge API
    pub token: String,
    /// Target branch
    pub branch: String,
    /// Commit message
    pub message: String,
    /// Local/remote file pairs to consider for the commit
    pub changes: Vec<FileChange>,
    /// API base override for GitHub Enterprise
    pub api_base: Option<String>,
}

impl Config {
    /// Zip the two positional path lists into explicit pairs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MismatchedLists` if the lists differ in length,
    /// and `ConfigError::Missing` if either list is empty.
    pub fn pair_changes(
        updated_files: Vec<String>,
        source_refs: Vec<String>,
    ) -> Result<Vec<FileChange>, ConfigError> {
        if updated_files.is_empty() {
            return Err(ConfigError::Missing("updated files"));
        }
        if source_refs.is_empty() {
            return Err(ConfigError::Missing("source refs"));
        }
        if updated_files.len() != source_refs.len() {
            return Err(ConfigError::MismatchedLists {
                files: updated_files.len(),
                refs: source_refs.len(),
            });
        }

        Ok(updated_files
            .into_iter()
            .zip(source_refs)
            .map(|(local, remote)| FileChange {
                local: PathBuf::from(local),
                remote,
            })
            .collect())
    }

    /// Resolve the commit message.
    ///
    /// An explicit message wins; otherwise one is derived from the CI
    /// project name and build number, matching the original operator
    /// contract ("push from {project} build {build}").
    pub fn commit_message(
        explicit: Option<String>,
        project: Option<String>,
        build_num: Option<String>,
    ) -> Result<String, ConfigError> {
        if let Some(message) = explicit {
            return Ok(message);
        }
        match (project, build_num) {
            (Some(project), Some(build)) => Ok(format!("push from {} build {}", project, build)),
            _ => Err(ConfigError::Missing(
                "commit message (pass --message, or --project and --build-num)",
            )),
        }
    }
}
