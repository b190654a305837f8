//! cli
//!
//! Command-line interface layer for Treepush.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and environment fallbacks
//! - Build the [`Config`] value object and the GitHub forge
//! - Delegate to the [`crate::publish`] pipeline
//!
//! The CLI layer is thin. All remote mutations happen inside the pipeline.

pub mod args;

pub use args::Cli;

use anyhow::Result;

use crate::config::Config;
use crate::forge::github::GitHubForge;
use crate::publish::{self, PublishOutcome};
use crate::ui::output::{self, Verbosity};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`. Exits through an
/// error for any configuration problem or unrecovered forge failure; the
/// "no changes" outcome is a normal success.
pub async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    let changes = Config::pair_changes(cli.updated_files, cli.source_refs)?;
    let message = Config::commit_message(cli.message, cli.project, cli.build_num)?;
    let config = Config {
        org: cli.org,
        repo: cli.repo,
        token: cli.token,
        branch: cli.branch,
        message,
        changes,
        api_base: cli.api_base,
    };

    let forge = match &config.api_base {
        Some(api_base) => {
            GitHubForge::with_api_base(&config.token, &config.org, &config.repo, api_base)
        }
        None => GitHubForge::new(&config.token, &config.org, &config.repo),
    };
    output::print(
        format!(
            "Setting GitHub repository connectivity to {}/{}",
            config.org, config.repo
        ),
        verbosity,
    );

    match publish::run(&forge, &config, verbosity).await? {
        PublishOutcome::Published { commit_sha, paths } => {
            output::print(
                format!("Committed {} file(s) as {}", paths.len(), commit_sha),
                verbosity,
            );
        }
        PublishOutcome::Skipped => {}
    }

    Ok(())
}
