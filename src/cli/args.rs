//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Environment Fallbacks
//!
//! Every value can be supplied as a flag or through the environment
//! variables the original CI surface used (`ORG`, `REPO`, `GITHUB_TOKEN`,
//! `UPDATED_FILES`, `SOURCE_REFS`, `CIRCLE_PROJECT_REPONAME`,
//! `CIRCLE_BUILD_NUM`). Flags take precedence over the environment.

use clap::Parser;

/// Treepush - commit local file changes to a GitHub branch without a clone
#[derive(Parser, Debug)]
#[command(name = "treepush")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository owner (user or organization)
    #[arg(long, env = "ORG")]
    pub org: String,

    /// Repository name
    #[arg(long, env = "REPO")]
    pub repo: String,

    /// Bearer token for the GitHub API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Comma-separated local paths of the updated files
    #[arg(long, env = "UPDATED_FILES", value_delimiter = ',')]
    pub updated_files: Vec<String>,

    /// Comma-separated repository paths the files map to, in the same order
    #[arg(long, env = "SOURCE_REFS", value_delimiter = ',')]
    pub source_refs: Vec<String>,

    /// Target branch
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Commit message; overrides the message derived from --project/--build-num
    #[arg(long)]
    pub message: Option<String>,

    /// CI project name used to derive the commit message
    #[arg(long, env = "CIRCLE_PROJECT_REPONAME")]
    pub project: Option<String>,

    /// CI build number used to derive the commit message
    #[arg(long, env = "CIRCLE_BUILD_NUM")]
    pub build_num: Option<String>,

    /// API base URL for GitHub Enterprise (e.g., https://github.example.com/api/v3)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn comma_separated_lists_split() {
        let cli = Cli::parse_from([
            "treepush",
            "--org",
            "octocat",
            "--repo",
            "hello-world",
            "--token",
            "tok",
            "--updated-files",
            "README.md,notes.txt",
            "--source-refs",
            "README.md,docs/notes.txt",
            "--message",
            "regen",
        ]);

        assert_eq!(cli.updated_files, vec!["README.md", "notes.txt"]);
        assert_eq!(cli.source_refs, vec!["README.md", "docs/notes.txt"]);
        assert_eq!(cli.branch, "main");
    }
}
