//! forge::github
//!
//! GitHub forge implementation using the REST git-data API.
//!
//! # Design
//!
//! This module implements the `Forge` trait for GitHub. It uses:
//! - the contents endpoint (raw media type) for change detection
//! - the git-data endpoints (blobs, trees, commits, refs) for publishing
//!
//! Requesting `application/vnd.github.raw+json` for contents means the
//! response body is the file's bytes as-is, so no base64 decoding step is
//! needed on the read path.
//!
//! # Authentication
//!
//! A static bearer token (personal access token or installation token)
//! supplied by the environment. There is no refresh flow: a CI run is
//! short-lived and the token is provisioned per job.
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation returns
//! `ForgeError::RateLimited` when limits are hit and does not retry;
//! a rerun of the job is the recovery path.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::traits::{BranchRef, Commit, Forge, ForgeError, TreeEntry, TreeHandle};

/// Default GitHub API base URL.
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "treepush-cli";

/// Media type that makes the contents endpoint return raw file bytes.
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

/// GitHub forge implementation.
///
/// Implements the `Forge` trait for GitHub using the REST API.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Bearer token
    token: String,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("has_token", &!self.token.is_empty())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubForge {
    /// Create a new GitHub forge.
    ///
    /// # Arguments
    ///
    /// * `token` - Personal access token or GitHub App installation token
    /// * `owner` - Repository owner
    /// * `repo` - Repository name
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Create a GitHub forge with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise installations
    /// (e.g., `https://github.example.com/api/v3`).
    pub fn with_api_base(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            api_base: api_base.into(),
        }
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        if self.token.is_empty() {
            return Err(ForgeError::AuthRequired);
        }
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))
                .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// Build the contents URL for a repository path on a branch.
    ///
    /// The repository path is split into segments and each is
    /// percent-encoded, so paths containing spaces, `#`, or `%` produce a
    /// well-formed request.
    fn contents_url(&self, path: &str, branch: &str) -> Result<Url, ForgeError> {
        let mut url = Url::parse(&self.repo_url("contents"))
            .map_err(|e| ForgeError::NetworkError(format!("invalid API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ForgeError::NetworkError("API base URL cannot be a base".into()))?
            .extend(path.split('/'));
        url.query_pairs_mut().append_pair("ref", branch);
        Ok(url)
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
    ) -> Result<T, ForgeError> {
        // Extract permission headers before consuming response body.
        // GitHub Apps use X-Accepted-GitHub-Permissions, classic OAuth uses X-Accepted-OAuth-Scopes.
        let headers = response.headers();
        let required_permissions = headers
            .get("X-Accepted-GitHub-Permissions")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let required_scopes = headers
            .get("X-Accepted-OAuth-Scopes")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let granted_scopes = headers
            .get("X-OAuth-Scopes")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        // Try to get error message from body
        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => {
                let mut err_msg = format!("Permission denied: {}", message);

                // For GitHub Apps, show the fine-grained permissions required
                if let Some(perms) = required_permissions {
                    if !perms.is_empty() {
                        err_msg.push_str(&format!(" [required: {}]", perms));
                    }
                }
                // For classic OAuth, show scopes
                else if let Some(scopes) = required_scopes {
                    if !scopes.is_empty() {
                        err_msg.push_str(&format!(" [required scopes: {}]", scopes));
                        if let Some(granted) = granted_scopes {
                            err_msg.push_str(&format!(" [granted: {}]", granted));
                        }
                    }
                }

                ForgeError::AuthFailed(err_msg)
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::UNPROCESSABLE_ENTITY => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_content(&self, path: &str, branch: &str) -> Result<String, ForgeError> {
        let url = self.contents_url(path, branch)?;

        let mut headers = self.headers()?;
        headers.insert(ACCEPT, HeaderValue::from_static(RAW_MEDIA_TYPE));

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response.text().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to read content body: {}", e),
            })
        } else {
            self.handle_error_response(response, status).await
        }
    }

    async fn get_branch_tree(&self, branch: &str) -> Result<TreeHandle, ForgeError> {
        let url = self.repo_url(&format!("git/trees/{}?recursive=1", branch));

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let tree: GitHubTree = self.handle_response(response).await?;
        Ok(TreeHandle { sha: tree.sha })
    }

    async fn create_blob(&self, content: &str) -> Result<String, ForgeError> {
        let url = self.repo_url("git/blobs");

        let body = CreateBlobBody {
            content,
            encoding: "utf-8",
        };

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let blob: GitHubSha = self.handle_response(response).await?;
        Ok(blob.sha)
    }

    async fn create_tree(
        &self,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, ForgeError> {
        let url = self.repo_url("git/trees");

        let body = CreateTreeBody {
            base_tree,
            tree: entries
                .iter()
                .map(|e| CreateTreeEntry {
                    path: &e.path,
                    mode: &e.mode,
                    entry_type: "blob",
                    sha: &e.sha,
                })
                .collect(),
        };

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let tree: GitHubSha = self.handle_response(response).await?;
        Ok(tree.sha)
    }

    async fn get_commit(&self, sha: &str) -> Result<Commit, ForgeError> {
        let url = self.repo_url(&format!("git/commits/{}", sha));

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let commit: GitHubCommit = self.handle_response(response).await?;
        Ok(commit.into())
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<Commit, ForgeError> {
        let url = self.repo_url("git/commits");

        let body = CreateCommitBody {
            message,
            tree,
            parents,
        };

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let commit: GitHubCommit = self.handle_response(response).await?;
        Ok(commit.into())
    }

    async fn get_branch_ref(&self, branch: &str) -> Result<BranchRef, ForgeError> {
        let url = self.repo_url(&format!("git/ref/heads/{}", branch));

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let git_ref: GitHubRef = self.handle_response(response).await?;
        Ok(BranchRef {
            ref_name: git_ref.ref_name,
            sha: git_ref.object.sha,
        })
    }

    async fn update_branch_ref(&self, branch: &str, commit_sha: &str) -> Result<(), ForgeError> {
        let url = self.repo_url(&format!("git/refs/heads/{}", branch));

        let body = UpdateRefBody { sha: commit_sha };

        let response = self
            .client
            .patch(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            self.handle_error_response(response, status).await
        }
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a blob.
#[derive(Serialize)]
struct CreateBlobBody<'a> {
    content: &'a str,
    encoding: &'a str,
}

/// Request body for creating a tree.
#[derive(Serialize)]
struct CreateTreeBody<'a> {
    base_tree: &'a str,
    tree: Vec<CreateTreeEntry<'a>>,
}

/// One tree entry in a tree-creation request.
#[derive(Serialize)]
struct CreateTreeEntry<'a> {
    path: &'a str,
    mode: &'a str,
    #[serde(rename = "type")]
    entry_type: &'a str,
    sha: &'a str,
}

/// Request body for creating a commit.
#[derive(Serialize)]
struct CreateCommitBody<'a> {
    message: &'a str,
    tree: &'a str,
    parents: &'a [String],
}

/// Request body for moving a ref.
#[derive(Serialize)]
struct UpdateRefBody<'a> {
    sha: &'a str,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// Response carrying only an object sha (blob and tree creation).
#[derive(Deserialize)]
struct GitHubSha {
    sha: String,
}

/// GitHub tree response format (entry list unused; only the sha anchors
/// subsequent tree creation).
#[derive(Deserialize)]
struct GitHubTree {
    sha: String,
}

/// GitHub commit response format.
#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    tree: GitHubSha,
    #[serde(default)]
    parents: Vec<GitHubSha>,
    #[serde(default)]
    message: String,
}

/// GitHub ref response format.
#[derive(Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    ref_name: String,
    object: GitHubSha,
}

impl From<GitHubCommit> for Commit {
    fn from(c: GitHubCommit) -> Self {
        Commit {
            sha: c.sha,
            tree: c.tree.sha,
            parents: c.parents.into_iter().map(|p| p.sha).collect(),
            message: c.message,
        }
    }
}
