//! Integration tests for the GitHub forge adapter.
//!
//! These tests point GitHubForge at a wiremock server and verify the
//! request shapes (paths, headers, JSON bodies) and the status-code to
//! error mapping. No live GitHub API is contacted.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use treepush::forge::github::GitHubForge;
use treepush::forge::{Forge, ForgeError, TreeEntry};

fn forge_for(server: &MockServer) -> GitHubForge {
    GitHubForge::with_api_base("test-token", "octocat", "hello-world", server.uri())
}

mod content {
    use super::*;

    #[tokio::test]
    async fn get_content_requests_raw_media_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello-world/contents/README.md"))
            .and(query_param("ref", "main"))
            .and(header("accept", "application/vnd.github.raw+json"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# hello\n"))
            .expect(1)
            .mount(&server)
            .await;

        let content = forge_for(&server)
            .get_content("README.md", "main")
            .await
            .unwrap();
        assert_eq!(content, "# hello\n");
    }

    #[tokio::test]
    async fn path_with_special_characters_is_percent_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("notes\n"))
            .mount(&server)
            .await;

        let content = forge_for(&server)
            .get_content("docs/release notes #1.txt", "main")
            .await
            .unwrap();
        assert_eq!(content, "notes\n");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url.path(),
            "/repos/octocat/hello-world/contents/docs/release%20notes%20%231.txt"
        );
    }

    #[tokio::test]
    async fn missing_path_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello-world/contents/docs/notes.txt"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})),
            )
            .mount(&server)
            .await;

        let err = forge_for(&server)
            .get_content("docs/notes.txt", "main")
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::NotFound(_)));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
            )
            .mount(&server)
            .await;

        let err = forge_for(&server)
            .get_content("README.md", "main")
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::AuthFailed(_)));
    }

    #[tokio::test]
    async fn rate_limit_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(json!({"message": "API rate limit exceeded"})),
            )
            .mount(&server)
            .await;

        let err = forge_for(&server)
            .get_content("README.md", "main")
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::RateLimited));
    }
}

mod git_data {
    use super::*;

    #[tokio::test]
    async fn create_blob_posts_utf8_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octocat/hello-world/git/blobs"))
            .and(body_json(json!({
                "content": "some notes\n",
                "encoding": "utf-8"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "sha": "blobsha1",
                "url": "unused"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sha = forge_for(&server).create_blob("some notes\n").await.unwrap();
        assert_eq!(sha, "blobsha1");
    }

    #[tokio::test]
    async fn get_branch_tree_asks_recursively() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello-world/git/trees/main"))
            .and(query_param("recursive", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "basetree1",
                "tree": [
                    {"path": "README.md", "mode": "100644", "type": "blob", "sha": "b1"}
                ],
                "truncated": false
            })))
            .mount(&server)
            .await;

        let tree = forge_for(&server).get_branch_tree("main").await.unwrap();
        assert_eq!(tree.sha, "basetree1");
    }

    #[tokio::test]
    async fn create_tree_layers_entries_on_base() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octocat/hello-world/git/trees"))
            .and(body_json(json!({
                "base_tree": "basetree1",
                "tree": [
                    {
                        "path": "docs/notes.txt",
                        "mode": "100644",
                        "type": "blob",
                        "sha": "blobsha1"
                    }
                ]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "sha": "newtree1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sha = forge_for(&server)
            .create_tree(
                "basetree1",
                &[TreeEntry::blob("docs/notes.txt", "blobsha1")],
            )
            .await
            .unwrap();
        assert_eq!(sha, "newtree1");
    }

    #[tokio::test]
    async fn create_commit_posts_single_parent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octocat/hello-world/git/commits"))
            .and(body_json(json!({
                "message": "push from ci-project build 42",
                "tree": "newtree1",
                "parents": ["oldhead1"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "sha": "newcommit1",
                "tree": {"sha": "newtree1"},
                "parents": [{"sha": "oldhead1"}],
                "message": "push from ci-project build 42"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let commit = forge_for(&server)
            .create_commit(
                "push from ci-project build 42",
                "newtree1",
                &["oldhead1".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(commit.sha, "newcommit1");
        assert_eq!(commit.tree, "newtree1");
        assert_eq!(commit.parents, vec!["oldhead1".to_string()]);
    }

    #[tokio::test]
    async fn get_commit_parses_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello-world/git/commits/oldhead1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "oldhead1",
                "tree": {"sha": "basetree1"},
                "parents": [],
                "message": "seed"
            })))
            .mount(&server)
            .await;

        let commit = forge_for(&server).get_commit("oldhead1").await.unwrap();
        assert_eq!(commit.sha, "oldhead1");
        assert_eq!(commit.tree, "basetree1");
        assert!(commit.parents.is_empty());
    }
}

mod refs {
    use super::*;

    #[tokio::test]
    async fn get_branch_ref_resolves_head() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello-world/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ref": "refs/heads/main",
                "object": {"sha": "oldhead1", "type": "commit"}
            })))
            .mount(&server)
            .await;

        let branch_ref = forge_for(&server).get_branch_ref("main").await.unwrap();
        assert_eq!(branch_ref.ref_name, "refs/heads/main");
        assert_eq!(branch_ref.sha, "oldhead1");
    }

    #[tokio::test]
    async fn update_branch_ref_patches_sha() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/repos/octocat/hello-world/git/refs/heads/main"))
            .and(body_json(json!({"sha": "newcommit1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ref": "refs/heads/main",
                "object": {"sha": "newcommit1", "type": "commit"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        forge_for(&server)
            .update_branch_ref("main", "newcommit1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fast_forward_rejection_surfaces_as_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/repos/octocat/hello-world/git/refs/heads/main"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Update is not a fast forward"
            })))
            .mount(&server)
            .await;

        let err = forge_for(&server)
            .update_branch_ref("main", "newcommit1")
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::ApiError { status: 422, .. }));
    }
}
