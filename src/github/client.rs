use crate::error::{GhvaultError, Result};
use crate::github::types::{ForkEntry, Repository, StarEntry, StarredRepo};
use reqwest::header::ACCEPT;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

pub const API_BASE: &str = "https://api.github.com";

const MEDIA_TYPE: &str = "application/vnd.github.v3+json";
/// Media type that makes the stargazers endpoint include `starred_at`.
const STAR_MEDIA_TYPE: &str = "application/vnd.github.star+json";
const APP_USER_AGENT: &str = concat!("ghvault/", env!("CARGO_PKG_VERSION"));
const DEFAULT_PER_PAGE: u32 = 100;

#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
    per_page: u32,
}

impl GitHubClient {
    pub fn new(token: Option<&str>) -> Result<Self> {
        Self::with_base(API_BASE, token)
    }

    /// Point the client at a different API root (used by tests against a mock server).
    pub fn with_base(base: impl Into<String>, token: Option<&str>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base: base.into(),
            token: token.map(String::from),
            per_page: DEFAULT_PER_PAGE,
        })
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    async fn get(&self, route: &str, accept: &str, query: &[(&str, String)]) -> Result<Response> {
        let mut req = self
            .http
            .get(format!("{}/{}", self.base, route))
            .header(ACCEPT, accept)
            .query(query);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    /// Single-object lookup. 401/403 map to an auth error, any other
    /// non-success status to a transport error naming the route.
    pub async fn get_json<T: DeserializeOwned>(&self, route: &str) -> Result<T> {
        let resp = self.get(route, MEDIA_TYPE, &[]).await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GhvaultError::Auth {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(GhvaultError::Transport(format!("GET {route}: {status}")));
        }
        Ok(resp.json().await?)
    }

    /// Fetch every page of a listing endpoint, in order.
    ///
    /// Stops when a page comes back empty or shorter than `per_page`.
    /// A 404 on the very first page means the listing has zero items
    /// (e.g. an unstarred user), not a failure.
    pub async fn paginate<T: DeserializeOwned>(&self, route: &str, accept: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let query = [
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ];
            let resp = self.get(route, accept, &query).await?;
            let status = resp.status();

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(GhvaultError::Auth {
                    status: status.as_u16(),
                });
            }
            if status == StatusCode::NOT_FOUND && page == 1 {
                debug!(route, "first page returned 404, treating as empty");
                return Ok(items);
            }
            if !status.is_success() {
                return Err(GhvaultError::Transport(format!(
                    "GET {route} page {page}: {status}"
                )));
            }

            let batch: Vec<T> = resp.json().await?;
            let len = batch.len();
            debug!(route, page, count = len, "fetched page");
            items.extend(batch);

            if len < self.per_page as usize {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// Open a streaming response for an archive route, following GitHub's
    /// redirect to the actual tarball host.
    pub async fn get_stream(&self, route: &str) -> Result<Response> {
        let resp = self.get(route, MEDIA_TYPE, &[]).await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GhvaultError::Auth {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(GhvaultError::Transport(format!("GET {route}: {status}")));
        }
        Ok(resp)
    }

    pub async fn user_repos(&self, login: &str) -> Result<Vec<Repository>> {
        self.paginate(&format!("users/{login}/repos"), MEDIA_TYPE)
            .await
    }

    pub async fn repo(&self, owner: &str, name: &str) -> Result<Repository> {
        self.get_json(&format!("repos/{owner}/{name}")).await
    }

    pub async fn stargazers(&self, owner: &str, name: &str) -> Result<Vec<StarEntry>> {
        self.paginate(&format!("repos/{owner}/{name}/stargazers"), STAR_MEDIA_TYPE)
            .await
    }

    pub async fn forks(&self, owner: &str, name: &str) -> Result<Vec<ForkEntry>> {
        self.paginate(&format!("repos/{owner}/{name}/forks"), MEDIA_TYPE)
            .await
    }

    pub async fn starred(&self, login: &str) -> Result<Vec<StarredRepo>> {
        self.paginate(&format!("users/{login}/starred"), MEDIA_TYPE)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repo_json(name: &str, fork: bool) -> Value {
        json!({
            "name": name,
            "owner": { "login": "alice", "id": 1, "node_id": "U_1" },
            "fork": fork,
            "clone_url": format!("https://github.com/alice/{name}.git"),
            "default_branch": "main",
        })
    }

    async fn client_for(server: &MockServer, per_page: u32) -> GitHubClient {
        GitHubClient::with_base(server.uri(), None)
            .unwrap()
            .per_page(per_page)
    }

    #[tokio::test]
    async fn paginate_collects_all_pages_in_order() {
        let server = MockServer::start().await;
        // 7 repos, page size 3 -> pages of 3, 3, 1
        let names: Vec<String> = (0..7).map(|i| format!("r{i}")).collect();
        for (page, chunk) in names.chunks(3).enumerate() {
            let body: Vec<Value> = chunk.iter().map(|n| repo_json(n, false)).collect();
            Mock::given(method("GET"))
                .and(path("/users/alice/repos"))
                .and(query_param("page", (page + 1).to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;
        }

        let client = client_for(&server, 3).await;
        let repos = client.user_repos("alice").await.unwrap();
        let got: Vec<String> = repos.into_iter().map(|r| r.name).collect();
        assert_eq!(got, names);
    }

    #[tokio::test]
    async fn paginate_stops_after_short_page_without_extra_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/alice/repos"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(vec![repo_json("only", false)]),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 100).await;
        let repos = client.user_repos("alice").await.unwrap();
        assert_eq!(repos.len(), 1);
        // mock verification on drop: no page-2 request was issued
    }

    #[tokio::test]
    async fn first_page_404_yields_empty_sequence() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/ghost/repos"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, 100).await;
        let repos = client.user_repos("ghost").await.unwrap();
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn later_page_404_is_a_transport_error() {
        let server = MockServer::start().await;
        // full first page forces a second request; only page 1 is special-cased
        let page1: Vec<Value> = (0..3).map(|i| repo_json(&format!("r{i}"), false)).collect();
        Mock::given(method("GET"))
            .and(path("/users/alice/repos"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page1))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/alice/repos"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, 3).await;
        let err = client.user_repos("alice").await.unwrap_err();
        assert!(matches!(err, GhvaultError::Transport(_)));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/alice/repos"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server, 100).await;
        let err = client.user_repos("alice").await.unwrap_err();
        assert!(matches!(err, GhvaultError::Auth { status: 401 }));
    }

    #[tokio::test]
    async fn forbidden_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/r1/stargazers"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = client_for(&server, 100).await;
        let err = client.stargazers("alice", "r1").await.unwrap_err();
        assert!(matches!(err, GhvaultError::Auth { status: 403 }));
    }

    #[tokio::test]
    async fn server_error_maps_to_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/alice/repos"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server, 100).await;
        let err = client.user_repos("alice").await.unwrap_err();
        assert!(matches!(err, GhvaultError::Transport(_)));
    }

    #[tokio::test]
    async fn repo_lookup_404_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/nope"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, 100).await;
        let err = client.repo("alice", "nope").await.unwrap_err();
        assert!(matches!(err, GhvaultError::Transport(_)));
    }

    #[tokio::test]
    async fn stargazers_parse_starred_at_when_present() {
        let server = MockServer::start().await;
        let body = json!([
            {
                "starred_at": "2024-05-01T12:00:00Z",
                "user": { "login": "bob", "id": 2, "node_id": "U_2" }
            },
            {
                "user": { "login": "carol", "id": 3, "node_id": "U_3" }
            }
        ]);
        Mock::given(method("GET"))
            .and(path("/repos/alice/r1/stargazers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = client_for(&server, 100).await;
        let gazers = client.stargazers("alice", "r1").await.unwrap();
        assert_eq!(gazers.len(), 2);
        assert_eq!(gazers[0].user.login, "bob");
        assert!(gazers[0].starred_at.is_some());
        assert!(gazers[1].starred_at.is_none());
    }
}
