use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimal account shape shared by repo owners, stargazers and fork owners.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    pub id: u64,
    pub node_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Account,
    pub fork: bool,
    pub clone_url: String,
    pub default_branch: Option<String>,
}

impl Repository {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login, self.name)
    }
}

/// One stargazer as returned with the `star+json` media type.
/// `starred_at` is absent when the API serves the plain shape.
#[derive(Clone, Debug, Deserialize)]
pub struct StarEntry {
    pub starred_at: Option<DateTime<Utc>>,
    pub user: Account,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ForkEntry {
    pub id: u64,
    pub node_id: String,
    pub full_name: String,
    pub owner: Account,
    pub html_url: Option<String>,
}

/// Entry of `GET /users/{login}/starred`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarredRepo {
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub stargazers_count: Option<u64>,
}

/// Artifact record: one stargazer of one repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StargazerRecord {
    pub repo: String,
    pub login: String,
    pub id: u64,
    pub node_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starred_at: Option<DateTime<Utc>>,
}

impl StargazerRecord {
    pub fn from_entry(repo: &str, entry: StarEntry) -> Self {
        Self {
            repo: repo.to_string(),
            login: entry.user.login,
            id: entry.user.id,
            node_id: entry.user.node_id,
            starred_at: entry.starred_at,
        }
    }
}

/// Artifact record: one fork of one repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForkRecord {
    pub repo: String,
    pub owner: String,
    pub id: u64,
    pub node_id: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

impl ForkRecord {
    pub fn from_entry(repo: &str, entry: ForkEntry) -> Self {
        Self {
            repo: repo.to_string(),
            owner: entry.owner.login,
            id: entry.id,
            node_id: entry.node_id,
            full_name: entry.full_name,
            html_url: entry.html_url,
        }
    }
}
