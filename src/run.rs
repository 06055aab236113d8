use crate::artifact;
use crate::error::Result;
use crate::fetch::clone::{clone_repository, CloneOptions};
use crate::fetch::download::download_snapshot;
use crate::fetch::FetchSummary;
use crate::github::client::GitHubClient;
use crate::github::types::{ForkRecord, Repository, StargazerRecord};
use itertools::Itertools;
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything one invocation needs, resolved from CLI flags and config.
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub user_login: String,
    pub user_token: Option<String>,
    pub user_forks: bool,
    pub force: bool,
    pub forks: bool,
    pub stars: bool,
    pub starred: bool,
    pub save: bool,
    pub clone: bool,
    pub bare: bool,
    pub recursive: bool,
    pub save_path: PathBuf,
    pub repo_list: Vec<String>,
}

pub async fn execute(opts: &RunOptions) -> Result<()> {
    let client = GitHubClient::new(opts.user_token.as_deref())?;
    execute_with(&client, opts).await
}

/// Run all requested modes sequentially against an already-built client.
/// Split out so tests can point the client at a mock server.
pub async fn execute_with(client: &GitHubClient, opts: &RunOptions) -> Result<()> {
    // only list repositories when a mode consumes the list; a starred-only
    // run must not touch (or spend rate limit on) the listing endpoint
    let repos = if opts.stars || opts.forks || opts.save || opts.clone {
        let repos = enumerate_repos(client, opts).await?;
        info!(user = %opts.user_login, count = repos.len(), "enumerated repositories");
        repos
    } else {
        Vec::new()
    };

    if opts.stars {
        save_stargazers(client, &repos, opts).await?;
    }
    if opts.forks {
        save_forks(client, &repos, opts).await?;
    }
    if opts.starred {
        save_starred(client, opts).await?;
    }
    if opts.save || opts.clone {
        fetch_repos(client, &repos, opts).await?;
    }
    Ok(())
}

/// Resolve the set of repositories to operate on.
///
/// An explicit `--repo-list` wins: each name is validated with a direct
/// lookup and pagination never happens, regardless of `--user-forks`.
/// Otherwise the user's repositories are paged in full and forks are
/// dropped unless `--user-forks` asked for them.
pub async fn enumerate_repos(client: &GitHubClient, opts: &RunOptions) -> Result<Vec<Repository>> {
    let repos: Vec<Repository> = if !opts.repo_list.is_empty() {
        let mut out = Vec::with_capacity(opts.repo_list.len());
        for name in &opts.repo_list {
            out.push(client.repo(&opts.user_login, name).await?);
        }
        out
    } else {
        client
            .user_repos(&opts.user_login)
            .await?
            .into_iter()
            .filter(|r| opts.user_forks || !r.fork)
            .collect()
    };

    Ok(repos
        .into_iter()
        .unique_by(|r| (r.owner.login.clone(), r.name.clone()))
        .collect())
}

fn artifact_path(opts: &RunOptions, kind: &str) -> PathBuf {
    opts.save_path
        .join(format!("{}_{kind}.json", opts.user_login))
}

async fn save_stargazers(
    client: &GitHubClient,
    repos: &[Repository],
    opts: &RunOptions,
) -> Result<()> {
    let mut records = Vec::new();
    for repo in repos {
        let entries = client.stargazers(&repo.owner.login, &repo.name).await?;
        info!(repo = %repo.full_name(), count = entries.len(), "fetched stargazers");
        records.extend(
            entries
                .into_iter()
                .map(|e| StargazerRecord::from_entry(&repo.name, e)),
        );
    }
    artifact::write_artifact(&records, &artifact_path(opts, "stargazers"))
}

async fn save_forks(client: &GitHubClient, repos: &[Repository], opts: &RunOptions) -> Result<()> {
    let mut records = Vec::new();
    for repo in repos {
        let entries = client.forks(&repo.owner.login, &repo.name).await?;
        info!(repo = %repo.full_name(), count = entries.len(), "fetched forks");
        records.extend(
            entries
                .into_iter()
                .map(|e| ForkRecord::from_entry(&repo.name, e)),
        );
    }
    artifact::write_artifact(&records, &artifact_path(opts, "forks"))
}

async fn save_starred(client: &GitHubClient, opts: &RunOptions) -> Result<()> {
    let starred = client.starred(&opts.user_login).await?;
    info!(user = %opts.user_login, count = starred.len(), "fetched starred repositories");
    artifact::write_artifact(&starred, &artifact_path(opts, "starred"))
}

/// Fetch every repository sequentially. A failed clone or download is
/// logged and counted; the batch never aborts for one bad repository.
async fn fetch_repos(client: &GitHubClient, repos: &[Repository], opts: &RunOptions) -> Result<()> {
    std::fs::create_dir_all(&opts.save_path)?;
    let clone_opts = CloneOptions {
        bare: opts.bare,
        recursive: opts.recursive,
        force: opts.force,
    };

    let mut summary = FetchSummary::default();
    for repo in repos {
        let result = if opts.save {
            download_snapshot(client, repo, &opts.save_path, opts.force).await
        } else {
            clone_repository(
                repo,
                &opts.save_path,
                &opts.user_login,
                opts.user_token.as_deref(),
                &clone_opts,
            )
            .await
        };

        match result {
            Ok(outcome) => summary.record(outcome),
            Err(e) if e.is_per_repo() => {
                warn!("{e}");
                summary.record(crate::fetch::FetchOutcome::Failed);
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        done = summary.done,
        skipped = summary.skipped,
        failed = summary.failed,
        "fetch complete"
    );
    Ok(())
}
