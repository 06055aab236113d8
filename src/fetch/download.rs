use crate::error::{GhvaultError, Result};
use crate::fetch::FetchOutcome;
use crate::github::client::GitHubClient;
use crate::github::types::Repository;
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Download a tarball snapshot of `repo` to `{save_path}/{name}.tar.gz`.
///
/// An existing target is left alone unless `force`. Network failures come
/// back as a download error naming the repository so the caller can log it
/// and move on to the next one; a partially written file may remain and is
/// replaced by a `--force` rerun.
pub async fn download_snapshot(
    client: &GitHubClient,
    repo: &Repository,
    save_path: &Path,
    force: bool,
) -> Result<FetchOutcome> {
    let dest = save_path.join(format!("{}.tar.gz", repo.name));
    if dest.exists() && !force {
        info!(repo = %repo.full_name(), path = %dest.display(), "snapshot exists, skipping");
        return Ok(FetchOutcome::Skipped);
    }

    let route = format!("repos/{}/{}/tarball", repo.owner.login, repo.name);
    let resp = client.get_stream(&route).await.map_err(|e| match e {
        GhvaultError::Auth { .. } => e,
        other => GhvaultError::Download {
            repo: repo.full_name(),
            detail: other.to_string(),
        },
    })?;

    let mut file = tokio::fs::File::create(&dest).await?;
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            warn!(repo = %repo.full_name(), "stream interrupted");
            GhvaultError::Download {
                repo: repo.full_name(),
                detail: e.to_string(),
            }
        })?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    info!(repo = %repo.full_name(), path = %dest.display(), "snapshot saved");
    Ok(FetchOutcome::Done)
}
