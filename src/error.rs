use thiserror::Error;

#[derive(Error, Debug)]
pub enum GhvaultError {
    #[error("authentication failed (HTTP {status}): check the supplied token")]
    Auth { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("clone failed for {repo}: {detail}")]
    Clone { repo: String, detail: String },

    #[error("download failed for {repo}: {detail}")]
    Download { repo: String, detail: String },
}

impl From<reqwest::Error> for GhvaultError {
    fn from(e: reqwest::Error) -> Self {
        GhvaultError::Transport(e.to_string())
    }
}

impl GhvaultError {
    /// Failures scoped to a single repository; the batch keeps going past these.
    pub fn is_per_repo(&self) -> bool {
        matches!(
            self,
            GhvaultError::Clone { .. } | GhvaultError::Download { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GhvaultError>;
