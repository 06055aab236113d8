use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Ambient configuration merged underneath the CLI flags:
/// defaults <- config.toml <- GHVAULT_* env <- GITHUB_TOKEN env.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub user_token: Option<String>,
    pub save_path: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("user_token", &self.user_token.as_ref().map(|_| "[REDACTED]"))
            .field("save_path", &self.save_path)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_token: None,
            save_path: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_file = config_dir().join("ghvault").join("config.toml");

        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if config_file.exists() {
            figment = figment.merge(Toml::file(&config_file));
        }

        figment = figment.merge(Env::prefixed("GHVAULT_")).merge(
            Env::raw()
                .only(&["GITHUB_TOKEN"])
                .map(|_| "user_token".into()),
        );

        match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("warning: config parse error, using defaults: {e}");
                Config::default()
            }
        }
    }
}

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}
