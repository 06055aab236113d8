mod artifact;
mod config;
mod error;
mod fetch;
mod github;
mod run;

use clap::Parser;
use config::Config;
use run::RunOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ghvault", version)]
#[command(about = "Back up GitHub repositories, stargazers and forks")]
struct Cli {
    #[arg(short = 'u', long, help = "GitHub user login")]
    user_login: String,

    #[arg(short = 't', long, help = "Personal access token (or GITHUB_TOKEN env)")]
    user_token: Option<String>,

    #[arg(long, help = "Include the user's own forked repositories")]
    user_forks: bool,

    #[arg(short, long, help = "Debug-level logging")]
    verbose: bool,

    #[arg(short, long, help = "Overwrite existing snapshots and clones")]
    force: bool,

    #[arg(long, help = "Write {login}_forks.json")]
    forks: bool,

    #[arg(long, help = "Write {login}_stargazers.json")]
    stars: bool,

    #[arg(long, help = "Write {login}_starred.json")]
    starred: bool,

    #[arg(long, conflicts_with = "clone", help = "Download tarball snapshots to the save path")]
    save: bool,

    #[arg(long, help = "Clone repositories to the save path")]
    clone: bool,

    #[arg(long, help = "Pass --bare to git clone")]
    bare: bool,

    #[arg(long, help = "Pass --recursive to git clone")]
    recursive: bool,

    #[arg(short = 'p', long, help = "Destination directory")]
    save_path: Option<PathBuf>,

    #[arg(short = 'l', long, num_args = 1.., help = "Explicit repository names (skips listing)")]
    repo_list: Vec<String>,
}

impl Cli {
    /// Layer CLI flags over the ambient config.
    fn into_options(self, config: Config) -> RunOptions {
        RunOptions {
            user_login: self.user_login,
            user_token: self.user_token.or(config.user_token),
            user_forks: self.user_forks,
            force: self.force,
            forks: self.forks,
            stars: self.stars,
            starred: self.starred,
            save: self.save,
            clone: self.clone,
            bare: self.bare,
            recursive: self.recursive,
            save_path: self.save_path.unwrap_or(config.save_path),
            repo_list: self.repo_list,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();
    let opts = cli.into_options(config);

    if let Err(e) = run::execute(&opts).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
