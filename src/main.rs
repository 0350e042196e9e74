use anyhow::Result;
use clap::Parser;
use ghrc::app::App;
use ghrc::download::{Browser, DEFAULT_PROXY};
use ghrc::github::client::GitHub;
use ghrc::github::repo::GitHubRepo;
use ghrc::http::HttpClient;

/// ghrc - GitHub Release Console
///
/// Browse the releases of a GitHub repository in the terminal and launch
/// proxy-accelerated downloads in the default browser.
///
/// Examples:
///   ghrc owner/repo     # Browse the releases of owner/repo
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// The GitHub repository in the format "owner/repo"
    #[arg(value_name = "OWNER/REPO")]
    repo: String,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL")]
    api_url: Option<String>,

    /// Broadcast text URL (defaults to the repository's home.txt on main)
    #[arg(long = "broadcast-url", value_name = "URL")]
    broadcast_url: Option<String>,

    /// Accelerator origin prepended to download URLs (also via GHRC_PROXY)
    #[arg(
        long = "proxy",
        env = "GHRC_PROXY",
        value_name = "URL",
        default_value = DEFAULT_PROXY
    )]
    proxy: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let repo: GitHubRepo = cli.repo.parse()?;

    let client = reqwest::Client::builder()
        .user_agent(concat!("ghrc/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let feed = GitHub::new(
        HttpClient::new(client),
        repo.clone(),
        cli.api_url,
        cli.broadcast_url,
    );
    let app = App::new(repo, cli.proxy);

    ghrc::ui::run(app, &feed, &Browser).await
}
