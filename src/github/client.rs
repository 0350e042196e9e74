use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use super::repo::GitHubRepo;
use super::types::Release;
use crate::http::HttpClient;

/// Everything the console reads from the network at startup: the release
/// list plus the out-of-band broadcast text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseFeed: Send + Sync {
    async fn broadcast(&self) -> Result<String>;
    async fn releases(&self) -> Result<Vec<Release>>;
}

pub struct GitHub {
    http: HttpClient,
    repo: GitHubRepo,
    api_url: String,
    broadcast_url: String,
}

impl GitHub {
    #[tracing::instrument(skip(http, api_url, broadcast_url))]
    pub fn new(
        http: HttpClient,
        repo: GitHubRepo,
        api_url: Option<String>,
        broadcast_url: Option<String>,
    ) -> Self {
        let api_url = api_url.unwrap_or_else(|| "https://api.github.com".to_string());
        let broadcast_url = broadcast_url.unwrap_or_else(|| repo.broadcast_url());
        Self {
            http,
            repo,
            api_url,
            broadcast_url,
        }
    }

    pub fn repo(&self) -> &GitHubRepo {
        &self.repo
    }
}

#[async_trait]
impl ReleaseFeed for GitHub {
    #[tracing::instrument(skip(self))]
    async fn broadcast(&self) -> Result<String> {
        debug!("Fetching broadcast from {}...", self.broadcast_url);

        self.http
            .get_text(&self.broadcast_url)
            .await
            .context("Failed to fetch broadcast text")
    }

    #[tracing::instrument(skip(self))]
    async fn releases(&self) -> Result<Vec<Release>> {
        let url = format!(
            "{}/repos/{}/{}/releases",
            self.api_url, self.repo.owner, self.repo.repo
        );

        debug!("Fetching releases from {}...", url);

        self.http
            .get_json(&url)
            .await
            .context("Failed to fetch release list from GitHub API")
    }
}
