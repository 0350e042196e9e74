//! Application state: the release list, the accordion selection state
//! machine, and the activity log every transition reports to.
//!
//! All mutable state lives in [`App`], owned by the single UI task and
//! constructed fresh per test. The terminal layer holds no state of its
//! own; it draws whatever `App` derives and feeds events back in.

pub mod log;
pub mod selection;

use crate::download::{Navigate, accelerated_url};
use crate::github::client::ReleaseFeed;
use crate::github::repo::GitHubRepo;
use crate::github::types::{Release, ReleaseAsset};
use crate::text::{format_file_size, sanitize_display};

pub use self::log::{ActivityLog, LOG_CAPACITY, LogEntry, Severity};
pub use self::selection::Selection;

/// One visible row of the release panel. Drawing and mouse hit-testing
/// both derive from the same [`App::visible_rows`] list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    ReleaseHeader(usize),
    Asset { release: usize, asset: usize },
}

/// Outcome of the one-shot release fetch, driving the list panel
/// placeholder. `Failed` is terminal for the session; there is no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded,
    Failed,
}

pub struct App {
    pub repo: GitHubRepo,
    pub proxy: String,
    pub log: ActivityLog,
    releases: Vec<Release>,
    selection: Selection,
    load_state: LoadState,
    /// Cursor position within `visible_rows`.
    pub cursor: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(repo: GitHubRepo, proxy: String) -> Self {
        Self {
            repo,
            proxy,
            log: ActivityLog::new(),
            releases: Vec::new(),
            selection: Selection::Collapsed,
            load_state: LoadState::default(),
            cursor: 0,
            should_quit: false,
        }
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Runs the one-shot startup sequence: broadcast first, releases
    /// second, each awaited to completion before the next begins. Failures
    /// are logged and never propagate; the session continues regardless.
    pub async fn startup(&mut self, feed: &dyn ReleaseFeed) {
        self.log.info("System initializing...");
        self.fetch_broadcast(feed).await;
        self.fetch_releases(feed).await;
        self.log.info("System ready. Awaiting user input.");
    }

    async fn fetch_broadcast(&mut self, feed: &dyn ReleaseFeed) {
        self.log.info("Fetching system broadcast...");
        match feed.broadcast().await {
            Ok(text) if !text.trim().is_empty() => {
                self.log.info("--- [ SYSTEM BROADCAST ] ---");
                for line in text.trim_end().lines() {
                    self.log.info(format!("  {}", sanitize_display(line)));
                }
                self.log.info("----------------------------");
            }
            Ok(_) => self.log.info("No active broadcast."),
            Err(err) => {
                self.log
                    .error(format!("Failed to fetch broadcast: {:#}", err));
            }
        }
    }

    async fn fetch_releases(&mut self, feed: &dyn ReleaseFeed) {
        self.log
            .info(format!("Connecting to repository: {}", self.repo));
        match feed.releases().await {
            Ok(releases) => {
                self.log.info(format!(
                    "Success. Found {} release packages.",
                    releases.len()
                ));
                self.set_releases(releases);
            }
            Err(err) => {
                self.log
                    .error(format!("Failed to fetch releases: {:#}", err));
                self.load_state = LoadState::Failed;
            }
        }
    }

    /// Replaces the release list wholesale. Any expansion or selection
    /// refers to the old data and is discarded with it.
    pub fn set_releases(&mut self, releases: Vec<Release>) {
        self.releases = releases;
        self.selection = Selection::Collapsed;
        self.cursor = 0;
        self.load_state = LoadState::Loaded;
        if self.releases.is_empty() {
            self.log.info("No release packages available.");
        }
    }

    /// Rows of the release panel in display order: every release header,
    /// with the expanded release's assets inlined beneath its header.
    pub fn visible_rows(&self) -> Vec<Row> {
        let expanded = self.selection.expanded_release();
        let mut rows = Vec::new();
        for (index, release) in self.releases.iter().enumerate() {
            rows.push(Row::ReleaseHeader(index));
            if expanded == Some(index) {
                for asset in 0..release.assets.len() {
                    rows.push(Row::Asset {
                        release: index,
                        asset,
                    });
                }
            }
        }
        rows
    }

    /// Navigation-depth indicator: `/`, `/<release>`, or `/<release>/<asset>`.
    pub fn breadcrumb(&self) -> String {
        match self.selection {
            Selection::Collapsed => "/".to_string(),
            Selection::Expanded { release } => format!("/{}", self.release_name(release)),
            Selection::Selected { release, asset } => format!(
                "/{}/{}",
                self.release_name(release),
                self.asset_name(release, asset)
            ),
        }
    }

    pub fn selected_asset(&self) -> Option<&ReleaseAsset> {
        let (release, asset) = self.selection.selected_asset()?;
        self.releases.get(release)?.assets.get(asset)
    }

    /// The download action is available exactly when an asset is selected.
    pub fn download_enabled(&self) -> bool {
        self.selected_asset().is_some()
    }

    /// Text for the selected-file info label.
    pub fn selected_file_info(&self) -> String {
        match self.selected_asset() {
            Some(asset) => format!(
                "[{}] {}",
                format_file_size(asset.size),
                sanitize_display(&asset.name)
            ),
            None => "No file selected".to_string(),
        }
    }

    /// Expands or collapses a release. Collapsing (or switching to another
    /// release) first deselects any selected asset, logging each step.
    pub fn toggle_release(&mut self, index: usize) {
        if index >= self.releases.len() {
            return;
        }
        match self.selection.expanded_release() {
            Some(current) if current == index => {
                if let Some((_, asset)) = self.selection.selected_asset() {
                    self.log_deselected(current, asset);
                }
                self.selection = Selection::Collapsed;
                self.log_collapsed(index);
            }
            Some(other) => {
                if let Some((_, asset)) = self.selection.selected_asset() {
                    self.log_deselected(other, asset);
                }
                self.log_collapsed(other);
                self.selection = Selection::Expanded { release: index };
                self.log_expanded(index);
            }
            None => {
                self.selection = Selection::Expanded { release: index };
                self.log_expanded(index);
            }
        }
        self.clamp_cursor();
    }

    /// Selects an asset of the expanded release, deselecting any previous
    /// selection first. Selecting the selected asset deselects it.
    pub fn select_asset(&mut self, release: usize, asset: usize) {
        if self.selection.expanded_release() != Some(release) {
            return;
        }
        if self
            .releases
            .get(release)
            .is_none_or(|r| asset >= r.assets.len())
        {
            return;
        }
        match self.selection.selected_asset() {
            Some((_, current)) if current == asset => {
                self.log_deselected(release, current);
                self.selection = Selection::Expanded { release };
            }
            Some((_, previous)) => {
                self.log_deselected(release, previous);
                self.selection = Selection::Selected { release, asset };
                self.log_selected(release, asset);
            }
            None => {
                self.selection = Selection::Selected { release, asset };
                self.log_selected(release, asset);
            }
        }
    }

    /// Activates a row the way a click or Enter does.
    pub fn activate(&mut self, row: Row) {
        match row {
            Row::ReleaseHeader(index) => self.toggle_release(index),
            Row::Asset { release, asset } => self.select_asset(release, asset),
        }
    }

    /// Activates the row under the cursor, if any.
    pub fn activate_cursor(&mut self) {
        if let Some(row) = self.visible_rows().get(self.cursor).copied() {
            self.activate(row);
        }
    }

    pub fn move_cursor(&mut self, delta: i64) {
        let rows = self.visible_rows().len();
        if rows == 0 {
            self.cursor = 0;
            return;
        }
        let position = self.cursor as i64 + delta;
        self.cursor = position.clamp(0, rows as i64 - 1) as usize;
    }

    fn clamp_cursor(&mut self) {
        let rows = self.visible_rows().len();
        if rows == 0 {
            self.cursor = 0;
        } else if self.cursor >= rows {
            self.cursor = rows - 1;
        }
    }

    /// Launches the selected asset through the accelerator. With nothing
    /// selected this is a logged no-op; navigation never blocks and its
    /// outcome beyond launch is outside our observability.
    pub fn request_download(&mut self, navigator: &dyn Navigate) {
        let Some(asset) = self.selected_asset().cloned() else {
            self.log.warn("Download requested but no file selected.");
            return;
        };
        let accelerated = accelerated_url(&self.proxy, &asset.browser_download_url);
        self.log.info(format!(
            "Initiating download for {}",
            sanitize_display(&asset.name)
        ));
        self.log
            .info(format!("URL: {}", asset.browser_download_url));
        self.log.info(format!("Accelerated URL: {}", accelerated));
        if let Err(err) = navigator.open(&accelerated) {
            self.log.error(format!("Failed to open browser: {:#}", err));
        }
    }

    pub fn log_click(&mut self, x: u16, y: u16, target: &str) {
        self.log.info(format!("CLICK (x:{}, y:{}) on {}", x, y, target));
    }

    pub fn log_pointer_move(&mut self, x: u16, y: u16) {
        self.log.info(format!("MOUSE_MOVE (x:{}, y:{})", x, y));
    }

    fn release_name(&self, index: usize) -> String {
        self.releases
            .get(index)
            .map(|r| sanitize_display(r.display_name()))
            .unwrap_or_default()
    }

    fn asset_name(&self, release: usize, asset: usize) -> String {
        self.releases
            .get(release)
            .and_then(|r| r.assets.get(asset))
            .map(|a| sanitize_display(&a.name))
            .unwrap_or_default()
    }

    fn log_expanded(&mut self, index: usize) {
        let name = self.release_name(index);
        self.log.info(format!("Expanded release: {}", name));
    }

    fn log_collapsed(&mut self, index: usize) {
        let name = self.release_name(index);
        self.log.info(format!("Collapsed release: {}", name));
    }

    fn log_selected(&mut self, release: usize, asset: usize) {
        let name = self.asset_name(release, asset);
        self.log.info(format!("Selected file: {}", name));
    }

    fn log_deselected(&mut self, release: usize, asset: usize) {
        let name = self.asset_name(release, asset);
        self.log.info(format!("Deselected file: {}", name));
    }
}
