//! GitHub surface: repository addressing, wire types, and the release feed.

pub mod client;
pub mod repo;
pub mod types;

pub use client::{GitHub, ReleaseFeed};
pub use repo::GitHubRepo;
pub use types::{Release, ReleaseAsset};
