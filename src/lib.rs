pub mod app;
pub mod download;
pub mod github;
pub mod http;
pub mod text;
pub mod ui;
