//! Data models for configuration and page results.

pub mod config;
pub mod page;

pub use config::PagetextConfig;
pub use page::{Page, PageType, TextStats};
