pub mod config;
pub mod error;
pub mod types;

pub use config::{CrawlConfig, DEFAULT_RETRY_STATUSES, DEFAULT_USER_AGENT};
pub use error::CrawlError;
pub use types::*;
