use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("invalid start url: {0}")]
    InvalidUrl(String),

    #[error("config error: {0}")]
    Config(String),
}
