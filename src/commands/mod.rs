pub mod crawl;
pub mod export;
