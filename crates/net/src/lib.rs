pub mod fetcher;
pub mod normalize;
pub mod sitemap;

pub use fetcher::{FetchResponse, Fetcher, HttpFetcher};
pub use normalize::{canonical_string, normalize, origin_key, same_origin};
pub use sitemap::load_sitemap;
