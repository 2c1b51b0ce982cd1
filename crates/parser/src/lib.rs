pub mod html;
pub mod staleness;

pub use html::extract_links;
pub use staleness::detect as detect_staleness;
