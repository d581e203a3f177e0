//! Configuration module

mod site;

pub use site::CacheConfig;
pub use site::HighlightConfig;
pub use site::SiteConfig;
