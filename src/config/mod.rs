//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::IgnoredHttpError;
pub use site::PrerenderConfig;
pub use site::SiteConfig;
