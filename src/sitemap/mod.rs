// * Sitemap Graph Layer
// * XML parsing, recursive index expansion, robots advisory, and inventory
// * statistics.

pub mod parser;
pub mod reader;
pub mod robots;
pub mod stats;

pub use parser::{ChangeFrequency, SitemapDocument, SitemapEntry, SitemapParseError};
pub use reader::{
    Severity, SitemapError, SitemapErrorKind, SitemapGraphReader, SitemapOptions, SitemapReport,
};
pub use robots::RobotsAdvisor;
pub use stats::{PageType, SitemapStats, UrlPattern};
