// * Linkweave - Link Graph Maintenance & Placement Engine
// * Discovers a site's URL inventory from XML sitemaps, probes link health at
// * scale with bounded concurrency and retries, and plans internal link
// * placement under density, spacing, and anchor-diversity constraints.

pub mod config;
pub mod content;
pub mod health;
pub mod network;
pub mod placement;
pub mod replacement;
pub mod sitemap;

pub use content::{parse_structure, Paragraph, Section};
pub use health::{
    CheckOptions, HealthCache, InMemoryHealthCache, LinkAnalysisResult, LinkHealthChecker,
    LinkHealthRecord, LinkStatus, MonitorReport,
};
pub use placement::{
    AnchorTextClass, CandidateLink, DistributionResult, ExistingLink, LinkPlacementPlanner,
    PlacementDecision, PlacementOptions, SkippedLink,
};
pub use replacement::{ReplacementAdvisor, ReplacementSuggestion, SuggestionSource};
pub use sitemap::{
    ChangeFrequency, SitemapEntry, SitemapError, SitemapGraphReader, SitemapOptions,
    SitemapReport, SitemapStats,
};
