// * Configuration Constants
// * Central location for every heuristic threshold and default. The scoring
// * weights are tunable via the per-operation options structs; the values here
// * are the defaults the test suite pins.

// * Identity sent with every probe
pub const DEFAULT_USER_AGENT: &str = "Linkweave/0.1 (+https://linkweave.dev/bot)";

// * Network defaults
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_CONCURRENT: usize = 10;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

// * Politeness pause between probe batches / sitemap index levels
pub const BATCH_PAUSE_MS: u64 = 250;

// * Sitemap crawl limits
pub const DEFAULT_SITEMAP_MAX_URLS: usize = 50_000;
pub const DEFAULT_SITEMAP_MAX_DEPTH: usize = 3;

// * Health check thresholds
pub const DEFAULT_SLOW_LINK_THRESHOLD_MS: u64 = 3_000;
pub const SLOWEST_LINKS_REPORTED: usize = 5;
pub const REDIRECT_HOP_LIMIT: usize = 5;

// * Bounded health cache capacity (records, one per URL)
pub const DEFAULT_HEALTH_CACHE_CAPACITY: usize = 10_000;

// * A paragraph absorbs one link per this many words
pub const WORDS_PER_LINK: usize = 50;

// * Section importance weights (sum of maxima = 1.0)
pub const IMPORTANCE_POSITION_WEIGHT: f64 = 0.5;
pub const IMPORTANCE_LENGTH_WEIGHT: f64 = 0.3;
pub const IMPORTANCE_TITLE_BONUS: f64 = 0.2;
pub const IMPORTANCE_LENGTH_SATURATION_WORDS: usize = 400;

// * Paragraph selection score weights
pub const PARAGRAPH_CAPACITY_WEIGHT: f64 = 10.0;
pub const PARAGRAPH_KEYWORD_WEIGHT: f64 = 5.0;
pub const PARAGRAPH_KEYWORD_CAP: f64 = 20.0;
pub const PARAGRAPH_LENGTH_DIVISOR: f64 = 10.0;
pub const PARAGRAPH_LENGTH_CAP: f64 = 15.0;
pub const PARAGRAPH_EXISTING_LINK_PENALTY: f64 = 5.0;

// * Placement defaults
pub const DEFAULT_MAX_LINKS_PER_PAGE: usize = 10;
pub const DEFAULT_MAX_LINKS_PER_PARAGRAPH: usize = 1;
pub const DEFAULT_MIN_LINK_DISTANCE_WORDS: usize = 100;
pub const DEFAULT_LINK_DENSITY_PER_100_WORDS: f64 = 1.0;

// * Distribution score penalties and bonuses (0-100 scale)
pub const DENSITY_DEVIATION_PENALTY_PER_UNIT: f64 = 15.0;
pub const DENSITY_DEVIATION_PENALTY_CAP: f64 = 30.0;
pub const SECTION_SPREAD_PENALTY: f64 = 15.0;
pub const SPACING_PENALTY: f64 = 10.0;
pub const BREADTH_BONUS: f64 = 5.0;
pub const BREADTH_BONUS_MIN_PARAGRAPHS: usize = 3;
pub const DIVERSITY_BONUS_MIN_CLASSES: usize = 3;

// * Replacement advisor
pub const REPLACEMENT_SIMILARITY_THRESHOLD: f64 = 0.5;
pub const REPLACEMENT_PROBE_LIMIT: usize = 3;
pub const ARCHIVE_FALLBACK_CONFIDENCE: f64 = 0.3;
pub const ARCHIVE_SNAPSHOT_PREFIX: &str = "https://web.archive.org/web/";
