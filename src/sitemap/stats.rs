// * Sitemap Statistics
// * Post-hoc aggregation over a crawled inventory: totals, priority average,
// * change-frequency histogram, URL-pattern clustering, and naive page-type
// * classification by path heuristics.

use crate::sitemap::parser::SitemapEntry;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

// * Variable path segments collapse into placeholders so /blog/17 and
// * /blog/42 cluster under /blog/{id}.
static NUMERIC_SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());
static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});
static DATE_SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Homepage,
    Blog,
    Product,
    Category,
    Tag,
    Static,
    Other,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Homepage => "homepage",
            Self::Blog => "blog",
            Self::Product => "product",
            Self::Category => "category",
            Self::Tag => "tag",
            Self::Static => "static",
            Self::Other => "other",
        }
    }
}

// * One cluster of structurally-identical URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlPattern {
    pub pattern: String,
    pub count: usize,
    pub example: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitemapStats {
    pub total_pages: usize,
    pub total_images: usize,
    pub total_videos: usize,
    pub average_priority: Option<f32>,
    pub change_frequency_histogram: BTreeMap<String, usize>,
    pub url_patterns: Vec<UrlPattern>,
    pub page_type_histogram: BTreeMap<String, usize>,
}

// * Collapses one path segment to a placeholder when it looks variable.
pub fn normalize_segment(segment: &str) -> String {
    if NUMERIC_SEGMENT.is_match(segment) {
        "{id}".to_string()
    } else if UUID_SEGMENT.is_match(segment) {
        "{uuid}".to_string()
    } else if DATE_SEGMENT.is_match(segment) {
        "{date}".to_string()
    } else {
        segment.to_string()
    }
}

// * Normalizes a full path, e.g. /blog/2024-01-02/17 -> /blog/{date}/{id}
pub fn normalize_path(path: &str) -> String {
    let normalized: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(normalize_segment)
        .collect();

    if normalized.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", normalized.join("/"))
    }
}

// * Best-effort page-type classification from the path alone.
pub fn classify_page_type(url: &Url) -> PageType {
    let path = url.path().to_lowercase();

    if path == "/" || path.is_empty() {
        return PageType::Homepage;
    }

    let has = |needles: &[&str]| needles.iter().any(|n| path.contains(n));

    if has(&["/blog", "/news", "/article", "/post"]) {
        PageType::Blog
    } else if has(&["/product", "/shop", "/item", "/store"]) {
        PageType::Product
    } else if has(&["/category", "/categories", "/collection"]) {
        PageType::Category
    } else if has(&["/tag", "/tags", "/topic"]) {
        PageType::Tag
    } else if has(&["/about", "/contact", "/privacy", "/terms", "/faq", "/legal"]) {
        PageType::Static
    } else {
        PageType::Other
    }
}

impl SitemapStats {
    pub fn compute(entries: &[SitemapEntry]) -> Self {
        let total_pages = entries.len();
        let total_images = entries.iter().map(|e| e.images.len()).sum();
        let total_videos = entries.iter().map(|e| e.videos.len()).sum();

        let priorities: Vec<f32> = entries.iter().filter_map(|e| e.priority).collect();
        let average_priority = if priorities.is_empty() {
            None
        } else {
            Some(priorities.iter().sum::<f32>() / priorities.len() as f32)
        };

        let mut change_frequency_histogram: BTreeMap<String, usize> = BTreeMap::new();
        for entry in entries {
            if let Some(freq) = entry.change_frequency {
                *change_frequency_histogram
                    .entry(freq.as_str().to_string())
                    .or_insert(0) += 1;
            }
        }

        let mut pattern_counts: BTreeMap<String, (usize, String)> = BTreeMap::new();
        let mut page_type_histogram: BTreeMap<String, usize> = BTreeMap::new();
        for entry in entries {
            if let Ok(url) = Url::parse(&entry.location) {
                let pattern = normalize_path(url.path());
                let slot = pattern_counts
                    .entry(pattern)
                    .or_insert_with(|| (0, entry.location.clone()));
                slot.0 += 1;

                *page_type_histogram
                    .entry(classify_page_type(&url).as_str().to_string())
                    .or_insert(0) += 1;
            }
        }

        let mut url_patterns: Vec<UrlPattern> = pattern_counts
            .into_iter()
            .map(|(pattern, (count, example))| UrlPattern {
                pattern,
                count,
                example,
            })
            .collect();
        // * Largest clusters first
        url_patterns.sort_by(|a, b| b.count.cmp(&a.count).then(a.pattern.cmp(&b.pattern)));

        Self {
            total_pages,
            total_images,
            total_videos,
            average_priority,
            change_frequency_histogram,
            url_patterns,
            page_type_histogram,
        }
    }
}
