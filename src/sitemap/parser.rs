// * Sitemap XML Parser
// * Event-based parse of urlset / sitemapindex documents into typed entries.
// * Entries whose <loc> fails URL validation are dropped, not propagated.

use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

// * <changefreq> values per the sitemaps.org protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "always" => Some(Self::Always),
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

// * One <url> entry from a urlset. Immutable once produced; a re-crawl
// * replaces the whole inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub location: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub change_frequency: Option<ChangeFrequency>,
    pub priority: Option<f32>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

// * What a single sitemap document turned out to be.
#[derive(Debug)]
pub enum SitemapDocument {
    UrlSet(Vec<SitemapEntry>),
    Index(Vec<String>),
}

#[derive(Debug, Error)]
pub enum SitemapParseError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document root is neither <urlset> nor <sitemapindex>")]
    UnknownRoot,
}

// * Accepts only fetchable http/https locations.
fn is_valid_location(loc: &str) -> bool {
    match Url::parse(loc) {
        Ok(u) => matches!(u.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

// * lastmod is RFC 3339 or a bare date; anything else becomes None.
fn parse_lastmod(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = s.trim().parse::<DateTime<Utc>>() {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

// * Parses one sitemap document. Handles both urlset and sitemapindex roots;
// * recursion over index children is the reader's job.
pub fn parse_document(xml: &str) -> Result<SitemapDocument, SitemapParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    let mut root: Option<bool> = None; // * true = urlset, false = sitemapindex
    let mut entries: Vec<SitemapEntry> = Vec::new();
    let mut children: Vec<String> = Vec::new();

    let mut in_url = false;
    let mut in_sitemap = false;
    let mut in_image = false;
    let mut in_video = false;
    let mut current_tag = String::new();

    let mut loc = String::new();
    let mut lastmod = String::new();
    let mut changefreq = String::new();
    let mut priority = String::new();
    let mut images: Vec<String> = Vec::new();
    let mut videos: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                // * Qualified name: image:loc must not collide with url loc
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "urlset" if root.is_none() => root = Some(true),
                    "sitemapindex" if root.is_none() => root = Some(false),
                    "url" => {
                        in_url = true;
                        loc.clear();
                        lastmod.clear();
                        changefreq.clear();
                        priority.clear();
                        images.clear();
                        videos.clear();
                    }
                    "sitemap" => {
                        in_sitemap = true;
                        loc.clear();
                    }
                    "image:image" => in_image = true,
                    "video:video" => in_video = true,
                    _ => current_tag = name,
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "url" if in_url => {
                        if is_valid_location(&loc) {
                            entries.push(SitemapEntry {
                                location: loc.clone(),
                                last_modified: if lastmod.is_empty() {
                                    None
                                } else {
                                    parse_lastmod(&lastmod)
                                },
                                change_frequency: ChangeFrequency::parse(&changefreq),
                                priority: priority
                                    .trim()
                                    .parse::<f32>()
                                    .ok()
                                    .map(|p| p.clamp(0.0, 1.0)),
                                images: images.clone(),
                                videos: videos.clone(),
                            });
                        }
                        in_url = false;
                    }
                    "sitemap" if in_sitemap => {
                        if is_valid_location(&loc) {
                            children.push(loc.clone());
                        }
                        in_sitemap = false;
                    }
                    "image:image" => in_image = false,
                    "video:video" => in_video = false,
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().trim().to_string();
                if text.is_empty() {
                    continue;
                }
                match current_tag.as_str() {
                    "loc" if (in_url || in_sitemap) && !in_image && !in_video => loc = text,
                    "lastmod" if in_url => lastmod = text,
                    "changefreq" if in_url => changefreq = text,
                    "priority" if in_url => priority = text,
                    "image:loc" if in_image => images.push(text),
                    "video:content_loc" if in_video => videos.push(text),
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SitemapParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    match root {
        Some(true) => Ok(SitemapDocument::UrlSet(entries)),
        Some(false) => Ok(SitemapDocument::Index(children)),
        None => Err(SitemapParseError::UnknownRoot),
    }
}
