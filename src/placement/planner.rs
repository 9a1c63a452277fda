// * Link Placement Planner
// * Greedy, priority-ordered allocation of candidate links to
// * (section, paragraph, position) slots under density, spacing, and
// * per-paragraph capacity constraints. Pure and synchronous: the only
// * inputs are the document, the candidates, and prior health results.
// * A candidate that cannot be placed becomes a skip entry, never an error.

use crate::config::constants::{
    DEFAULT_LINK_DENSITY_PER_100_WORDS, DEFAULT_MAX_LINKS_PER_PAGE,
    DEFAULT_MAX_LINKS_PER_PARAGRAPH, DEFAULT_MIN_LINK_DISTANCE_WORDS,
    PARAGRAPH_CAPACITY_WEIGHT, PARAGRAPH_EXISTING_LINK_PENALTY, PARAGRAPH_KEYWORD_CAP,
    PARAGRAPH_KEYWORD_WEIGHT, PARAGRAPH_LENGTH_CAP, PARAGRAPH_LENGTH_DIVISOR, WORDS_PER_LINK,
};
use crate::content::{parse_structure_with, Section, StructureConfig};
use crate::health::{LinkHealthRecord, LinkStatus};
use crate::network::normalize_url;
use crate::placement::distribution::{
    score_and_recommend, DistributionMetrics, DistributionResult,
};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorTextClass {
    Exact,
    Partial,
    Branded,
    Generic,
    Lsi,
}

impl AnchorTextClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Partial => "partial",
            Self::Branded => "branded",
            Self::Generic => "generic",
            Self::Lsi => "lsi",
        }
    }
}

// * Caller-supplied link request. Consumed, not owned, by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateLink {
    pub keyword: String,
    pub target_url: String,
    pub priority: u32,
    pub anchor_text_class: AnchorTextClass,
    pub target_section: Option<String>,
}

// * A link already present in the document, by byte offset. Used only for
// * spacing checks; inline markdown links are counted by the parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingLink {
    pub url: String,
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct PlacementOptions {
    pub max_links_per_page: usize,
    pub max_links_per_paragraph: usize,
    pub min_distance_between_links_words: usize,
    pub preferred_link_density_per_100_words: f64,
    pub avoid_link_clusters: bool,
    pub words_per_link: usize,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            max_links_per_page: DEFAULT_MAX_LINKS_PER_PAGE,
            max_links_per_paragraph: DEFAULT_MAX_LINKS_PER_PARAGRAPH,
            min_distance_between_links_words: DEFAULT_MIN_LINK_DISTANCE_WORDS,
            preferred_link_density_per_100_words: DEFAULT_LINK_DENSITY_PER_100_WORDS,
            avoid_link_clusters: true,
            words_per_link: WORDS_PER_LINK,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementDecision {
    pub link: CandidateLink,
    pub section_index: usize,
    pub paragraph_index: usize,
    pub character_offset: usize,
    pub confidence: f64,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedLink {
    pub link: CandidateLink,
    pub reason: String,
}

// * How the rewrite realizes a decision.
enum InsertKind {
    // * Wrap an in-place keyword occurrence of this byte length
    WrapKeyword(usize),
    // * Insert a full ` [keyword](url)` anchor at the offset
    InsertAnchor,
}

struct PlannedInsertion {
    decision: PlacementDecision,
    kind: InsertKind,
}

// * One scored paragraph slot during phase 2.
struct SlotCandidate {
    paragraph_index: usize,
    offset: usize,
    keyword_len: Option<usize>,
    score: f64,
}

pub struct LinkPlacementPlanner {
    options: PlacementOptions,
}

impl LinkPlacementPlanner {
    pub fn new(options: PlacementOptions) -> Self {
        Self { options }
    }

    pub fn with_defaults() -> Self {
        Self::new(PlacementOptions::default())
    }

    // * Plans and executes placements. `health` may be empty; records with
    // * broken status veto their target URLs.
    pub fn plan(
        &self,
        document: &str,
        candidates: &[CandidateLink],
        existing_links: &[ExistingLink],
        health: &[LinkHealthRecord],
    ) -> DistributionResult {
        let structure_config = StructureConfig {
            words_per_link: self.options.words_per_link,
        };
        let sections = parse_structure_with(document, &structure_config);

        let broken: HashSet<String> = health
            .iter()
            .filter(|r| r.status == LinkStatus::Broken)
            .map(|r| normalize_url(&r.url).unwrap_or_else(|| r.url.clone()))
            .collect();

        // * Per-section budget: min(capacity, floor(words * density / 100))
        let section_budgets: Vec<usize> = sections
            .iter()
            .map(|s| {
                let by_density = (s.word_count() as f64
                    * self.options.preferred_link_density_per_100_words
                    / 100.0)
                    .floor() as usize;
                s.link_capacity().min(by_density)
            })
            .collect();

        let mut section_alloc = vec![0usize; sections.len()];
        let mut para_placed: Vec<Vec<usize>> = sections
            .iter()
            .map(|s| vec![0usize; s.paragraphs.len()])
            .collect();

        // * Word positions of every link (existing + placed) for spacing
        let mut link_positions: Vec<usize> = existing_links
            .iter()
            .map(|l| word_index(document, l.offset))
            .collect();
        let mut occupied: Vec<(usize, usize)> = Vec::new();

        let mut planned: Vec<PlannedInsertion> = Vec::new();
        let mut skipped: Vec<SkippedLink> = Vec::new();

        // * Priority order, stable for equal priorities
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| candidates[b].priority.cmp(&candidates[a].priority));

        for idx in order {
            let candidate = &candidates[idx];

            if planned.len() >= self.options.max_links_per_page {
                skipped.push(SkippedLink {
                    link: candidate.clone(),
                    reason: format!(
                        "page link budget ({}) reached",
                        self.options.max_links_per_page
                    ),
                });
                continue;
            }

            let target_key = normalize_url(&candidate.target_url)
                .unwrap_or_else(|| candidate.target_url.clone());
            if broken.contains(&target_key) {
                skipped.push(SkippedLink {
                    link: candidate.clone(),
                    reason: "target URL is broken according to the latest health check"
                        .to_string(),
                });
                continue;
            }

            let keyword_re = match keyword_regex(&candidate.keyword) {
                Some(re) => re,
                None => {
                    skipped.push(SkippedLink {
                        link: candidate.clone(),
                        reason: "keyword is empty or unusable".to_string(),
                    });
                    continue;
                }
            };

            // * Phase 1: pick a section
            let section_index = match self.select_section(
                candidate,
                &keyword_re,
                &sections,
                &section_budgets,
                &section_alloc,
            ) {
                Ok(i) => i,
                Err(reason) => {
                    skipped.push(SkippedLink {
                        link: candidate.clone(),
                        reason,
                    });
                    continue;
                }
            };

            // * Phase 2 + 3: pick a paragraph and resolve the position
            let slot = match self.select_slot(
                &keyword_re,
                &sections[section_index],
                &para_placed[section_index],
                &link_positions,
                &occupied,
                document,
            ) {
                Ok(slot) => slot,
                Err(reason) => {
                    skipped.push(SkippedLink {
                        link: candidate.clone(),
                        reason: format!(
                            "{reason} in section {}",
                            section_label(&sections[section_index], section_index)
                        ),
                    });
                    continue;
                }
            };

            let (kind, confidence, rationale, range) = match slot.keyword_len {
                Some(len) => {
                    let paragraph =
                        &sections[section_index].paragraphs[slot.paragraph_index];
                    let occurrences = keyword_re.find_iter(&paragraph.text).count();
                    let mut confidence: f64 = 0.85;
                    if occurrences >= 2 {
                        confidence += 0.05;
                    }
                    if paragraph.link_capacity >= 2 {
                        confidence += 0.05;
                    }
                    (
                        InsertKind::WrapKeyword(len),
                        confidence.min(0.95),
                        format!(
                            "keyword '{}' found in paragraph {} of section {}",
                            candidate.keyword,
                            slot.paragraph_index,
                            section_label(&sections[section_index], section_index)
                        ),
                        (slot.offset, slot.offset + len),
                    )
                }
                None => (
                    InsertKind::InsertAnchor,
                    0.4,
                    format!(
                        "keyword '{}' not present in the chosen paragraph; inserted at the midpoint (low confidence)",
                        candidate.keyword
                    ),
                    (slot.offset, slot.offset + 1),
                ),
            };

            debug!(
                "Placing '{}' -> {} at offset {}",
                candidate.keyword, candidate.target_url, slot.offset
            );

            section_alloc[section_index] += 1;
            para_placed[section_index][slot.paragraph_index] += 1;
            link_positions.push(word_index(document, slot.offset));
            occupied.push(range);

            planned.push(PlannedInsertion {
                decision: PlacementDecision {
                    link: candidate.clone(),
                    section_index,
                    paragraph_index: slot.paragraph_index,
                    character_offset: slot.offset,
                    confidence,
                    rationale,
                },
                kind,
            });
        }

        self.finish(document, &sections, planned, skipped, &link_positions, candidates.len())
    }

    // * Phase 1: sections where the keyword occurs (and the target-section
    // * hint matches), ranked by importance, constrained by budget.
    fn select_section(
        &self,
        candidate: &CandidateLink,
        keyword_re: &Regex,
        sections: &[Section],
        budgets: &[usize],
        alloc: &[usize],
    ) -> Result<usize, String> {
        if let Some(hint) = &candidate.target_section {
            let hint_lower = hint.to_lowercase();
            let hinted: Vec<usize> = (0..sections.len())
                .filter(|&i| {
                    sections[i]
                        .title
                        .as_ref()
                        .map(|t| t.to_lowercase().contains(&hint_lower))
                        .unwrap_or(false)
                })
                .collect();
            if hinted.is_empty() {
                return Err(format!("target section '{hint}' not found"));
            }
            return self.pick_from(candidate, keyword_re, sections, budgets, alloc, &hinted);
        }

        let all: Vec<usize> = (0..sections.len()).collect();
        self.pick_from(candidate, keyword_re, sections, budgets, alloc, &all)
    }

    fn pick_from(
        &self,
        candidate: &CandidateLink,
        keyword_re: &Regex,
        sections: &[Section],
        budgets: &[usize],
        alloc: &[usize],
        indices: &[usize],
    ) -> Result<usize, String> {
        let containing: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| {
                sections[i]
                    .paragraphs
                    .iter()
                    .any(|p| keyword_re.is_match(&p.text))
            })
            .collect();

        if containing.is_empty() {
            return Err(format!(
                "keyword '{}' not found in the document",
                candidate.keyword
            ));
        }

        containing
            .into_iter()
            .filter(|&i| alloc[i] < budgets[i])
            .max_by(|&a, &b| {
                sections[a]
                    .importance
                    .partial_cmp(&sections[b].importance)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    // * Ties break toward the earlier section
                    .then(b.cmp(&a))
            })
            .ok_or_else(|| {
                format!(
                    "sections containing '{}' are at their link budget",
                    candidate.keyword
                )
            })
    }

    // * Phase 2: score eligible paragraphs; phase 3: resolve the offset.
    // * A strict pass requires the keyword in the paragraph; when nothing
    // * qualifies, a relaxed pass accepts capacity-only slots with a
    // * midpoint insertion.
    fn select_slot(
        &self,
        keyword_re: &Regex,
        section: &Section,
        placed: &[usize],
        link_positions: &[usize],
        occupied: &[(usize, usize)],
        document: &str,
    ) -> Result<SlotCandidate, String> {
        let mut strict: Vec<SlotCandidate> = Vec::new();
        let mut relaxed: Vec<SlotCandidate> = Vec::new();
        let mut blocked_by_spacing = false;

        for (j, paragraph) in section.paragraphs.iter().enumerate() {
            let capacity_remaining = paragraph.link_capacity.saturating_sub(placed[j]);
            if capacity_remaining == 0 || placed[j] >= self.options.max_links_per_paragraph {
                continue;
            }

            let occurrence = first_free_occurrence(keyword_re, paragraph, occupied);
            let occurrences = keyword_re.find_iter(&paragraph.text).count();

            let base_score = PARAGRAPH_CAPACITY_WEIGHT * capacity_remaining as f64
                + (PARAGRAPH_KEYWORD_WEIGHT * occurrences as f64).min(PARAGRAPH_KEYWORD_CAP)
                + (paragraph.word_count as f64 / PARAGRAPH_LENGTH_DIVISOR)
                    .min(PARAGRAPH_LENGTH_CAP)
                - PARAGRAPH_EXISTING_LINK_PENALTY * paragraph.existing_link_count as f64;

            if let Some((offset, len)) = occurrence {
                if self.spacing_ok(document, offset, link_positions) {
                    strict.push(SlotCandidate {
                        paragraph_index: j,
                        offset,
                        keyword_len: Some(len),
                        score: base_score,
                    });
                    continue;
                }
                blocked_by_spacing = true;
            }

            let midpoint = midpoint_offset(paragraph);
            if self.spacing_ok(document, midpoint, link_positions) {
                relaxed.push(SlotCandidate {
                    paragraph_index: j,
                    offset: midpoint,
                    keyword_len: None,
                    score: base_score,
                });
            } else {
                blocked_by_spacing = true;
            }
        }

        let pool = if !strict.is_empty() { strict } else { relaxed };
        pool.into_iter()
            .max_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(b.paragraph_index.cmp(&a.paragraph_index))
            })
            .ok_or_else(|| {
                if blocked_by_spacing {
                    "spacing constraint blocks every eligible paragraph".to_string()
                } else {
                    "no paragraph with remaining link capacity".to_string()
                }
            })
    }

    fn spacing_ok(&self, document: &str, offset: usize, link_positions: &[usize]) -> bool {
        if !self.options.avoid_link_clusters {
            return true;
        }
        let pos = word_index(document, offset);
        link_positions.iter().all(|&other| {
            pos.abs_diff(other) >= self.options.min_distance_between_links_words
        })
    }

    // * Phase 4: apply insertions in descending offset order so earlier
    // * offsets stay valid, then compute metrics and score.
    fn finish(
        &self,
        document: &str,
        sections: &[Section],
        mut planned: Vec<PlannedInsertion>,
        skipped: Vec<SkippedLink>,
        link_positions: &[usize],
        candidates_supplied: usize,
    ) -> DistributionResult {
        planned.sort_by(|a, b| {
            b.decision
                .character_offset
                .cmp(&a.decision.character_offset)
        });

        let mut content = document.to_string();
        for insertion in &planned {
            let offset = insertion.decision.character_offset;
            let link = &insertion.decision.link;
            match insertion.kind {
                InsertKind::WrapKeyword(len) => {
                    content.insert_str(offset + len, &format!("]({})", link.target_url));
                    content.insert_str(offset, "[");
                }
                InsertKind::InsertAnchor => {
                    content.insert_str(
                        offset,
                        &format!(" [{}]({})", link.keyword, link.target_url),
                    );
                }
            }
        }

        // * Back to document order for the caller
        planned.sort_by(|a, b| {
            a.decision
                .character_offset
                .cmp(&b.decision.character_offset)
        });
        let placed: Vec<PlacementDecision> =
            planned.into_iter().map(|p| p.decision).collect();

        let metrics = self.compute_metrics(document, sections, &placed, link_positions);
        let (distribution_score, recommendations) = score_and_recommend(
            &metrics,
            &self.options,
            sections.len(),
            candidates_supplied,
            skipped.len(),
        );

        DistributionResult {
            content,
            placed,
            skipped,
            metrics,
            distribution_score,
            recommendations,
        }
    }

    fn compute_metrics(
        &self,
        document: &str,
        sections: &[Section],
        placed: &[PlacementDecision],
        link_positions: &[usize],
    ) -> DistributionMetrics {
        let total_words = document.unicode_words().count();

        let existing_inline: usize = sections
            .iter()
            .flat_map(|s| s.paragraphs.iter())
            .map(|p| p.existing_link_count)
            .sum();
        let total_links = existing_inline + placed.len();

        let link_density = if total_words > 0 {
            total_links as f64 * 100.0 / total_words as f64
        } else {
            0.0
        };

        let mut positions: Vec<usize> = link_positions.to_vec();
        positions.sort_unstable();
        let average_link_distance_words = if positions.len() >= 2 {
            let gaps: Vec<usize> = positions.windows(2).map(|w| w[1] - w[0]).collect();
            Some(gaps.iter().sum::<usize>() as f64 / gaps.len() as f64)
        } else {
            None
        };

        let placed_sections: HashSet<usize> = placed.iter().map(|d| d.section_index).collect();
        let sections_with_links = sections
            .iter()
            .enumerate()
            .filter(|(i, s)| {
                placed_sections.contains(i)
                    || s.paragraphs.iter().any(|p| p.existing_link_count > 0)
            })
            .count();

        let placed_paragraphs: HashSet<(usize, usize)> = placed
            .iter()
            .map(|d| (d.section_index, d.paragraph_index))
            .collect();
        let paragraphs_with_links = sections
            .iter()
            .enumerate()
            .flat_map(|(i, s)| {
                s.paragraphs
                    .iter()
                    .enumerate()
                    .map(move |(j, p)| ((i, j), p.existing_link_count))
            })
            .filter(|(key, existing)| *existing > 0 || placed_paragraphs.contains(key))
            .count();

        let mut anchor_class_histogram: BTreeMap<String, usize> = BTreeMap::new();
        for decision in placed {
            *anchor_class_histogram
                .entry(decision.link.anchor_text_class.as_str().to_string())
                .or_insert(0) += 1;
        }

        DistributionMetrics {
            total_words,
            total_links,
            links_placed: placed.len(),
            link_density,
            average_link_distance_words,
            sections_with_links,
            paragraphs_with_links,
            anchor_class_histogram,
        }
    }
}

fn section_label(section: &Section, index: usize) -> String {
    match &section.title {
        Some(title) => format!("'{title}'"),
        None => format!("#{index}"),
    }
}

// * Case-insensitive literal matcher for the keyword; byte offsets stay
// * valid in the original document.
fn keyword_regex(keyword: &str) -> Option<Regex> {
    let trimmed = keyword.trim();
    if trimmed.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(trimmed))
        .case_insensitive(true)
        .build()
        .ok()
}

// * First keyword occurrence whose document range is not already claimed.
fn first_free_occurrence(
    keyword_re: &Regex,
    paragraph: &crate::content::Paragraph,
    occupied: &[(usize, usize)],
) -> Option<(usize, usize)> {
    keyword_re.find_iter(&paragraph.text).find_map(|m| {
        let start = paragraph.start_offset + m.start();
        let end = paragraph.start_offset + m.end();
        let free = occupied.iter().all(|&(s, e)| end <= s || e <= start);
        free.then_some((start, m.len()))
    })
}

// * Midpoint insertion lands on the next whitespace past the middle, or the
// * last char boundary when none exists; never past the paragraph end.
fn midpoint_offset(paragraph: &crate::content::Paragraph) -> usize {
    let text = &paragraph.text;
    let mut mid = text.len() / 2;
    while mid > 0 && !text.is_char_boundary(mid) {
        mid -= 1;
    }
    match text[mid..].find(char::is_whitespace) {
        Some(ws) => paragraph.start_offset + mid + ws,
        None => {
            let last = text.char_indices().next_back().map(|(i, _)| i).unwrap_or(0);
            paragraph.start_offset + last
        }
    }
}

fn word_index(document: &str, offset: usize) -> usize {
    let mut boundary = offset.min(document.len());
    while boundary > 0 && !document.is_char_boundary(boundary) {
        boundary -= 1;
    }
    document[..boundary].unicode_words().count()
}
