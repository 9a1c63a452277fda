// * Content Structure Parser
// * Pure transformation of a markdown/plain-text document into sections
// * (heading boundaries) and paragraphs (blank-line boundaries), annotated
// * with word counts, existing links, and residual link capacity. All
// * offsets are byte offsets into the original document.

use crate::config::constants::{
    IMPORTANCE_LENGTH_SATURATION_WORDS, IMPORTANCE_LENGTH_WEIGHT, IMPORTANCE_POSITION_WEIGHT,
    IMPORTANCE_TITLE_BONUS, WORDS_PER_LINK,
};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+(.+)$").unwrap());
static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]\([^)]*\)").unwrap());
static HTML_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<a\s[^>]*href").unwrap());

// * Title words that mark structurally important sections
const IMPORTANT_TITLE_WORDS: &[&str] = &["introduction", "overview", "key", "summary", "essential"];

#[derive(Debug, Clone, Serialize)]
pub struct Paragraph {
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub word_count: usize,
    pub existing_link_count: usize,
    // * max(0, word_count / words_per_link - existing_link_count)
    pub link_capacity: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub title: Option<String>,
    pub start_offset: usize,
    pub end_offset: usize,
    pub importance: f64,
    pub paragraphs: Vec<Paragraph>,
}

impl Section {
    pub fn word_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.word_count).sum()
    }

    pub fn link_capacity(&self) -> usize {
        self.paragraphs.iter().map(|p| p.link_capacity).sum()
    }
}

#[derive(Debug, Clone)]
pub struct StructureConfig {
    pub words_per_link: usize,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            words_per_link: WORDS_PER_LINK,
        }
    }
}

pub fn parse_structure(document: &str) -> Vec<Section> {
    parse_structure_with(document, &StructureConfig::default())
}

pub fn parse_structure_with(document: &str, config: &StructureConfig) -> Vec<Section> {
    // * (section start, body start, body end, title)
    let mut bounds: Vec<(usize, usize, usize, Option<String>)> = Vec::new();

    let headings: Vec<(usize, usize, String)> = HEADING_RE
        .captures_iter(document)
        .map(|cap| {
            let whole = cap.get(0).expect("capture group 0 always present");
            let title = cap.get(1).map(|m| m.as_str().trim().to_string());
            (whole.start(), whole.end(), title.unwrap_or_default())
        })
        .collect();

    if headings.is_empty() {
        // * No headings: the whole document is one untitled section
        bounds.push((0, 0, document.len(), None));
    } else {
        // * Untitled preamble before the first heading, when non-blank
        let first_start = headings[0].0;
        if document[..first_start].trim().len() > 0 {
            bounds.push((0, 0, first_start, None));
        }

        for (i, (start, heading_end, title)) in headings.iter().enumerate() {
            let section_end = headings
                .get(i + 1)
                .map(|next| next.0)
                .unwrap_or(document.len());
            bounds.push((*start, *heading_end, section_end, Some(title.clone())));
        }
    }

    let total = bounds.len();
    bounds
        .into_iter()
        .enumerate()
        .map(|(index, (start, body_start, end, title))| {
            let paragraphs = split_paragraphs(document, body_start, end, config);
            let importance = section_importance(index, total, title.as_deref(), &paragraphs);
            Section {
                title,
                start_offset: start,
                end_offset: end,
                importance,
                paragraphs,
            }
        })
        .collect()
}

// * Paragraphs are runs of non-blank lines; offsets index into `document`.
fn split_paragraphs(
    document: &str,
    start: usize,
    end: usize,
    config: &StructureConfig,
) -> Vec<Paragraph> {
    let body = &document[start..end];
    let mut paragraphs = Vec::new();

    let mut cursor = 0usize;
    let mut para_start: Option<usize> = None;
    let mut para_end = 0usize;

    for line in body.split_inclusive('\n') {
        let line_start = cursor;
        cursor += line.len();

        if line.trim().is_empty() {
            if let Some(s) = para_start.take() {
                push_paragraph(document, start + s, start + para_end, config, &mut paragraphs);
            }
        } else {
            if para_start.is_none() {
                para_start = Some(line_start);
            }
            para_end = line_start + line.trim_end().len();
        }
    }

    if let Some(s) = para_start {
        push_paragraph(document, start + s, start + para_end, config, &mut paragraphs);
    }

    paragraphs
}

fn push_paragraph(
    document: &str,
    start: usize,
    end: usize,
    config: &StructureConfig,
    out: &mut Vec<Paragraph>,
) {
    let text = &document[start..end];
    if text.trim().is_empty() {
        return;
    }

    let word_count = text.unicode_words().count();
    let existing_link_count =
        MARKDOWN_LINK_RE.find_iter(text).count() + HTML_ANCHOR_RE.find_iter(text).count();
    let divisor = config.words_per_link.max(1);
    let link_capacity = (word_count / divisor).saturating_sub(existing_link_count);

    out.push(Paragraph {
        text: text.to_string(),
        start_offset: start,
        end_offset: end,
        word_count,
        existing_link_count,
        link_capacity,
    });
}

// * Earlier position scores higher, longer sections score higher, and
// * important-sounding titles get a bonus. Capped at 1.0.
fn section_importance(
    index: usize,
    total: usize,
    title: Option<&str>,
    paragraphs: &[Paragraph],
) -> f64 {
    let position = if total <= 1 {
        1.0
    } else {
        1.0 - index as f64 / total as f64
    };

    let words: usize = paragraphs.iter().map(|p| p.word_count).sum();
    let length = (words as f64 / IMPORTANCE_LENGTH_SATURATION_WORDS as f64).min(1.0);

    let title_bonus = title
        .map(|t| {
            let lower = t.to_lowercase();
            IMPORTANT_TITLE_WORDS.iter().any(|w| lower.contains(w))
        })
        .unwrap_or(false);

    let mut importance = position * IMPORTANCE_POSITION_WEIGHT + length * IMPORTANCE_LENGTH_WEIGHT;
    if title_bonus {
        importance += IMPORTANCE_TITLE_BONUS;
    }

    importance.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_headings_single_section() {
        let doc = "Just a plain paragraph.\n\nAnd another one.";
        let sections = parse_structure(doc);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].title.is_none());
        assert_eq!(sections[0].paragraphs.len(), 2);
    }

    #[test]
    fn test_heading_boundaries() {
        let doc = "# Introduction\n\nFirst body.\n\n## Details\n\nSecond body.\n";
        let sections = parse_structure(doc);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title.as_deref(), Some("Introduction"));
        assert_eq!(sections[1].title.as_deref(), Some("Details"));
        assert_eq!(sections[0].paragraphs.len(), 1);
        assert_eq!(sections[0].paragraphs[0].text, "First body.");
    }

    #[test]
    fn test_preamble_before_first_heading() {
        let doc = "Lead-in text.\n\n# Section One\n\nBody.";
        let sections = parse_structure(doc);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].title.is_none());
    }

    #[test]
    fn test_offsets_index_into_document() {
        let doc = "# Title\n\nalpha beta gamma.\n\ndelta epsilon.";
        let sections = parse_structure(doc);
        for section in &sections {
            for p in &section.paragraphs {
                assert_eq!(&doc[p.start_offset..p.end_offset], p.text);
            }
        }
    }

    #[test]
    fn test_link_capacity_formula() {
        // * 60 words, one existing link: 60/50 = 1 capacity, minus 1 link = 0
        let words = vec!["word"; 59].join(" ");
        let doc = format!("{words} [anchor](https://example.com)");
        let sections = parse_structure(&doc);
        let p = &sections[0].paragraphs[0];
        assert_eq!(p.existing_link_count, 1);
        assert_eq!(p.link_capacity, 0);
    }

    #[test]
    fn test_capacity_never_negative() {
        let doc = "[a](x) [b](y) [c](z) short";
        let sections = parse_structure(doc);
        assert_eq!(sections[0].paragraphs[0].link_capacity, 0);
    }

    #[test]
    fn test_html_anchors_counted() {
        let doc = r#"Some text with <a href="https://example.com">a link</a> inside."#;
        let sections = parse_structure(doc);
        assert_eq!(sections[0].paragraphs[0].existing_link_count, 1);
    }

    #[test]
    fn test_importance_favors_early_sections() {
        let doc = "# One\n\nbody body body\n\n# Two\n\nbody body body\n\n# Three\n\nbody body body";
        let sections = parse_structure(doc);
        assert!(sections[0].importance > sections[2].importance);
    }

    #[test]
    fn test_importance_title_bonus() {
        let doc = "# Alpha\n\nsame words here\n\n# Random\n\nsame words here\n\n# Key Takeaways\n\nsame words here";
        let sections = parse_structure(doc);
        // * The title bonus (0.2) outweighs one adjacent-position step
        // * (0.5 / 3), so "Key Takeaways" outranks the earlier plain section.
        assert!(sections[2].importance > sections[1].importance);
    }

    #[test]
    fn test_importance_capped_at_one() {
        let words = vec!["word"; 1000].join(" ");
        let doc = format!("# Key Overview Introduction\n\n{words}");
        let sections = parse_structure(&doc);
        assert!(sections[0].importance <= 1.0);
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_structure("")[0].paragraphs.is_empty());
    }
}
