// * Distribution Scoring
// * Aggregates placement metrics into a 0-100 distribution score plus
// * recommendations derived from the same penalty signals. The weights are
// * heuristics; tests pin the behavior rather than derive it.

use crate::config::constants::{
    BREADTH_BONUS, BREADTH_BONUS_MIN_PARAGRAPHS, DENSITY_DEVIATION_PENALTY_CAP,
    DENSITY_DEVIATION_PENALTY_PER_UNIT, DIVERSITY_BONUS_MIN_CLASSES, SECTION_SPREAD_PENALTY,
    SPACING_PENALTY,
};
use crate::placement::planner::{PlacementDecision, PlacementOptions, SkippedLink};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DistributionMetrics {
    pub total_words: usize,
    // * Existing inline links plus newly placed ones
    pub total_links: usize,
    pub links_placed: usize,
    // * Links per 100 words
    pub link_density: f64,
    pub average_link_distance_words: Option<f64>,
    pub sections_with_links: usize,
    pub paragraphs_with_links: usize,
    pub anchor_class_histogram: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct DistributionResult {
    pub content: String,
    pub placed: Vec<PlacementDecision>,
    pub skipped: Vec<SkippedLink>,
    pub metrics: DistributionMetrics,
    pub distribution_score: f64,
    pub recommendations: Vec<String>,
}

// * 100 minus penalties (density deviation, poor section spread, crowding)
// * plus small breadth bonuses, clamped to [0, 100].
pub(crate) fn score_and_recommend(
    metrics: &DistributionMetrics,
    options: &PlacementOptions,
    total_sections: usize,
    candidates_supplied: usize,
    skipped_count: usize,
) -> (f64, Vec<String>) {
    let mut score = 100.0;
    let mut recommendations = Vec::new();

    // * Density deviation from the preferred target
    let deviation = (metrics.link_density - options.preferred_link_density_per_100_words).abs();
    let density_penalty =
        (deviation * DENSITY_DEVIATION_PENALTY_PER_UNIT).min(DENSITY_DEVIATION_PENALTY_CAP);
    score -= density_penalty;

    if metrics.link_density > options.preferred_link_density_per_100_words + 0.5 {
        recommendations.push(format!(
            "Link density is {:.1} per 100 words against a target of {:.1}; remove or spread out links",
            metrics.link_density, options.preferred_link_density_per_100_words
        ));
    } else if metrics.total_words > 0
        && metrics.link_density < options.preferred_link_density_per_100_words * 0.5
    {
        recommendations.push(format!(
            "Link density is {:.1} per 100 words against a target of {:.1}; there is room for more internal links",
            metrics.link_density, options.preferred_link_density_per_100_words
        ));
    }

    // * Section spread: links concentrated in too few sections
    let spread_target = total_sections.min(metrics.total_links.max(1));
    if metrics.total_links >= 2 && metrics.sections_with_links * 2 < spread_target {
        score -= SECTION_SPREAD_PENALTY;
    }
    if candidates_supplied >= 2 && metrics.sections_with_links <= 1 {
        recommendations
            .push("Distribute links more evenly across the document's sections".to_string());
    }

    // * Under-spacing between consecutive links
    if let Some(avg) = metrics.average_link_distance_words {
        if metrics.total_links >= 2 && avg < options.min_distance_between_links_words as f64 {
            score -= SPACING_PENALTY;
            recommendations.push(format!(
                "Average spacing between links is {:.0} words; aim for at least {}",
                avg, options.min_distance_between_links_words
            ));
        }
    }

    // * Breadth bonuses
    if metrics.paragraphs_with_links >= BREADTH_BONUS_MIN_PARAGRAPHS {
        score += BREADTH_BONUS;
    }
    if metrics.anchor_class_histogram.len() >= DIVERSITY_BONUS_MIN_CLASSES {
        score += BREADTH_BONUS;
    }

    if skipped_count > 0 {
        recommendations.push(format!(
            "{skipped_count} candidate link(s) could not be placed; review the skip reasons"
        ));
    }

    ((score.clamp(0.0, 100.0) * 10.0).round() / 10.0, recommendations)
}
