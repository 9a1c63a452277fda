use linkweave::placement::{
    AnchorTextClass, CandidateLink, ExistingLink, LinkPlacementPlanner, PlacementOptions,
};

fn candidate(keyword: &str, url: &str, priority: u32) -> CandidateLink {
    CandidateLink {
        keyword: keyword.to_string(),
        target_url: url.to_string(),
        priority,
        anchor_text_class: AnchorTextClass::Exact,
        target_section: None,
    }
}

fn article() -> String {
    let filler = |n: usize, tag: &str| -> String {
        (0..n).map(|i| format!("{tag}{i} ")).collect()
    };
    format!(
        "# Introduction\n\nThis guide covers analytics and reporting in depth. {}\n\n\
         # Setup\n\nInstall the analytics agent before configuring dashboards. {}\n\n\
         # Reporting\n\nDashboards summarize reporting output for stakeholders. {}\n",
        filler(120, "intro"),
        filler(120, "setup"),
        filler(120, "rep")
    )
}

#[test]
fn test_plan_places_in_keyword_bearing_sections() {
    let doc = article();
    let planner = LinkPlacementPlanner::new(PlacementOptions {
        min_distance_between_links_words: 20,
        ..PlacementOptions::default()
    });

    let candidates = vec![
        candidate("analytics", "https://example.com/analytics", 8),
        candidate("reporting", "https://example.com/reporting", 5),
    ];
    let result = planner.plan(&doc, &candidates, &[], &[]);

    assert_eq!(result.placed.len(), 2);
    assert!(result.content.contains("[analytics](https://example.com/analytics)"));
    assert!(result.content.contains("](https://example.com/reporting)"));
    assert!(result.content.len() > doc.len());
}

#[test]
fn test_rewritten_content_keeps_unlinked_text() {
    let doc = article();
    let planner = LinkPlacementPlanner::with_defaults();
    let result = planner.plan(
        &doc,
        &[candidate("analytics", "https://example.com/a", 5)],
        &[],
        &[],
    );

    // * Insertion only ever adds markup
    assert!(result.content.contains("# Introduction"));
    assert!(result.content.contains("# Reporting"));
    assert!(result.content.len() >= doc.len());
}

#[test]
fn test_offsets_match_original_document() {
    let doc = article();
    let planner = LinkPlacementPlanner::with_defaults();
    let result = planner.plan(
        &doc,
        &[candidate("analytics", "https://example.com/a", 5)],
        &[],
        &[],
    );

    for decision in &result.placed {
        let start = decision.character_offset;
        let end = start + decision.link.keyword.len();
        assert!(doc.is_char_boundary(start));
        assert!(doc[start..end].eq_ignore_ascii_case(&decision.link.keyword));
    }
}

#[test]
fn test_page_budget_prefers_high_priority() {
    let doc = article();
    let planner = LinkPlacementPlanner::new(PlacementOptions {
        max_links_per_page: 1,
        min_distance_between_links_words: 20,
        ..PlacementOptions::default()
    });

    let result = planner.plan(
        &doc,
        &[
            candidate("analytics", "https://example.com/a", 2),
            candidate("reporting", "https://example.com/r", 9),
        ],
        &[],
        &[],
    );

    assert_eq!(result.placed.len(), 1);
    assert_eq!(result.placed[0].link.keyword, "reporting");
    assert_eq!(result.skipped.len(), 1);
}

#[test]
fn test_existing_links_enforce_spacing() {
    let mut words: Vec<String> = (0..120).map(|i| format!("w{i}")).collect();
    words[55] = "analytics".to_string();
    let doc = words.join(" ");
    let anchor_offset = doc.find("w50").unwrap();

    let planner = LinkPlacementPlanner::with_defaults();
    let result = planner.plan(
        &doc,
        &[candidate("analytics", "https://example.com/a", 5)],
        &[ExistingLink {
            url: "https://example.com/already".to_string(),
            offset: anchor_offset,
        }],
        &[],
    );

    assert!(result.placed.is_empty());
    assert!(result.skipped[0].reason.contains("spacing"));
}

#[test]
fn test_metrics_reflect_placements() {
    let doc = article();
    let planner = LinkPlacementPlanner::new(PlacementOptions {
        min_distance_between_links_words: 20,
        ..PlacementOptions::default()
    });
    let result = planner.plan(
        &doc,
        &[
            candidate("analytics", "https://example.com/a", 8),
            candidate("reporting", "https://example.com/r", 5),
        ],
        &[],
        &[],
    );

    assert_eq!(result.metrics.links_placed, result.placed.len());
    assert!(result.metrics.total_words > 200);
    assert!(result.metrics.sections_with_links >= 1);
    assert!(result.metrics.link_density > 0.0);
    assert!((0.0..=100.0).contains(&result.distribution_score));
    assert_eq!(
        result.metrics.anchor_class_histogram.get("exact"),
        Some(&result.placed.len())
    );
}

#[test]
fn test_no_candidates_is_a_noop() {
    let doc = article();
    let planner = LinkPlacementPlanner::with_defaults();
    let result = planner.plan(&doc, &[], &[], &[]);

    assert_eq!(result.content, doc);
    assert!(result.placed.is_empty());
    assert!(result.skipped.is_empty());
}
