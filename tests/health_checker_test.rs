use std::time::Duration;

use linkweave::health::{
    CheckOptions, HealthTrend, InMemoryHealthCache, LinkHealthChecker, LinkStatus,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_options() -> CheckOptions {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    CheckOptions {
        timeout: Duration::from_secs(2),
        retry_attempts: 1,
        retry_delay: Duration::from_millis(10),
        ..CheckOptions::default()
    }
}

#[tokio::test]
async fn test_mixed_statuses_classified_and_scored() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/alive"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let checker = LinkHealthChecker::new(fast_options()).unwrap();
    let urls = vec![
        format!("{}/alive", server.uri()),
        format!("{}/dead", server.uri()),
    ];
    let result = checker.check(&urls).await;

    assert_eq!(result.total_links, 2);
    assert_eq!(result.working_links, 1);
    assert_eq!(result.broken_links, 1);
    assert_eq!(result.health_score, 50.0);
    assert_eq!(result.error_frequency.get("HTTP 404"), Some(&1));

    let dead = result
        .records
        .iter()
        .find(|r| r.url.ends_with("/dead"))
        .unwrap();
    assert_eq!(dead.status, LinkStatus::Broken);
    assert!(!dead.suggestions.is_empty());
}

#[tokio::test]
async fn test_redirect_surfaces_resolved_target() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let checker = LinkHealthChecker::new(fast_options()).unwrap();
    let urls = vec![format!("{}/old", server.uri())];
    let result = checker.check(&urls).await;

    let record = &result.records[0];
    assert_eq!(record.status, LinkStatus::Redirect);
    assert_eq!(
        record.redirect_target.as_deref(),
        Some(format!("{}/new", server.uri()).as_str())
    );
    assert!(record
        .suggestions
        .iter()
        .any(|s| s.contains("point directly")));
}

#[tokio::test]
async fn test_slow_response_becomes_warning() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let checker = LinkHealthChecker::new(CheckOptions {
        slow_link_threshold_ms: 100,
        ..fast_options()
    })
    .unwrap();
    let urls = vec![format!("{}/slow", server.uri())];
    let result = checker.check(&urls).await;

    assert_eq!(result.warning_links, 1);
    assert!(result.records[0]
        .suggestions
        .iter()
        .any(|s| s.contains("Slow response")));
}

#[tokio::test]
async fn test_head_rejected_falls_back_to_get() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let checker = LinkHealthChecker::new(fast_options()).unwrap();
    let urls = vec![format!("{}/no-head", server.uri())];
    let result = checker.check(&urls).await;

    assert_eq!(result.working_links, 1);
}

#[tokio::test]
async fn test_duplicates_and_tracking_params_collapse() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let checker = LinkHealthChecker::new(fast_options()).unwrap();
    let urls = vec![
        format!("{}/page", server.uri()),
        format!("{}/page?utm_source=newsletter", server.uri()),
        format!("{}/page#section", server.uri()),
    ];
    let result = checker.check(&urls).await;

    assert_eq!(result.total_links, 1);
}

#[tokio::test]
async fn test_non_http_url_reported_unknown() {
    let checker = LinkHealthChecker::new(fast_options()).unwrap();
    let urls = vec!["mailto:team@example.com".to_string()];
    let result = checker.check(&urls).await;

    assert_eq!(result.unknown_links, 1);
    assert_eq!(result.records[0].status, LinkStatus::Unknown);
    assert!(result.records[0].status_code.is_none());
}

#[tokio::test]
async fn test_unreachable_host_classified_broken() {
    let checker = LinkHealthChecker::new(fast_options()).unwrap();
    // * Reserved TLD; never resolves
    let urls = vec!["http://no-such-host.invalid/".to_string()];
    let result = checker.check(&urls).await;

    assert_eq!(result.broken_links, 1);
    assert!(result.records[0].status_code.is_none());
}

#[tokio::test]
async fn test_monitor_reports_transition_and_trend() {
    let server = MockServer::start().await;
    // * First cycle sees a 404, every later cycle a 200
    Mock::given(method("HEAD"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let checker = LinkHealthChecker::new(fast_options()).unwrap();
    let cache = InMemoryHealthCache::default();
    let urls = vec![format!("{}/flaky", server.uri())];

    let first = checker.monitor(&urls, &cache).await;
    assert_eq!(first.new_urls.len(), 1);
    assert!(first.transitions.is_empty());

    let second = checker.monitor(&urls, &cache).await;
    assert_eq!(second.transitions.len(), 1);
    assert_eq!(second.transitions[0].previous, LinkStatus::Broken);
    assert_eq!(second.transitions[0].current, LinkStatus::Working);
    assert_eq!(second.trend, HealthTrend::Improving);
}

#[tokio::test]
async fn test_repeat_check_is_stable() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/steady"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let checker = LinkHealthChecker::new(fast_options()).unwrap();
    let cache = InMemoryHealthCache::default();
    let urls = vec![format!("{}/steady", server.uri())];

    checker.monitor(&urls, &cache).await;
    let second = checker.monitor(&urls, &cache).await;

    assert!(second.transitions.is_empty());
    assert_eq!(second.trend, HealthTrend::Stable);
}
