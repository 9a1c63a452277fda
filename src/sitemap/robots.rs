// * Robots Advisor
// * Advisory robots.txt handling for the sitemap crawl: Allow/Disallow
// * matching for the probing user-agent plus Crawl-Delay extraction. A
// * disallowed sitemap produces a warning, never a hard failure.

use robotstxt::DefaultMatcher;

const DEFAULT_CRAWL_DELAY_MS: u64 = 1_000;

pub struct RobotsAdvisor {
    user_agent: String,
}

impl RobotsAdvisor {
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
        }
    }

    // * Checks whether a URL is allowed for the configured user-agent.
    pub fn is_allowed(&self, robots_txt: &str, url: &str) -> bool {
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(robots_txt, &self.user_agent, url)
    }

    // * Extracts Crawl-Delay (ms) for the configured user-agent.
    // * The robotstxt crate focuses on Allow/Disallow, so this is manual.
    pub fn crawl_delay_ms(&self, robots_txt: &str) -> u64 {
        let mut in_matching_agent_block = false;
        let mut found_delay: Option<u64> = None;

        for line in robots_txt.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let lowercase_line = line.to_lowercase();

            if lowercase_line.starts_with("user-agent:") {
                let agent = line[11..].trim();
                in_matching_agent_block =
                    agent == "*" || self.user_agent.to_lowercase().contains(&agent.to_lowercase());
            }

            if in_matching_agent_block && lowercase_line.starts_with("crawl-delay:") {
                if let Some(delay_str) = line.split(':').nth(1) {
                    if let Ok(delay) = delay_str.trim().parse::<f64>() {
                        // * Seconds to milliseconds
                        found_delay = Some((delay * 1000.0) as u64);
                    }
                }
            }
        }

        found_delay.unwrap_or(DEFAULT_CRAWL_DELAY_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_crawl_delay() {
        let advisor = RobotsAdvisor::new("Linkweave/0.1");
        let robots_txt = "User-agent: *\nCrawl-delay: 2\nDisallow: /private/\n";
        assert_eq!(advisor.crawl_delay_ms(robots_txt), 2000);
    }

    #[test]
    fn test_default_delay_when_absent() {
        let advisor = RobotsAdvisor::new("Linkweave/0.1");
        let robots_txt = "User-agent: *\nDisallow: /admin/\n";
        assert_eq!(advisor.crawl_delay_ms(robots_txt), DEFAULT_CRAWL_DELAY_MS);
    }

    #[test]
    fn test_allow_disallow_matching() {
        let advisor = RobotsAdvisor::new("Linkweave/0.1");
        let robots_txt = "User-agent: *\nDisallow: /private/\nAllow: /public/\n";
        assert!(advisor.is_allowed(robots_txt, "https://example.com/public/page.html"));
        assert!(!advisor.is_allowed(robots_txt, "https://example.com/private/secret.html"));
    }
}
