//! Page fetcher
//!
//! This module handles every navigation the crawler makes:
//! - Pacing navigations through the shared `Pacer`
//! - Bounding each page load with the navigation timeout
//! - Polling for the expected selector until the page has settled
//!
//! # Readiness
//!
//! Target pages may not list their links on the first load. Instead of a
//! fixed sleep, the fetcher reloads until the selector the caller is about
//! to extract matches, bounded by the settle timeout:
//!
//! | Condition | Result |
//! |-----------|--------|
//! | Selector matches | `Ok(document)` |
//! | Settle timeout reached | `Ok(last document)`, extraction will be empty |
//! | A readiness reload fails | `Ok(last document)` |
//! | First load exceeds navigation timeout | `Err(FetchError::Timeout)` |
//! | First load hits a network / HTTP error | `Err(FetchError)` carrying the URL |

use crate::config::TimingConfig;
use crate::crawler::context::BrowsingContext;
use crate::crawler::parser::{has_match, Document};
use crate::crawler::scheduler::Pacer;
use crate::{FetchError, FetchResult};
use scraper::Selector;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use url::Url;

/// Navigation timing, resolved to durations
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings {
    pub navigation_timeout: Duration,
    pub home_settle_timeout: Duration,
    pub settle_timeout: Duration,
    pub poll_interval: Duration,
}

impl From<&TimingConfig> for FetchSettings {
    fn from(config: &TimingConfig) -> Self {
        Self {
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            home_settle_timeout: Duration::from_millis(config.home_settle_timeout_ms),
            settle_timeout: Duration::from_millis(config.settle_timeout_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

/// Owns one browsing context and navigates it
pub struct PageFetcher<C> {
    context: C,
    settings: FetchSettings,
    pacer: Pacer,
    navigations: u64,
}

impl<C: BrowsingContext> PageFetcher<C> {
    pub fn new(context: C, settings: FetchSettings, pacer: Pacer) -> Self {
        Self {
            context,
            settings,
            pacer,
            navigations: 0,
        }
    }

    /// First navigation of a crawl, allowed the longer home settle timeout
    pub async fn open(&mut self, url: &str, ready: &Selector) -> FetchResult<Document> {
        let settle = self.settings.home_settle_timeout;
        self.navigate_with(url, ready, settle).await
    }

    /// Navigates to `url` and waits for `ready` to match
    pub async fn navigate(&mut self, url: &str, ready: &Selector) -> FetchResult<Document> {
        let settle = self.settings.settle_timeout;
        self.navigate_with(url, ready, settle).await
    }

    /// Number of page loads issued so far, readiness reloads included
    pub fn navigations(&self) -> u64 {
        self.navigations
    }

    async fn navigate_with(
        &mut self,
        url: &str,
        ready: &Selector,
        settle_timeout: Duration,
    ) -> FetchResult<Document> {
        let target = parse_target(url)?;
        let deadline = Instant::now() + settle_timeout;

        // Only the first load can fail the navigation; once a page has been
        // fetched, a failed reload falls back to it.
        let mut document = self.load_once(&target).await?;
        let mut polls = 1u32;

        loop {
            if has_match(&document, ready) {
                tracing::debug!("{} ready after {} load(s)", target, polls);
                return Ok(document);
            }

            if Instant::now() + self.settings.poll_interval > deadline {
                tracing::debug!(
                    "{} did not settle within {:?} ({} load(s)), using last load",
                    target,
                    settle_timeout,
                    polls
                );
                return Ok(document);
            }

            sleep(self.settings.poll_interval).await;

            match self.load_once(&target).await {
                Ok(reloaded) => {
                    document = reloaded;
                    polls += 1;
                }
                Err(e) => {
                    tracing::debug!("Reload failed ({}), using last load of {}", e, target);
                    return Ok(document);
                }
            }
        }
    }

    async fn load_once(&mut self, target: &Url) -> FetchResult<Document> {
        self.pacer.wait_turn().await;
        self.navigations += 1;
        tracing::debug!("Navigating to {}", target);

        match timeout(self.settings.navigation_timeout, self.context.load(target)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: target.to_string(),
            }),
        }
    }
}

fn parse_target(url: &str) -> FetchResult<Url> {
    if url.is_empty() {
        return Err(FetchError::InvalidUrl {
            url: String::new(),
            message: "element has no link".to_string(),
        });
    }

    Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves a scripted sequence of bodies, then repeats the last one
    struct ScriptedContext {
        bodies: Mutex<VecDeque<&'static str>>,
        delay: Duration,
    }

    impl ScriptedContext {
        fn new(bodies: &[&'static str]) -> Self {
            Self {
                bodies: Mutex::new(bodies.iter().copied().collect()),
                delay: Duration::ZERO,
            }
        }
    }

    impl BrowsingContext for ScriptedContext {
        async fn load(&self, url: &Url) -> FetchResult<Document> {
            let body = {
                let mut bodies = self.bodies.lock().unwrap();
                if bodies.len() > 1 {
                    bodies.pop_front().unwrap()
                } else {
                    bodies[0]
                }
            };
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            Ok(Document::new(url.clone(), body))
        }
    }

    /// Serves one page, then fails every later load with HTTP 503
    struct FailsAfterFirst {
        loads: AtomicUsize,
    }

    impl BrowsingContext for FailsAfterFirst {
        async fn load(&self, url: &Url) -> FetchResult<Document> {
            if self.loads.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(Document::new(url.clone(), EMPTY))
            } else {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 503,
                })
            }
        }
    }

    fn settings(settle_ms: u64) -> FetchSettings {
        FetchSettings {
            navigation_timeout: Duration::from_millis(200),
            home_settle_timeout: Duration::from_millis(settle_ms),
            settle_timeout: Duration::from_millis(settle_ms),
            poll_interval: Duration::from_millis(10),
        }
    }

    fn ready() -> Selector {
        Selector::parse("ul.products a").unwrap()
    }

    const EMPTY: &str = "<html><body><p>loading</p></body></html>";
    const LOADED: &str = r#"<ul class="products"><li><a href="/p">P</a></li></ul>"#;

    #[tokio::test]
    async fn test_ready_on_first_load() {
        let mut fetcher =
            PageFetcher::new(ScriptedContext::new(&[LOADED]), settings(500), Pacer::unlimited());
        let document = fetcher.navigate("https://shop.example.com/x", &ready()).await.unwrap();
        assert!(has_match(&document, &ready()));
        assert_eq!(fetcher.navigations(), 1);
    }

    #[tokio::test]
    async fn test_polls_until_selector_appears() {
        let context = ScriptedContext::new(&[EMPTY, EMPTY, LOADED]);
        let mut fetcher = PageFetcher::new(context, settings(1_000), Pacer::unlimited());
        let document = fetcher.navigate("https://shop.example.com/x", &ready()).await.unwrap();
        assert!(has_match(&document, &ready()));
        assert_eq!(fetcher.navigations(), 3);
    }

    #[tokio::test]
    async fn test_settle_timeout_returns_last_document() {
        let mut fetcher =
            PageFetcher::new(ScriptedContext::new(&[EMPTY]), settings(50), Pacer::unlimited());
        let document = fetcher.navigate("https://shop.example.com/x", &ready()).await.unwrap();
        assert!(!has_match(&document, &ready()));
        assert!(fetcher.navigations() >= 1);
    }

    #[tokio::test]
    async fn test_zero_settle_loads_once() {
        let mut fetcher =
            PageFetcher::new(ScriptedContext::new(&[EMPTY]), settings(0), Pacer::unlimited());
        fetcher.navigate("https://shop.example.com/x", &ready()).await.unwrap();
        assert_eq!(fetcher.navigations(), 1);
    }

    #[tokio::test]
    async fn test_navigation_timeout() {
        let mut context = ScriptedContext::new(&[LOADED]);
        context.delay = Duration::from_secs(5);
        let mut fetcher = PageFetcher::new(context, settings(0), Pacer::unlimited());

        let result = fetcher.navigate("https://shop.example.com/slow", &ready()).await;
        match result {
            Err(FetchError::Timeout { url }) => assert_eq!(url, "https://shop.example.com/slow"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_last_document() {
        let context = FailsAfterFirst {
            loads: AtomicUsize::new(0),
        };
        let mut fetcher = PageFetcher::new(context, settings(500), Pacer::unlimited());

        let document = fetcher
            .navigate("https://shop.example.com/flaky", &ready())
            .await
            .unwrap();
        assert!(!has_match(&document, &ready()));
        assert_eq!(document.url().as_str(), "https://shop.example.com/flaky");
        assert_eq!(fetcher.navigations(), 2);
    }

    #[tokio::test]
    async fn test_first_load_error_propagates() {
        let context = FailsAfterFirst {
            loads: AtomicUsize::new(1),
        };
        let mut fetcher = PageFetcher::new(context, settings(500), Pacer::unlimited());

        let result = fetcher.navigate("https://shop.example.com/down", &ready()).await;
        assert!(matches!(result, Err(FetchError::Status { status: 503, .. })));
        assert_eq!(fetcher.navigations(), 1);
    }

    #[tokio::test]
    async fn test_empty_link_is_invalid() {
        let mut fetcher =
            PageFetcher::new(ScriptedContext::new(&[LOADED]), settings(0), Pacer::unlimited());
        let result = fetcher.navigate("", &ready()).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
        assert_eq!(fetcher.navigations(), 0);
    }

    #[test]
    fn test_settings_from_timing() {
        let settings = FetchSettings::from(&TimingConfig::default());
        assert_eq!(settings.navigation_timeout, Duration::from_secs(30));
        assert_eq!(settings.settle_timeout, Duration::from_secs(5));
        assert_eq!(settings.poll_interval, Duration::from_millis(500));
    }
}
