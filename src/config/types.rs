use serde::Deserialize;

/// Main configuration structure for Catalog-Crawler
///
/// Every section falls back to its defaults, so an empty file (or no file at
/// all) describes a valid crawl of the default site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub selectors: SelectorConfig,
    pub timing: TimingConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub session: SessionConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Home page of the crawl; relative links resolve against it
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.oscaro.com".to_string(),
        }
    }
}

/// CSS selectors used at each level of the tree
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Category links on the home page
    pub category: String,

    /// Sub-category links on a category page
    pub subcategory: String,

    /// Product links on a sub-category page
    pub product: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            category: "div.category-item-header h2 a".to_string(),
            subcategory: "div.category-item-header h2 a".to_string(),
            product: "div.link-list-column ul.link-list.link-primary li a".to_string(),
        }
    }
}

/// Navigation timing (all values in milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Upper bound on a single page load
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// How long to keep polling the home page for its category list
    #[serde(rename = "home-settle-timeout-ms")]
    pub home_settle_timeout_ms: u64,

    /// How long to keep polling any other page for its expected selector
    #[serde(rename = "settle-timeout-ms")]
    pub settle_timeout_ms: u64,

    /// Delay between two readiness polls of the same page
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Minimum time between two navigations, across all contexts
    #[serde(rename = "min-request-interval-ms")]
    pub min_request_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 30_000,
            home_settle_timeout_ms: 30_000,
            settle_timeout_ms: 5_000,
            poll_interval_ms: 500,
            min_request_interval_ms: 1_000,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of category branches walked at once, each with its own context
    #[serde(rename = "max-branch-concurrency")]
    pub max_branch_concurrency: u32,

    /// Products value recorded for a sub-category with no products
    #[serde(rename = "empty-products-label")]
    pub empty_products_label: String,

    /// List the tree without fetching sub-category pages
    #[serde(rename = "dry-run")]
    pub dry_run: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_branch_concurrency: 1,
            empty_products_label: "no product found".to_string(),
            dry_run: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "catalog-crawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV file of crawl records
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Optional path to a markdown run summary
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "categories.csv".to_string(),
            summary_path: None,
        }
    }
}

/// Session state configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path to the persisted browser storage state
    #[serde(rename = "auth-path")]
    pub auth_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auth_path: "auth.json".to_string(),
        }
    }
}
