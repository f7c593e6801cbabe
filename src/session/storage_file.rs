//! On-disk format of a saved browser session
//!
//! ```json
//! {
//!   "cookies": [{"name": "sid", "value": "abc", "domain": ".example.com", "path": "/"}],
//!   "origins": [
//!     {"origin": "https://www.example.com",
//!      "localStorage": [{"name": "token", "value": "xyz"}]}
//!   ]
//! }
//! ```

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct StorageFile {
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
    #[serde(default)]
    pub origins: Vec<OriginEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OriginEntry {
    /// Entries without an origin apply to any site
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(rename = "localStorage", default)]
    pub local_storage: Vec<StorageItem>,
}

#[derive(Debug, Deserialize)]
pub struct StorageItem {
    pub name: String,
    pub value: String,
}

impl StoredCookie {
    /// Returns true if the cookie would be sent to `host`
    pub fn matches_host(&self, host: &str) -> bool {
        match self.domain.as_deref().map(|d| d.trim_start_matches('.')) {
            None | Some("") => true,
            Some(domain) => {
                host.eq_ignore_ascii_case(domain)
                    || host
                        .to_ascii_lowercase()
                        .ends_with(&format!(".{}", domain.to_ascii_lowercase()))
            }
        }
    }
}

impl OriginEntry {
    pub fn matches_origin(&self, origin: &str) -> bool {
        match &self.origin {
            None => true,
            Some(entry) => entry.trim_end_matches('/').eq_ignore_ascii_case(origin),
        }
    }
}
