use crate::session::storage_file::{StorageFile, StoredCookie};
use crate::AuthError;
use reqwest::cookie::Jar;
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

/// Persisted authentication state for one site origin
///
/// Loaded once at startup and never modified afterwards. Every browsing
/// context gets a copy applied before its first navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    /// ASCII serialization of the origin, e.g. `https://www.example.com`
    pub origin: String,

    /// Storage entries, name → value
    pub entries: BTreeMap<String, String>,

    cookies: Vec<StoredCookie>,
}

impl AuthState {
    /// Builds a state from storage entries alone
    pub fn new(origin: &Url, entries: BTreeMap<String, String>) -> Self {
        Self {
            origin: origin.origin().ascii_serialization(),
            entries,
            cookies: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.cookies.is_empty()
    }

    /// Number of values this state writes into a context
    pub fn len(&self) -> usize {
        self.entries.len() + self.cookies.len()
    }

    /// Writes every entry into a context's cookie jar
    ///
    /// Storage entries are scoped to the origin; saved cookies keep their
    /// own domain and path. Returns the number of values written. Values that
    /// cannot travel in a cookie header are skipped.
    pub fn apply(&self, jar: &Jar) -> usize {
        let origin = match Url::parse(&self.origin) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot apply session state to '{}': {}", self.origin, e);
                return 0;
            }
        };

        let mut applied = 0;
        for (name, value) in &self.entries {
            if !is_cookie_safe(name, value) {
                tracing::warn!("Skipping session entry '{}': not representable as a cookie", name);
                continue;
            }
            jar.add_cookie_str(&format!("{}={}; Path=/", name, value), &origin);
            applied += 1;
        }

        for stored in &self.cookies {
            if !is_cookie_safe(&stored.name, &stored.value) {
                tracing::warn!("Skipping session cookie '{}': invalid characters", stored.name);
                continue;
            }
            let mut cookie = format!(
                "{}={}; Path={}",
                stored.name,
                stored.value,
                stored.path.as_deref().unwrap_or("/")
            );
            if let Some(domain) = stored.domain.as_deref().filter(|d| !d.is_empty()) {
                cookie.push_str("; Domain=");
                cookie.push_str(domain);
            }
            jar.add_cookie_str(&cookie, &origin);
            applied += 1;
        }

        tracing::debug!("Applied {} session values for {}", applied, self.origin);
        applied
    }
}

/// Empty values are allowed; names are not
fn is_cookie_safe(name: &str, value: &str) -> bool {
    let valid = |s: &str| !s.chars().any(|c| c == ';' || c.is_control());
    !name.is_empty() && !name.contains('=') && valid(name) && valid(value)
}

/// Loads the session state for `origin`, failing soft
///
/// A missing or malformed file, or one with nothing for this origin, is
/// logged and yields `None`; the crawl then proceeds unauthenticated.
pub fn load(path: &Path, origin: &Url) -> Option<AuthState> {
    match try_load(path, origin) {
        Ok(state) => {
            tracing::info!(
                "Loaded {} session values for {} from {}",
                state.len(),
                state.origin,
                path.display()
            );
            Some(state)
        }
        Err(AuthError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(
                "Session file {} not found, crawling unauthenticated",
                path.display()
            );
            None
        }
        Err(e) => {
            tracing::warn!("{}; crawling unauthenticated", e);
            None
        }
    }
}

/// Loads the session state for `origin`
///
/// Storage entries of every matching origin block are flattened into one
/// map; a later duplicate name overwrites an earlier one.
pub fn try_load(path: &Path, origin: &Url) -> Result<AuthState, AuthError> {
    let content = std::fs::read_to_string(path)?;
    from_json(&content, origin)
}

pub(crate) fn from_json(content: &str, origin: &Url) -> Result<AuthState, AuthError> {
    let file: StorageFile = serde_json::from_str(content)?;
    let origin_str = origin.origin().ascii_serialization();
    let host = origin.host_str().unwrap_or_default();

    let mut entries = BTreeMap::new();
    for entry in file.origins.iter().filter(|o| o.matches_origin(&origin_str)) {
        for item in &entry.local_storage {
            entries.insert(item.name.clone(), item.value.clone());
        }
    }

    let cookies: Vec<_> = file
        .cookies
        .into_iter()
        .filter(|c| c.matches_host(host))
        .collect();

    let state = AuthState {
        origin: origin_str,
        entries,
        cookies,
    };

    if state.is_empty() {
        return Err(AuthError::NoMatchingOrigin(state.origin));
    }

    Ok(state)
}
