//! Browsing contexts
//!
//! A browsing context is the stateful session a crawl navigates with: it
//! carries the cookies that make requests authenticated. Contexts are never
//! shared; each concurrently walked branch opens its own from a factory.

use crate::config::UserAgentConfig;
use crate::crawler::parser::Document;
use crate::session::AuthState;
use crate::{FetchError, FetchResult};
use reqwest::cookie::Jar;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// One raw navigation: request a URL and hand back what it returned
///
/// Implementations do not wait for readiness or apply timeouts; the
/// `PageFetcher` owning the context does that.
pub trait BrowsingContext {
    fn load(&self, url: &Url) -> impl Future<Output = FetchResult<Document>> + Send;
}

/// Opens fresh, independent browsing contexts
pub trait ContextFactory {
    type Context: BrowsingContext;

    fn open(&self) -> FetchResult<Self::Context>;
}

/// HTTP browsing context: a client with its own cookie jar
#[derive(Debug, Clone)]
pub struct HttpContext {
    client: Client,
    jar: Arc<Jar>,
}

impl HttpContext {
    /// Creates a context, applying `auth` to its storage before returning
    ///
    /// Because the state is applied here, no navigation through this context
    /// can ever happen unauthenticated when a state is given.
    pub fn new(
        user_agent: &UserAgentConfig,
        navigation_timeout: Duration,
        auth: Option<&AuthState>,
    ) -> FetchResult<Self> {
        let jar = Arc::new(Jar::default());
        if let Some(state) = auth {
            state.apply(&jar);
        }

        let client = build_http_client(user_agent, navigation_timeout, jar.clone())
            .map_err(|e| FetchError::Context(e.to_string()))?;

        Ok(Self { client, jar })
    }

    /// The context's persistent storage
    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }
}

impl BrowsingContext for HttpContext {
    async fn load(&self, url: &Url) -> FetchResult<Document> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(Document::new(final_url, body))
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Builds an HTTP client for one browsing context
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Upper bound on one request
/// * `jar` - The context's cookie storage
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
    jar: Arc<Jar>,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .cookie_provider(jar)
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Opens `HttpContext`s that all carry the same session state
#[derive(Debug, Clone)]
pub struct HttpContextFactory {
    user_agent: UserAgentConfig,
    navigation_timeout: Duration,
    auth: Option<AuthState>,
}

impl HttpContextFactory {
    pub fn new(
        user_agent: UserAgentConfig,
        navigation_timeout: Duration,
        auth: Option<AuthState>,
    ) -> Self {
        Self {
            user_agent,
            navigation_timeout,
            auth,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }
}

impl ContextFactory for HttpContextFactory {
    type Context = HttpContext;

    fn open(&self) -> FetchResult<HttpContext> {
        HttpContext::new(&self.user_agent, self.navigation_timeout, self.auth.as_ref())
    }
}
