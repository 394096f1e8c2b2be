//! HTTP(S) fetcher with bounded timeouts and manual redirect following.

use std::io::Write;
use std::time::{Duration, Instant};

use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Url;

use crate::error::{Result, ShimError};

use super::Fetcher;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
/// Default overall timeout, shared by every hop of a redirect chain.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default maximum number of redirects followed.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Network limits for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,
    /// Time allowed for the whole fetch, redirects included.
    pub timeout: Duration,
    /// Redirects followed before giving up.
    pub max_redirects: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// Fetches remote configuration over HTTP(S).
///
/// Redirects are followed by hand rather than by the client so that the
/// bound is reported as [`ShimError::RedirectLoopExceeded`] and every hop
/// draws from one overall deadline.
///
/// # Example
///
/// ```no_run
/// use envshim::fetch::{FetchOptions, Fetcher, HttpFetcher};
///
/// let fetcher = HttpFetcher::new(FetchOptions::default()).unwrap();
/// let mut body = Vec::new();
/// fetcher.fetch_into("https://example.com/env.sh", &mut body).unwrap();
/// ```
pub struct HttpFetcher {
    options: FetchOptions,
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given limits.
    pub fn new(options: FetchOptions) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.timeout)
            .redirect(Policy::none())
            .user_agent(concat!("envshim/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { options, client })
    }

    /// The limits this fetcher applies.
    pub fn options(&self) -> FetchOptions {
        self.options
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_into(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        let failed = |reason: String| ShimError::FetchFailed {
            url: url.to_string(),
            reason,
        };

        let mut current = Url::parse(url).map_err(|e| failed(format!("invalid URL: {}", e)))?;
        if !matches!(current.scheme(), "http" | "https") {
            return Err(failed(format!("unsupported scheme '{}'", current.scheme())));
        }

        let deadline = Instant::now() + self.options.timeout;
        let mut redirects = 0;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(failed(format!(
                    "timed out after {}s",
                    self.options.timeout.as_secs()
                )));
            }

            tracing::debug!("GET {}", current);
            let mut response = self
                .client
                .get(current.clone())
                .timeout(remaining)
                .send()
                .map_err(|e| failed(describe(&e)))?;

            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| failed(format!("HTTP {} without Location header", status)))?;

                if redirects == self.options.max_redirects {
                    return Err(ShimError::RedirectLoopExceeded {
                        url: url.to_string(),
                        limit: self.options.max_redirects,
                    });
                }

                let next = response
                    .url()
                    .join(location)
                    .map_err(|e| failed(format!("bad redirect target '{}': {}", location, e)))?;
                tracing::debug!("HTTP {} -> {}", status, next);
                redirects += 1;
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(failed(format!("HTTP {}", status)));
            }

            return std::io::copy(&mut response, sink)
                .map_err(|e| failed(format!("failed to read response body: {}", e)));
        }
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
pub(crate) mod test_support {
    use httpmock::prelude::*;

    /// Mount a chain `/hop0 -> /hop1 -> ... -> /hop{hops}` that ends in `body`.
    pub fn redirect_chain(server: &MockServer, hops: usize, body: &str) {
        for i in 0..hops {
            let next = server.url(format!("/hop{}", i + 1));
            server.mock(|when, then| {
                when.method(GET).path(format!("/hop{}", i));
                then.status(302).header("Location", next);
            });
        }
        server.mock(|when, then| {
            when.method(GET).path(format!("/hop{}", hops));
            then.status(200).body(body);
        });
    }
}
