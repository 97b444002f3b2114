//! Blocking HTTP client with a fixed browser identity and timeout, plus the pacing helper
//! callers use to stay polite between page requests.

use crate::error::FetchError;
use std::time::{Duration, Instant};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DELAY_MS: u64 = 1000;
const MAX_REDIRECTS: usize = 10;

/// A successful (2xx) response body.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Fetched {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Anything that can GET a URL. Implemented by [PoliteClient]; tests use in-memory fakes.
pub trait Fetch {
    fn fetch(&mut self, url: &str) -> Result<Fetched, FetchError>;
}

/// Blocking HTTP client. One GET per call, no retries.
#[derive(Debug)]
pub struct PoliteClient {
    inner: reqwest::blocking::Client,
}

impl PoliteClient {
    /// Build a client with the default User-Agent and timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    pub fn builder() -> PoliteClientBuilder {
        PoliteClientBuilder::default()
    }
}

impl Fetch for PoliteClient {
    fn fetch(&mut self, url: &str) -> Result<Fetched, FetchError> {
        let response = self.inner.get(url).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::BodyRead {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;
        Ok(Fetched {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}

/// Builder for PoliteClient with optional User-Agent and timeout.
#[derive(Debug)]
pub struct PoliteClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for PoliteClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PoliteClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<PoliteClient, reqwest::Error> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let inner = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(PoliteClient { inner })
    }
}

/// Enforces a minimum gap between successive page requests. The first call never waits.
#[derive(Debug)]
pub struct Politeness {
    delay: Duration,
    last_request: Option<Instant>,
}

impl Politeness {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: None,
        }
    }

    /// Sleep until the delay has passed since the previous request, then mark a new one.
    pub fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                std::thread::sleep(self.delay - elapsed);
            }
        }
        self.last_request = Some(Instant::now());
    }

    /// Restart the delay from now, after follow-up requests (images) to the same host.
    pub fn restart(&mut self) {
        self.last_request = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetched_text_replaces_invalid_utf8() {
        let f = Fetched {
            status: 200,
            body: b"caf\xff".to_vec(),
        };
        assert_eq!(f.text(), "caf\u{fffd}");
    }

    #[test]
    fn politeness_first_wait_is_immediate() {
        let mut p = Politeness::new(Duration::from_secs(60));
        let start = Instant::now();
        p.wait();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn politeness_second_wait_honors_delay() {
        let mut p = Politeness::new(Duration::from_millis(50));
        p.wait();
        let start = Instant::now();
        p.wait();
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn politeness_restart_moves_the_window() {
        let mut p = Politeness::new(Duration::from_millis(60));
        p.wait();
        std::thread::sleep(Duration::from_millis(60));
        p.restart();
        let start = Instant::now();
        p.wait();
        assert!(start.elapsed() >= Duration::from_millis(55));
    }

    #[test]
    fn builder_builds_client() {
        assert!(PoliteClient::builder()
            .user_agent("docsfetch-test/1.0")
            .timeout_secs(5)
            .build()
            .is_ok());
    }
}
