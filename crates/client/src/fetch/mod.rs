//! HTTP fetch pipeline for gif downloads.
//!
//! ### URL Handling
//! - Trim whitespace, require `http`/`https` and a host, remove fragments
//! - Rewrite a trailing `.gifv` to `.gif` before the request
//!
//! ### SSRF & Safety Gates
//! - Deny private ranges (RFC1918, link-local, localhost, etc.)
//! - Resolve DNS and validate all A/AAAA answers are public.
//! - Redirects are followed by hand so every hop gets the same checks
//! - Max redirects: 5 (configurable)
//! - Max body bytes: 20MB (configurable); oversized bodies are dropped whole
//!
//! ### Status Handling
//! - Non-2xx responses are errors unless `accept_error_status` is set
//! - No retries

pub mod ssrf;
pub mod url;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use std::time::{Duration, Instant};

use gifstash_core::{AppConfig, Error};

pub use ssrf::{SsrfError, validate_host, validate_ip};
pub use self::url::{UrlError, canonicalize, resolve_fetch_url};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "gifstash/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 20MB)
    pub max_bytes: usize,

    /// Request timeout (default: 15s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Refuse private and reserved destinations (default: true)
    pub block_private_addresses: bool,

    /// Return bodies of non-2xx responses instead of failing (default: false)
    pub accept_error_status: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "gifstash/0.1".to_string(),
            max_bytes: 20 * 1024 * 1024,
            timeout: Duration::from_millis(15_000),
            max_redirects: 5,
            block_private_addresses: true,
            accept_error_status: false,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
            block_private_addresses: config.block_private_addresses,
            accept_error_status: config.accept_error_status,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL as submitted
    pub source_url: String,
    /// The URL actually requested, after rewriting
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

/// Source of gif bytes for a submitted URL.
///
/// The server depends on this rather than on [`FetchClient`] directly so the
/// download step can be replaced.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download the bytes behind `source_url`.
    async fn fetch_bytes(&self, source_url: &str) -> Result<Bytes, Error>;
}

/// HTTP fetch client with safety checks.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .use_rustls_tls()
            .gzip(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch a gif URL, returning raw bytes and metadata.
    ///
    /// Applies the `.gifv` rewrite, the SSRF check on every hop, the status
    /// policy and the byte limit. Never returns a truncated body.
    pub async fn fetch(&self, source_url: &str) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = resolve_fetch_url(source_url).map_err(|e| Error::InvalidUrl(format!("{source_url}: {e}")))?;

        self.check_destination(&url).await?;

        let mut final_url = url.clone();
        let mut redirects = 0;
        let mut response = loop {
            let response = self
                .http
                .get(final_url.as_str())
                .header(header::ACCEPT, "image/gif,image/*;q=0.9,*/*;q=0.5")
                .send()
                .await
                .map_err(|e| self.transport_error(&final_url, e))?;

            let location = response
                .status()
                .is_redirection()
                .then(|| response.headers().get(header::LOCATION).cloned())
                .flatten();
            let Some(location) = location else {
                break response;
            };

            if redirects >= self.config.max_redirects {
                return Err(Error::HttpError(format!(
                    "{} exceeded {} redirects",
                    url, self.config.max_redirects
                )));
            }
            let location = location
                .to_str()
                .map_err(|_| Error::HttpError(format!("unreadable redirect location from {}", final_url)))?;

            final_url = self.next_hop(&final_url, location).await?;
            redirects += 1;
            tracing::debug!("following redirect {} to {}", redirects, final_url);
        };

        let status = response.status();

        if !status.is_success() {
            if !self.config.accept_error_status {
                return Err(Error::HttpError(format!("status {} from {}", status.as_u16(), final_url)));
            }
            tracing::warn!("accepting status {} from {}", status.as_u16(), final_url);
        }

        if let Some(len) = response.content_length()
            && len > self.config.max_bytes as u64
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.transport_error(&final_url, e))? {
            if body.len() + chunk.len() > self.config.max_bytes {
                return Err(Error::FetchTooLarge(format!(
                    "body exceeds {} bytes",
                    self.config.max_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }
        let bytes = body.freeze();

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes)",
            url,
            final_url,
            fetch_ms,
            bytes.len()
        );

        Ok(FetchResponse {
            source_url: source_url.to_string(),
            url,
            final_url,
            status,
            content_type,
            bytes,
            fetch_ms,
        })
    }

    /// Refuse private and reserved destinations when blocking is enabled.
    async fn check_destination(&self, url: &Url) -> Result<(), Error> {
        if !self.config.block_private_addresses {
            return Ok(());
        }
        validate_host(url).await.map_err(|e| match e {
            SsrfError::BlockedIp(ip) => Error::SsrfBlocked(format!("{} resolves to {}", url, ip)),
            SsrfError::DnsError(msg) => Error::HttpError(msg),
        })
    }

    /// Resolve a redirect `location` against `current` and vet the target.
    ///
    /// The target gets the same scheme and address checks as the first hop.
    async fn next_hop(&self, current: &Url, location: &str) -> Result<Url, Error> {
        let target = current
            .join(location)
            .map_err(|e| Error::InvalidUrl(format!("redirect to {location}: {e}")))?;
        let target = canonicalize(target.as_str())
            .map_err(|e| Error::InvalidUrl(format!("redirect to {location}: {e}")))?;

        self.check_destination(&target).await?;
        Ok(target)
    }

    fn transport_error(&self, url: &Url, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::FetchTimeout(format!("{} after {}ms", url, self.config.timeout.as_millis()))
        } else {
            Error::HttpError(format!("network error: {}", err))
        }
    }
}

#[async_trait]
impl Fetcher for FetchClient {
    async fn fetch_bytes(&self, source_url: &str) -> Result<Bytes, Error> {
        let response = self.fetch(source_url).await?;

        tracing::info!(
            source_url = %response.source_url,
            final_url = %response.final_url,
            status = response.status.as_u16(),
            content_type = response.content_type.as_deref().unwrap_or("unknown"),
            fetch_ms = response.fetch_ms,
            bytes = response.bytes.len(),
            "downloaded gif"
        );

        Ok(response.bytes)
    }
}
