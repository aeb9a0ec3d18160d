use anyhow::Result;
use std::error::Error as StdError;
use std::io;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

use super::types::{ProbeErrorKind, Site, SiteStatus};

/// Per-check ceiling applied when the configuration does not set one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Performs one availability check against one site.
///
/// Implementations never fail: transport errors are folded into the
/// returned [`SiteStatus`].
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn check(&self, site: &Site) -> SiteStatus;
}

/// HTTP/HTTPS prober sharing one connection pool across all checks
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("webmon/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Use a preconfigured client. Its timeout bounds every check.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Single attempt: status code and the fully downloaded body
    async fn fetch(&self, url: &Url) -> Result<(u16, String), reqwest::Error> {
        let response = self.client.get(url.clone()).send().await?;
        let status_code = response.status().as_u16();
        let body = response.text().await?;

        Ok((status_code, body))
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn check(&self, site: &Site) -> SiteStatus {
        let start = Instant::now();
        let outcome = self.fetch(&site.url).await;
        let elapsed = start.elapsed();

        match outcome {
            Ok((status_code, body)) => {
                let matched = site.pattern.matches(&body);
                debug!(site = %site.id, status_code, matched, ?elapsed, "Probe answered");
                SiteStatus::reachable(site, status_code, elapsed, matched)
            }
            Err(e) => {
                let kind = classify(&e);
                debug!(site = %site.id, error = %kind, ?elapsed, "Probe failed: {}", e);
                SiteStatus::unreachable(site, kind, describe(&e), elapsed)
            }
        }
    }
}

/// Map a reqwest failure onto the closed set of transport error kinds
pub fn classify(error: &reqwest::Error) -> ProbeErrorKind {
    if error.is_timeout() {
        return ProbeErrorKind::Timeout;
    }

    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            match io_error.kind() {
                io::ErrorKind::ConnectionRefused => return ProbeErrorKind::ConnectionRefused,
                io::ErrorKind::TimedOut => return ProbeErrorKind::Timeout,
                _ => {}
            }
        }

        let text = cause.to_string().to_ascii_lowercase();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return ProbeErrorKind::Dns;
        }
        if text.contains("certificate")
            || text.contains("tls")
            || text.contains("ssl")
            || text.contains("handshake")
        {
            return ProbeErrorKind::Tls;
        }

        source = cause.source();
    }

    ProbeErrorKind::Other
}

/// Error text including the whole source chain
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
