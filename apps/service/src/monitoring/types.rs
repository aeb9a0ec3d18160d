use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Transport failure kinds a probe can end with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeErrorKind {
    Timeout,
    ConnectionRefused,
    Dns,
    Tls,
    Other,
}

impl std::fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeErrorKind::Timeout => write!(f, "timeout"),
            ProbeErrorKind::ConnectionRefused => write!(f, "connection refused"),
            ProbeErrorKind::Dns => write!(f, "dns failure"),
            ProbeErrorKind::Tls => write!(f, "tls failure"),
            ProbeErrorKind::Other => write!(f, "other"),
        }
    }
}

/// Expected body content of a site.
///
/// With `full_match` the pattern is anchored at the first character of the
/// body only; trailing content after the match is allowed.
#[derive(Debug, Clone)]
pub struct ContentPattern {
    source: String,
    full_match: bool,
    regex: Regex,
}

impl ContentPattern {
    pub fn new(pattern: &str, full_match: bool) -> Result<Self, regex::Error> {
        // Validate the pattern as written so errors point at the user's text
        let unanchored = Regex::new(pattern)?;
        let regex = if full_match { Regex::new(&format!(r"\A(?:{pattern})"))? } else { unanchored };

        Ok(Self { source: pattern.to_string(), full_match, regex })
    }

    pub fn matches(&self, body: &str) -> bool {
        self.regex.is_match(body)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn full_match(&self) -> bool {
        self.full_match
    }
}

/// One configured monitoring target
#[derive(Debug, Clone)]
pub struct Site {
    pub id: String,
    pub url: Url,
    pub pattern: ContentPattern,
}

impl Site {
    pub fn new(id: impl Into<String>, url: Url, pattern: ContentPattern) -> Self {
        Self { id: id.into(), url, pattern }
    }
}

/// Outcome of probing one site during one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStatus {
    /// Identifier of the site in the configuration
    pub id: String,

    /// URL that was requested
    pub url: String,

    /// Whether a complete HTTP response was received
    pub up: bool,

    /// Failure classification, only set when `up` is false
    pub error: Option<ProbeErrorKind>,

    /// Transport error text, only set when `up` is false
    pub error_message: Option<String>,

    /// HTTP status code, only set when `up` is true
    pub code: Option<u16>,

    /// Time from issuing the request to full body receipt, or to the failure
    #[serde(rename = "elapsed_ms", with = "millis")]
    pub elapsed: Duration,

    /// Whether the body matched the content pattern, only set when `up` is true
    #[serde(rename = "match")]
    pub matched: Option<bool>,
}

impl SiteStatus {
    /// Status of a site that answered
    pub fn reachable(site: &Site, code: u16, elapsed: Duration, matched: bool) -> Self {
        Self {
            id: site.id.clone(),
            url: site.url.to_string(),
            up: true,
            error: None,
            error_message: None,
            code: Some(code),
            elapsed,
            matched: Some(matched),
        }
    }

    /// Status of a site whose request failed at the transport level
    pub fn unreachable(
        site: &Site,
        kind: ProbeErrorKind,
        message: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            id: site.id.clone(),
            url: site.url.to_string(),
            up: false,
            error: Some(kind),
            error_message: Some(message),
            code: None,
            elapsed,
            matched: None,
        }
    }
}

/// Result set of one complete cycle, in configuration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sequence number of the cycle, starting at 1
    pub cycle: u64,

    /// When the cycle started
    pub taken_at: DateTime<Utc>,

    pub sites: Vec<SiteStatus>,
}

impl Snapshot {
    pub fn new(cycle: u64, taken_at: DateTime<Utc>, sites: Vec<SiteStatus>) -> Self {
        Self { cycle, taken_at, sites }
    }

    pub fn get(&self, id: &str) -> Option<&SiteStatus> {
        self.sites.iter().find(|status| status.id == id)
    }

    pub fn up_count(&self) -> usize {
        self.sites.iter().filter(|status| status.up).count()
    }

    pub fn down_count(&self) -> usize {
        self.sites.len() - self.up_count()
    }
}

/// Serializes a `Duration` as fractional milliseconds.
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_nanos() as f64 / 1_000_000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let ms = f64::deserialize(deserializer)?;
        if !ms.is_finite() || ms < 0.0 {
            return Err(serde::de::Error::custom(format!("invalid duration: {ms} ms")));
        }
        Ok(Duration::from_nanos((ms * 1_000_000.0).round() as u64))
    }
}
