use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;
use std::{fmt, fs};

use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::monitoring::prober::DEFAULT_TIMEOUT;
use crate::monitoring::types::{ContentPattern, Site};

const MIN_TIMEOUT: u64 = 1;
const MAX_TIMEOUT: u64 = 300; // 5 minutes

/// Validated, immutable monitoring configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Pause between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Ceiling for a single probe
    pub timeout: Duration,
    pub max_concurrency: Option<NonZeroUsize>,
    pub server: ServerConfig,
    /// Sites in configuration order
    pub sites: Vec<Site>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind(), port: default_port() }
    }
}

fn default_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    5000
}

/// On-disk shape; every field without a default is required
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    interval: u64,
    timeout_seconds: Option<u64>,
    max_concurrency: Option<usize>,
    #[serde(default)]
    server: ServerConfig,
    sites: IndexMap<String, RawSite>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSite {
    url: String,
    content: String,
    full_match: bool,
}

impl Config {
    /// Load and validate a TOML configuration file
    ///
    /// ```rust,ignore
    /// let cfg = Config::from_path("webmon.toml")?;
    /// println!("{}", cfg);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw_string = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFailed { path: path.to_path_buf(), source })?;

        Self::from_toml_str(&raw_string)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(raw)?;

        let timeout = match raw.timeout_seconds {
            Some(seconds) => Duration::from_secs(validate_timeout(seconds)?),
            None => DEFAULT_TIMEOUT,
        };

        let max_concurrency = match raw.max_concurrency {
            Some(limit) => Some(NonZeroUsize::new(limit).ok_or(ConfigError::ZeroConcurrency)?),
            None => None,
        };

        let sites = raw
            .sites
            .into_iter()
            .map(|(id, site)| build_site(id, site))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            interval: validate_interval(raw.interval)?,
            timeout,
            max_concurrency,
            server: raw.server,
            sites,
        })
    }

    /// Replace the check interval, e.g. from the command line
    pub fn with_interval(mut self, seconds: u64) -> Result<Self, ConfigError> {
        self.interval = validate_interval(seconds)?;
        Ok(self)
    }
}

fn build_site(id: String, raw: RawSite) -> Result<Site, ConfigError> {
    if id.trim().is_empty() {
        return Err(ConfigError::EmptySiteId);
    }

    let url = Url::parse(&raw.url).map_err(|source| ConfigError::InvalidUrl {
        site: id.clone(),
        url: raw.url.clone(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::UnsupportedScheme { site: id, scheme: other.to_string() });
        }
    }

    let pattern = ContentPattern::new(&raw.content, raw.full_match)
        .map_err(|source| ConfigError::InvalidPattern { site: id.clone(), source })?;

    Ok(Site::new(id, url, pattern))
}

fn validate_interval(seconds: u64) -> Result<Duration, ConfigError> {
    if seconds == 0 {
        return Err(ConfigError::ZeroInterval);
    }
    Ok(Duration::from_secs(seconds))
}

fn validate_timeout(seconds: u64) -> Result<u64, ConfigError> {
    if !(MIN_TIMEOUT..=MAX_TIMEOUT).contains(&seconds) {
        return Err(ConfigError::TimeoutOutOfRange {
            value: seconds,
            min: MIN_TIMEOUT,
            max: MAX_TIMEOUT,
        });
    }
    Ok(seconds)
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_title_2 = write_title_indented(2);
        let write_1 = write_indented(1);
        let write_2 = write_indented(2);

        writeln!(f, "Current Monitoring Configuration:")?;
        write_1(f, "Interval (s)", &self.interval.as_secs())?;
        write_1(f, "Timeout (s)", &self.timeout.as_secs())?;
        match self.max_concurrency {
            Some(limit) => write_1(f, "Max Concurrency", &limit)?,
            None => write_1(f, "Max Concurrency", &"unbounded")?,
        }
        write_title_1(f, "Dashboard")?;
        write_1(f, "Listen Address", &self.server.socket_addr())?;
        write_title_1(f, "Sites")?;
        for site in &self.sites {
            write_title_2(f, &site.id)?;
            write_2(f, "URL", &site.url)?;
            write_2(f, "Content", &site.pattern.as_str())?;
            write_2(f, "Full Match", &site.pattern.full_match())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
        interval = 60

        [sites.zulu]
        url = "https://zulu.example.com"
        content = "OK"
        full_match = true

        [sites.alpha]
        url = "http://alpha.example.com/health"
        content = "status: (up|green)"
        full_match = false

        [sites.mike]
        url = "https://mike.example.com"
        content = ""
        full_match = false
    "#;

    fn parse_err(raw: &str) -> ConfigError {
        Config::from_toml_str(raw).expect_err("config should be rejected")
    }

    #[test]
    fn test_valid_config_keeps_site_order() {
        let config = Config::from_toml_str(VALID).unwrap();

        let ids: Vec<_> = config.sites.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["zulu", "alpha", "mike"]);
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.max_concurrency, None);
        assert_eq!(config.server, ServerConfig::default());
        assert!(config.sites[0].pattern.full_match());
        assert!(!config.sites[1].pattern.full_match());
    }

    #[test]
    fn test_optional_settings() {
        let raw = format!(
            "timeout_seconds = 5\nmax_concurrency = 4\n{VALID}\n[server]\nbind = \"0.0.0.0\"\nport = 8080\n"
        );
        let config = Config::from_toml_str(&raw).unwrap();

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_concurrency, NonZeroUsize::new(4));
        assert_eq!(config.server.socket_addr(), "0.0.0.0:8080".parse().unwrap());
    }

    #[test]
    fn test_missing_interval_is_fatal() {
        let raw = r#"
            [sites.a]
            url = "https://a.example.com"
            content = "OK"
            full_match = false
        "#;

        let err = parse_err(raw);
        assert!(matches!(err, ConfigError::ParseFailed(_)));
        assert!(err.to_string().contains("interval"), "{err}");
    }

    #[test]
    fn test_missing_sites_is_fatal() {
        let err = parse_err("interval = 10");
        assert!(err.to_string().contains("sites"), "{err}");
    }

    #[test]
    fn test_each_site_field_is_required() {
        let fields = [
            ("url", r#"url = "https://a.example.com""#),
            ("content", r#"content = "OK""#),
            ("full_match", "full_match = true"),
        ];

        for (missing, _) in &fields {
            let body: Vec<_> =
                fields.iter().filter(|(name, _)| name != missing).map(|(_, line)| *line).collect();
            let raw = format!("interval = 10\n[sites.a]\n{}\n", body.join("\n"));

            let err = parse_err(&raw);
            assert!(matches!(err, ConfigError::ParseFailed(_)), "missing {missing}: {err}");
            assert!(err.to_string().contains(missing), "missing {missing}: {err}");
        }
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let raw = VALID.replace("interval = 60", "interval = 0");
        assert!(matches!(parse_err(&raw), ConfigError::ZeroInterval));
    }

    #[test]
    fn test_negative_interval_is_rejected() {
        let raw = VALID.replace("interval = 60", "interval = -5");
        assert!(matches!(parse_err(&raw), ConfigError::ParseFailed(_)));
    }

    #[test]
    fn test_timeout_bounds() {
        for timeout in [0, 301] {
            let raw = format!("timeout_seconds = {timeout}\n{VALID}");
            assert!(matches!(parse_err(&raw), ConfigError::TimeoutOutOfRange { .. }));
        }
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let raw = format!("max_concurrency = 0\n{VALID}");
        assert!(matches!(parse_err(&raw), ConfigError::ZeroConcurrency));
    }

    #[test]
    fn test_unsupported_scheme_is_rejected() {
        let raw = VALID.replace("http://alpha.example.com/health", "ftp://alpha.example.com");
        match parse_err(&raw) {
            ConfigError::UnsupportedScheme { site, scheme } => {
                assert_eq!(site, "alpha");
                assert_eq!(scheme, "ftp");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unparseable_url_is_rejected() {
        let raw = VALID.replace("https://zulu.example.com", "not a url");
        assert!(matches!(parse_err(&raw), ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let raw = VALID.replace("status: (up|green)", "status: (up|green");
        match parse_err(&raw) {
            ConfigError::InvalidPattern { site, .. } => assert_eq!(site, "alpha"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let raw = VALID.replace("full_match = true", "full_match = true\nretries = 3");
        assert!(matches!(parse_err(&raw), ConfigError::ParseFailed(_)));
    }

    #[test]
    fn test_interval_override() {
        let config = Config::from_toml_str(VALID).unwrap();

        let overridden = config.clone().with_interval(5).unwrap();
        assert_eq!(overridden.interval, Duration::from_secs(5));

        assert!(matches!(config.with_interval(0), Err(ConfigError::ZeroInterval)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(config.sites.len(), 3);
    }

    #[test]
    fn test_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_path(dir.path().join("absent.toml")).unwrap_err();

        assert!(matches!(err, ConfigError::ReadFailed { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_display_lists_sites() {
        let config = Config::from_toml_str(VALID).unwrap();
        let rendered = config.to_string();

        assert!(rendered.contains("Interval (s): 60"));
        assert!(rendered.contains("zulu"));
        assert!(rendered.contains("https://zulu.example.com/"));
        assert!(rendered.contains("127.0.0.1:5000"));
    }
}
