use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;

use crate::error::BalanceError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

// ==============================================================================
// API Configuration
// ==============================================================================

/// Connection parameters for the balance-query endpoint.
///
/// The access key is a credential: it is redacted from `Debug` output and
/// from every logged URL.
#[derive(Clone)]
pub struct ApiConfig {
    endpoint: Url,
    api_key: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    user_agent: Option<String>,
}

impl ApiConfig {
    pub fn new(endpoint: &str, api_key: impl Into<String>) -> Result<Self, BalanceError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(BalanceError::Config("api key must not be empty".to_owned()));
        }
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            api_key,
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        })
    }

    pub fn with_timeouts(
        mut self,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, BalanceError> {
        if connect_timeout.is_zero() || read_timeout.is_zero() {
            return Err(BalanceError::Config(
                "connect and read timeouts must be non-zero".to_owned(),
            ));
        }
        self.connect_timeout = connect_timeout;
        self.read_timeout = read_timeout;
        Ok(self)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

// ==============================================================================
// Endpoint and Key Resolution
// ==============================================================================

pub(crate) fn parse_endpoint(endpoint: &str) -> Result<Url, BalanceError> {
    let parsed = Url::parse(endpoint).map_err(|e| {
        BalanceError::Config(format!(
            "invalid endpoint `{endpoint}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(BalanceError::Config(format!(
            "unsupported endpoint scheme `{other}`; expected http or https"
        ))),
    }
}

/// Resolve the API access key from exactly one of an explicit value or a key
/// file. Only the first non-empty line of the file is used.
pub fn resolve_api_key(key: Option<&str>, key_file: Option<&Path>) -> Result<String, BalanceError> {
    match (key, key_file) {
        (Some(_), Some(_)) => Err(BalanceError::Config(
            "api key and api key file are mutually exclusive".to_owned(),
        )),
        (None, None) => Err(BalanceError::Config(
            "an api key or api key file is required".to_owned(),
        )),
        (Some(key), None) => {
            let key = key.trim();
            if key.is_empty() {
                return Err(BalanceError::Config("api key must not be empty".to_owned()));
            }
            Ok(key.to_owned())
        }
        (None, Some(key_file)) => {
            let content = std::fs::read_to_string(key_file).map_err(|e| {
                BalanceError::Config(format!(
                    "failed to read api key file {}: {e}",
                    key_file.display()
                ))
            })?;
            content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_owned)
                .ok_or_else(|| {
                    BalanceError::Config(format!("api key file {} is empty", key_file.display()))
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    static KEY_FILE_SEQ: AtomicUsize = AtomicUsize::new(0);

    fn temp_key_file(content: &str) -> std::path::PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time must be after unix epoch")
            .as_nanos();
        let seq = KEY_FILE_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("unspent-key-{unique}-{seq}.txt"));
        fs::write(&path, content).expect("key file must be writable");
        path
    }

    #[test]
    fn parse_endpoint_http_url() {
        let parsed = parse_endpoint("https://example.com/api.dws").expect("should parse");
        assert_eq!(parsed.as_str(), "https://example.com/api.dws");
    }

    #[test]
    fn parse_endpoint_invalid_scheme() {
        let err = parse_endpoint("ftp://example.com").expect_err("must reject ftp");
        assert!(err.to_string().contains("unsupported endpoint scheme"));
    }

    #[test]
    fn config_rejects_empty_key() {
        let err = ApiConfig::new("https://example.com", "  ").expect_err("must reject");
        assert!(matches!(err, BalanceError::Config(_)));
    }

    #[test]
    fn config_rejects_zero_timeouts() {
        let config = ApiConfig::new("https://example.com", "k").expect("valid config");
        assert!(config
            .with_timeouts(Duration::ZERO, Duration::from_secs(1))
            .is_err());
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = ApiConfig::new("https://example.com", "very-secret").expect("valid config");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn resolve_api_key_requires_exactly_one_source() {
        assert!(resolve_api_key(None, None).is_err());
        let path = temp_key_file("abc\n");
        let err = resolve_api_key(Some("abc"), Some(&path)).expect_err("must reject both");
        assert!(err.to_string().contains("mutually exclusive"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn resolve_api_key_reads_first_non_empty_line() {
        let path = temp_key_file("\n  secret-key  \nignored\n");
        let key = resolve_api_key(None, Some(&path)).expect("key file must parse");
        assert_eq!(key, "secret-key");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn resolve_api_key_rejects_empty_file() {
        let path = temp_key_file("\n\n");
        let err = resolve_api_key(None, Some(&path)).expect_err("must reject empty file");
        assert!(err.to_string().contains("is empty"));
        let _ = fs::remove_file(path);
    }
}
