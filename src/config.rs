//! Configuration file
//!
//! feedpager reads a YAML file describing the server, its credential, HTTP
//! behaviour and the list to page through:
//!
//! ```yaml
//! server:
//!   base_url: https://example.social
//!   access_token: ${FEEDPAGER_TOKEN}
//! http:
//!   timeout_seconds: 30
//!   max_retries: 0
//! rate_limit:
//!   requests: 300
//!   window_secs: 300
//! list:
//!   mode: bookmarks
//!   limit: 20
//! ```
//!
//! `${NAME}` references inside string values are replaced with environment
//! variables once the document is parsed, so tokens stay out of the file.
//! Comments are never interpolated.

use crate::auth::AuthConfig;
use crate::endpoint::{ListMode, PagedList};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::{BackoffType, StringMap};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// Regex for matching environment references: ${NAME}
static ENV_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").unwrap());

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Server to talk to
    pub server: ServerConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Rate limit; `null` disables limiting
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,

    /// List to page through
    #[serde(default)]
    pub list: ListConfig,
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

/// Server connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL (e.g. `https://example.social`)
    pub base_url: String,

    /// Pre-issued OAuth access token
    #[serde(default)]
    pub access_token: Option<String>,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default)]
    pub max_retries: u32,

    /// Retry backoff
    #[serde(default)]
    pub backoff: BackoffType,

    /// Initial backoff in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Extra headers for every request
    #[serde(default)]
    pub headers: StringMap,
}

fn default_timeout() -> u64 {
    30
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    60_000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: 0,
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            user_agent: None,
            headers: StringMap::new(),
        }
    }
}

/// Which list to page through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Bookmarks or favorites
    #[serde(default = "default_mode")]
    pub mode: ListMode,

    /// Items per page (server default when unset)
    #[serde(default)]
    pub limit: Option<u32>,
}

fn default_mode() -> ListMode {
    ListMode::Bookmarks
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            limit: None,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl FeedConfig {
    /// Load a config file, substituting environment variables
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;
        Self::from_str_with_env(&content, |name| std::env::var(name).ok())
    }

    /// Parse config from YAML, resolving `${NAME}` through `lookup`
    pub fn from_str_with_env<F>(yaml: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let document: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let resolved = resolve_env(document, &lookup)?;
        let config: FeedConfig = serde_yaml::from_value(resolved)?;
        config.validate()?;
        Ok(config)
    }

    /// Check semantic constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.server.base_url).map_err(|e| {
            Error::config(format!("Invalid base_url '{}': {e}", self.server.base_url))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base_url must be http or https, got '{}'",
                base.scheme()
            )));
        }
        if self.list.limit == Some(0) {
            return Err(Error::config("list.limit must be greater than zero"));
        }
        if self.http.timeout_seconds == 0 {
            return Err(Error::config("http.timeout_seconds must be greater than zero"));
        }
        Ok(())
    }

    /// HTTP client configuration for this server
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(self.server.base_url.clone())
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.backoff,
                Duration::from_millis(self.http.initial_backoff_ms),
                Duration::from_millis(self.http.max_backoff_ms),
            );

        builder = match &self.rate_limit {
            Some(limit) => builder.rate_limit(limit.clone()),
            None => builder.no_rate_limit(),
        };
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        for (key, value) in &self.http.headers {
            builder = builder.header(key.clone(), value.clone());
        }
        builder.auth(self.auth()).build()
    }

    /// Credential for requests
    pub fn auth(&self) -> AuthConfig {
        match self.server.access_token.as_deref() {
            Some(token) if !token.is_empty() => AuthConfig::bearer(token),
            _ => AuthConfig::None,
        }
    }

    /// Endpoint descriptor for `mode` (the configured mode when `None`)
    pub fn paged_list(&self, mode: Option<ListMode>) -> PagedList {
        PagedList {
            mode: mode.unwrap_or(self.list.mode),
            limit: self.list.limit,
        }
    }
}

/// Interpolate `${NAME}` in every string scalar of a parsed document
///
/// A scalar that is exactly one reference resolving to a number or boolean
/// takes that type, so numeric fields can come from the environment.
fn resolve_env<F>(value: serde_yaml::Value, lookup: &F) -> Result<serde_yaml::Value>
where
    F: Fn(&str) -> Option<String>,
{
    use serde_yaml::Value;

    match value {
        Value::String(s) if ENV_REGEX.is_match(&s) => {
            let resolved = interpolate_env(&s, lookup)?;
            let whole_ref = ENV_REGEX
                .find(&s)
                .is_some_and(|m| m.start() == 0 && m.end() == s.len());
            if whole_ref {
                if let Ok(scalar @ (Value::Number(_) | Value::Bool(_))) =
                    serde_yaml::from_str::<Value>(&resolved)
                {
                    return Ok(scalar);
                }
            }
            Ok(Value::String(resolved))
        }
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| resolve_env(item, lookup))
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        Value::Mapping(map) => {
            let mut out = serde_yaml::Mapping::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key, resolve_env(item, lookup)?);
            }
            Ok(Value::Mapping(out))
        }
        other => Ok(other),
    }
}

/// Replace every `${NAME}` in `input` with `lookup(NAME)`
pub fn interpolate_env<F>(input: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut last = 0;

    for caps in ENV_REGEX.captures_iter(input) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = lookup(name.as_str()).ok_or_else(|| Error::undefined_var(name.as_str()))?;
        result.push_str(&input[last..whole.start()]);
        result.push_str(&value);
        last = whole.end();
    }

    result.push_str(&input[last..]);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const FULL: &str = r"
server:
  base_url: https://example.social
  access_token: ${TOKEN}
http:
  timeout_seconds: 10
  max_retries: 2
  backoff: linear
  headers:
    X-Client: feedpager
rate_limit: null
list:
  mode: favorites
  limit: 40
";

    fn env(name: &str) -> Option<String> {
        match name {
            "TOKEN" => Some("secret".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_parse_full_config() {
        let config = FeedConfig::from_str_with_env(FULL, env).unwrap();

        assert_eq!(config.server.access_token.as_deref(), Some("secret"));
        assert_eq!(config.http.timeout_seconds, 10);
        assert_eq!(config.http.backoff, BackoffType::Linear);
        assert!(config.rate_limit.is_none());
        assert_eq!(config.list.mode, ListMode::Favorites);
        assert_eq!(config.paged_list(None).limit, Some(40));
        assert_eq!(
            config.paged_list(Some(ListMode::Bookmarks)).mode,
            ListMode::Bookmarks
        );

        let http = config.http_client_config();
        assert_eq!(http.timeout, Duration::from_secs(10));
        assert_eq!(http.max_retries, 2);
        assert!(http.rate_limit.is_none());
        assert!(!http.auth.is_none());
        assert_eq!(
            http.default_headers.get("X-Client").map(String::as_str),
            Some("feedpager")
        );
    }

    #[test]
    fn test_defaults_apply() {
        let config = FeedConfig::from_str_with_env(
            "server:\n  base_url: https://example.social\n",
            env,
        )
        .unwrap();

        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.http.max_retries, 0);
        assert_eq!(config.rate_limit, Some(RateLimiterConfig::default()));
        assert_eq!(config.list.mode, ListMode::Bookmarks);
        assert!(config.auth().is_none());
    }

    #[test]
    fn test_undefined_env_var() {
        let err = FeedConfig::from_str_with_env(
            "server:\n  base_url: https://example.social\n  access_token: ${MISSING}\n",
            env,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { ref variable } if variable == "MISSING"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = FeedConfig::from_str_with_env("server:\n  base_url: ftp://x\n", env).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        let err = FeedConfig::from_str_with_env("server:\n  base_url: not a url\n", env)
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let yaml = "server:\n  base_url: https://example.social\nlist:\n  limit: 0\n";
        assert!(FeedConfig::from_str_with_env(yaml, env).is_err());
    }

    #[test]
    fn test_env_refs_in_comments_are_ignored() {
        let yaml = "# token comes from ${UNSET}\nserver:\n  base_url: https://example.social\n";
        let config = FeedConfig::from_str_with_env(yaml, env).unwrap();
        assert!(config.server.access_token.is_none());
    }

    #[test]
    fn test_env_value_with_yaml_syntax_stays_a_string() {
        let lookup = |name: &str| (name == "TOKEN").then(|| "a: b # c".to_string());
        let yaml = "server:\n  base_url: https://example.social\n  access_token: ${TOKEN}\n";
        let config = FeedConfig::from_str_with_env(yaml, lookup).unwrap();
        assert_eq!(config.server.access_token.as_deref(), Some("a: b # c"));
    }

    #[test]
    fn test_env_value_fills_numeric_field() {
        let lookup = |name: &str| (name == "LIMIT").then(|| "25".to_string());
        let yaml = "server:\n  base_url: https://example.social\nlist:\n  limit: ${LIMIT}\n";
        let config = FeedConfig::from_str_with_env(yaml, lookup).unwrap();
        assert_eq!(config.list.limit, Some(25));
    }

    #[test]
    fn test_interpolate_env() {
        let out = interpolate_env("a ${TOKEN} b ${ TOKEN }", env).unwrap();
        assert_eq!(out, "a secret b secret");
        assert_eq!(interpolate_env("no refs $HOME", env).unwrap(), "no refs $HOME");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedpager.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "server:\n  base_url: https://example.social").unwrap();

        let config = FeedConfig::load(&path).unwrap();
        assert_eq!(config.server.base_url, "https://example.social");

        let missing = FeedConfig::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(missing, Error::FileNotFound { .. }));
    }
}
