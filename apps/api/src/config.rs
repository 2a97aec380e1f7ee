use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_INDEX_NAME: &str = "vecdb";
pub const DEFAULT_EMBED_MODEL: &str = "multilingual-e5-large";
pub const DEFAULT_INDEX_DIMENSION: usize = 1024;
pub const DEFAULT_COMMIT_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing credentials: required environment variable '{0}' is not set")]
    MissingCredentials(&'static str),

    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// API keys needed to reach the live backends.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub google_api_key: String,
    pub pinecone_api_key: String,
}

/// Which backend implementations the service is wired to.
/// Decided once from `ENABLE_LOCAL_TESTING`; nothing downstream re-reads the flag.
#[derive(Debug, Clone)]
pub enum BackendMode {
    /// Every external call is replaced by fixed sample data.
    LocalTesting,
    Live(Credentials),
}

impl BackendMode {
    pub fn is_local_testing(&self) -> bool {
        matches!(self, BackendMode::LocalTesting)
    }
}

#[derive(Debug, Clone)]
pub struct GithubSettings {
    pub api_url: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PineconeSettings {
    pub index_name: String,
    /// Data-plane host. Resolved from the control plane when unset.
    pub index_host: Option<String>,
    pub embed_model: String,
    pub dimension: usize,
}

impl PineconeSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(PineconeSettings {
            index_name: lookup("PINECONE_INDEX_NAME")
                .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
            index_host: lookup("PINECONE_INDEX_HOST"),
            embed_model: lookup("PINECONE_EMBED_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBED_MODEL.to_string()),
            dimension: parse_or(lookup, "PINECONE_INDEX_DIMENSION", DEFAULT_INDEX_DIMENSION)?,
        })
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if live mode is selected and a credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: BackendMode,
    pub github: GithubSettings,
    pub pinecone: PineconeSettings,
    pub commit_limit: usize,
    pub http_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let local_testing = match lookup("ENABLE_LOCAL_TESTING") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "ENABLE_LOCAL_TESTING",
                reason: format!("expected true or false, got '{raw}'"),
            })?,
            None => false,
        };

        let mode = if local_testing {
            BackendMode::LocalTesting
        } else {
            BackendMode::Live(Credentials {
                google_api_key: require(lookup, "GOOGLE_API_KEY")?,
                pinecone_api_key: require(lookup, "PINECONE_API_KEY")?,
            })
        };

        let timeout_secs: u64 = parse_or(lookup, "HTTP_TIMEOUT_SECS", 30)?;

        Ok(Config {
            mode,
            github: GithubSettings {
                api_url: lookup("GITHUB_API_URL")
                    .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
                token: lookup("GITHUB_TOKEN"),
            },
            pinecone: PineconeSettings::from_lookup(lookup)?,
            commit_limit: parse_or(lookup, "COMMIT_LIMIT", DEFAULT_COMMIT_LIMIT)?,
            http_timeout: Duration::from_secs(timeout_secs),
            port: parse_or(lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Reads a required variable, for binaries that only need one credential.
pub fn require_env(key: &'static str) -> Result<String, ConfigError> {
    dotenvy::dotenv().ok();
    require(&env_lookup, key)
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require(lookup: &dyn Fn(&str) -> Option<String>, key: &'static str) -> Result<String, ConfigError> {
    lookup(key).ok_or(ConfigError::MissingCredentials(key))
}

fn parse_or<T>(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
