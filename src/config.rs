use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_COMPLETION_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_SEARCH_URL: &str = "https://api.semanticscholar.org/graph/v1/paper/search";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_SEARCH_LIMIT: u8 = 10;
pub const DEFAULT_CONTEXT_LIMIT: usize = 7;
/// Upper bound accepted by the paper search endpoint for `limit`.
const MAX_SEARCH_LIMIT: u8 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GROQ_API_KEY not set. Export it or put it in a secrets file passed with --secrets")]
    ApiKeyNotSet,

    #[error("cannot read secrets file {path}: {source}")]
    SecretsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid secrets file: {0}")]
    SecretsParse(#[from] toml::de::Error),

    #[error("invalid {name} URL '{value}': {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        source: url::ParseError,
    },

    #[error("invalid {name}: {message}")]
    InvalidLimit {
        name: &'static str,
        message: String,
    },
}

/// Credential wrapper that never prints its value.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: ApiKey,
    pub model: String,
    pub endpoint: Url,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct LiteratureConfig {
    pub endpoint: Url,
    pub api_key: Option<ApiKey>,
    /// Number of records requested from the search endpoint.
    pub search_limit: u8,
    /// Number of abstract-bearing records embedded in the synthesis prompt.
    pub context_limit: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub completion: CompletionConfig,
    pub literature: LiteratureConfig,
}

/// Values supplied on the command line; they win over every other source.
#[derive(Debug, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub search_limit: Option<u8>,
    pub context_limit: Option<usize>,
    pub secrets: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "GROQ_API_KEY")]
    groq_api_key: Option<String>,
    #[serde(rename = "SEMANTIC_SCHOLAR_API_KEY")]
    semantic_scholar_api_key: Option<String>,
}

impl Config {
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::from_sources(|name| std::env::var(name).ok(), overrides)
    }

    /// Resolution order: overrides, then the secrets file, then `env`.
    pub fn from_sources(
        env: impl Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        let secrets = match &overrides.secrets {
            Some(path) => read_secrets(path)?,
            None => SecretsFile::default(),
        };
        let lookup = |name: &str| env(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = secrets
            .groq_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .or_else(|| lookup("GROQ_API_KEY"))
            .ok_or(ConfigError::ApiKeyNotSet)?;

        let model = overrides
            .model
            .clone()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .or_else(|| lookup("GROQ_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let completion_url = parse_url(
            "completion endpoint",
            lookup("GROQ_API_URL").as_deref().unwrap_or(DEFAULT_COMPLETION_URL),
        )?;
        let search_url = parse_url(
            "search endpoint",
            lookup("SEMANTIC_SCHOLAR_API_URL")
                .as_deref()
                .unwrap_or(DEFAULT_SEARCH_URL),
        )?;

        let search_api_key = secrets
            .semantic_scholar_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .or_else(|| lookup("SEMANTIC_SCHOLAR_API_KEY"))
            .map(ApiKey::new);

        let search_limit = overrides.search_limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        if search_limit == 0 || search_limit > MAX_SEARCH_LIMIT {
            return Err(ConfigError::InvalidLimit {
                name: "search limit",
                message: format!("must be between 1 and {MAX_SEARCH_LIMIT}, got {search_limit}"),
            });
        }
        let context_limit = overrides.context_limit.unwrap_or(DEFAULT_CONTEXT_LIMIT);
        if context_limit == 0 {
            return Err(ConfigError::InvalidLimit {
                name: "context limit",
                message: "must be at least 1".to_string(),
            });
        }
        if context_limit > search_limit as usize {
            warn!(
                context_limit,
                search_limit, "context limit exceeds search limit; at most search-limit papers will be used"
            );
        }

        debug!(%model, search_limit, context_limit, "configuration loaded");

        Ok(Self {
            completion: CompletionConfig {
                api_key: ApiKey::new(api_key),
                model,
                endpoint: completion_url,
                temperature: DEFAULT_TEMPERATURE,
            },
            literature: LiteratureConfig {
                endpoint: search_url,
                api_key: search_api_key,
                search_limit,
                context_limit,
            },
        })
    }
}

fn read_secrets(path: &Path) -> Result<SecretsFile, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::SecretsRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&text)?)
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })
}
