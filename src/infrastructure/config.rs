use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::{Language, LanguageProfiles};

const DEFAULT_CONFIG: &str = include_str!("../../config/default.yaml");
const DEFAULT_PROMPTS: &str = include_str!("../../config/prompts.yaml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Missing API key(s): {0}")]
    MissingApiKeys(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub vector_store: VectorStoreConfig,
    pub rag: RagConfig,
    pub chat: ChatConfig,
    pub sessions: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    Anthropic,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Gemini,
    OpenAi,
}

impl EmbeddingProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
}

impl EmbeddingConfig {
    /// Identifier recorded next to the index.
    pub fn model_id(&self) -> String {
        format!("{}:{}", self.provider.as_str(), self.model)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VectorStoreConfig {
    pub url: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RagConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub max_message_chars: usize,
    pub history_turns: usize,
    pub max_turns: usize,
    pub default_language: Language,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_seconds: u64,
    pub max_sessions: usize,
    pub sweep_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    pub data_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct PromptsConfig {
    pub languages: LanguageProfiles,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    pub fn from_yaml(config: &str, prompts: &str) -> Result<Self, ConfigError> {
        let app = Self {
            config: serde_yaml::from_str(config)?,
            prompts: serde_yaml::from_str(prompts)?,
        };
        app.validate()?;
        Ok(app)
    }

    /// Loads `default.yaml` and `prompts.yaml` from `dir`; either file may be
    /// absent, in which case the built-in copy is used.
    pub fn from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let config = read_or(dir.join("default.yaml"), DEFAULT_CONFIG)?;
        let prompts = read_or(dir.join("prompts.yaml"), DEFAULT_PROMPTS)?;
        Self::from_yaml(&config, &prompts)
    }

    /// Built-in defaults, then `CONFIG_DIR`, then individual env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut app = match std::env::var("CONFIG_DIR") {
            Ok(dir) => Self::from_dir(Path::new(&dir))?,
            Err(_) => Self::default(),
        };
        app.config.apply_env(|key| std::env::var(key).ok())?;
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.config;
        if c.chat.max_message_chars == 0 {
            return Err(ConfigError::Invalid("chat.max_message_chars must be > 0".into()));
        }
        if c.chat.history_turns > c.chat.max_turns {
            return Err(ConfigError::Invalid(
                "chat.history_turns must not exceed chat.max_turns".into(),
            ));
        }
        if c.rag.top_k == 0 {
            return Err(ConfigError::Invalid("rag.top_k must be > 0".into()));
        }
        if c.ingest.chunk_size == 0 || c.ingest.chunk_overlap >= c.ingest.chunk_size {
            return Err(ConfigError::Invalid(
                "ingest.chunk_overlap must be smaller than a non-zero ingest.chunk_size".into(),
            ));
        }
        if c.ingest.batch_size == 0 {
            return Err(ConfigError::Invalid("ingest.batch_size must be > 0".into()));
        }
        if c.rate_limit.requests_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.requests_per_minute must be > 0".into(),
            ));
        }
        if !self.prompts.languages.contains_key(&c.chat.default_language) {
            return Err(ConfigError::Invalid(format!(
                "no prompt profile for default language {}",
                c.chat.default_language
            )));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: serde_yaml::from_str(DEFAULT_CONFIG)
                .unwrap_or_else(|e| panic!("built-in default.yaml is invalid: {e}")),
            prompts: serde_yaml::from_str(DEFAULT_PROMPTS)
                .unwrap_or_else(|e| panic!("built-in prompts.yaml is invalid: {e}")),
        }
    }
}

impl Config {
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("SERVER_PORT") {
            self.server.port = parse_env("SERVER_PORT", port)?;
        }
        if let Some(url) = var("QDRANT_URL") {
            self.vector_store.url = url;
        }
        if let Some(collection) = var("QDRANT_COLLECTION") {
            self.vector_store.collection = collection;
        }
        if let Some(provider) = var("LLM_PROVIDER") {
            self.llm.provider = parse_enum("LLM_PROVIDER", provider)?;
        }
        if let Some(model) = var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(provider) = var("EMBEDDING_PROVIDER") {
            self.embedding.provider = parse_enum("EMBEDDING_PROVIDER", provider)?;
        }
        if let Some(model) = var("EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(dir) = var("DATA_DIR") {
            self.ingest.data_dir = PathBuf::from(dir);
        }
        if let Some(rpm) = var("RATE_LIMIT_PER_MINUTE") {
            self.rate_limit.requests_per_minute = parse_env("RATE_LIMIT_PER_MINUTE", rpm)?;
        }
        if let Some(origins) = var("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }

    pub fn embedding_api_key(&self) -> &'static str {
        match self.embedding.provider {
            EmbeddingProvider::Gemini => "GEMINI_API_KEY",
            EmbeddingProvider::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Environment variables the configured providers read their keys from.
    pub fn required_api_keys(&self) -> Vec<&'static str> {
        let mut keys = vec![match self.llm.provider {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }];
        let embedding_key = self.embedding_api_key();
        if !keys.contains(&embedding_key) {
            keys.push(embedding_key);
        }
        keys
    }
}

/// Alternative names accepted for a provider key.
pub const API_KEY_ALIASES: &[(&str, &str)] = &[("GEMINI_API_KEY", "GOOGLE_API_KEY")];

/// Fails listing every key in `keys` absent from the environment.
pub fn check_api_keys(
    keys: &[&'static str],
    var: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let set = |k: &str| var(k).is_some_and(|v| !v.trim().is_empty());
    let present = |key: &str| {
        set(key)
            || API_KEY_ALIASES
                .iter()
                .any(|(name, alias)| *name == key && set(alias))
    };

    let missing: Vec<&str> = keys.iter().copied().filter(|key| !present(key)).collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingApiKeys(missing.join(", ")))
    }
}

fn read_or(path: PathBuf, fallback: &str) -> Result<String, ConfigError> {
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(fallback.to_string()),
        Err(source) => Err(ConfigError::Io { path, source }),
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Env { key, value })
}

fn parse_enum<T: serde::de::DeserializeOwned>(
    key: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    serde_yaml::from_str(&value.to_lowercase()).map_err(|_| ConfigError::Env { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_defaults_are_valid() {
        let app = AppConfig::default();
        app.validate().unwrap();

        assert_eq!(app.config.rag.top_k, 3);
        assert_eq!(app.config.chat.max_message_chars, 500);
        assert_eq!(app.config.chat.max_turns, 10);
        assert_eq!(app.config.chat.history_turns, 3);
        assert_eq!(app.config.rate_limit.requests_per_minute, 20);
        assert_eq!(app.config.ingest.chunk_size, 1000);
        assert_eq!(app.config.ingest.chunk_overlap, 100);
        assert_eq!(app.config.ingest.batch_size, 64);
    }

    #[test]
    fn test_every_language_has_a_profile() {
        let app = AppConfig::default();
        for lang in Language::ALL {
            let profile = &app.prompts.languages[&lang];
            assert!(profile.template.contains("{context}"));
            assert!(profile.template.contains("{history}"));
            assert!(profile.template.contains("{question}"));
            assert!(!profile.detailed_triggers.is_empty());
            assert!(!profile.topic_keywords.is_empty());
        }
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default().config;
        config
            .apply_env(|key| match key {
                "SERVER_PORT" => Some("9000".into()),
                "LLM_PROVIDER" => Some("Anthropic".into()),
                "EMBEDDING_PROVIDER" => Some("openai".into()),
                "CORS_ALLOWED_ORIGINS" => Some("https://a.example, https://b.example".into()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.provider, LlmProvider::Anthropic);
        assert_eq!(config.embedding.provider, EmbeddingProvider::OpenAi);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(
            config.required_api_keys(),
            vec!["ANTHROPIC_API_KEY", "OPENAI_API_KEY"]
        );
    }

    #[test]
    fn test_api_key_check_accepts_alias() {
        let keys = AppConfig::default().config.required_api_keys();
        assert_eq!(keys, vec!["GEMINI_API_KEY"]);

        let err = check_api_keys(&keys, |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKeys(ref k) if k == "GEMINI_API_KEY"));

        check_api_keys(&keys, |key| (key == "GOOGLE_API_KEY").then(|| "k".to_string())).unwrap();
        assert!(
            check_api_keys(&keys, |key| (key == "GEMINI_API_KEY").then(|| "  ".to_string()))
                .is_err()
        );
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let mut config = AppConfig::default().config;
        let err = config
            .apply_env(|key| (key == "SERVER_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "SERVER_PORT", .. }));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let mut app = AppConfig::default();
        app.config.ingest.chunk_overlap = app.config.ingest.chunk_size;
        assert!(matches!(app.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_default_profile_is_rejected() {
        let mut app = AppConfig::default();
        app.prompts.languages.remove(&Language::English);
        assert!(app.validate().is_err());
    }
}
