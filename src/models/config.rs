//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::SIMILARITY_THRESHOLD;

/// Default location of the optional YAML configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/default";

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_zmq_address")]
    pub zmq_address: String,
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f32,
    pub auth: AuthConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    pub mail: MailConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
    #[serde(default = "default_password_cost")]
    pub password_cost: u32,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    Gemini,
    Local,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingBackend,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_gemini_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::default(),
            model: default_embedding_model(),
            base_url: default_gemini_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Text generation settings used for improvement suggestions.
#[derive(Clone, Debug, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_gemini_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_generation_model(),
            base_url: default_gemini_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MailConfig {
    pub base_url: String,
    pub api_key: String,
    pub from: String,
    /// Minimum spacing between two outgoing mails.
    #[serde(default = "default_mail_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_mail_burst")]
    pub burst: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from `config/default.yaml` (optional) overlaid with
    /// `APP__`-prefixed environment variables, e.g. `APP__MAIL__API_KEY`.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }
}

fn default_database_url() -> String {
    "app.db".to_string()
}

fn default_zmq_address() -> String {
    "tcp://127.0.0.1:5556".to_string()
}

fn default_threshold() -> f32 {
    SIMILARITY_THRESHOLD
}

fn default_token_ttl_days() -> i64 {
    7
}

fn default_password_cost() -> u32 {
    10
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_generation_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_mail_interval_ms() -> u64 {
    5000
}

fn default_mail_burst() -> u32 {
    1
}
