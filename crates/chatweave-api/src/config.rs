use chatweave_llm::ProviderConfig;
use chatweave_types::{ArbitratorConfig, ClassifierConfig, PipelineConfig};
use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub mongodb: MongoDbConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    pub log: LogConfig,
    #[serde(default)]
    pub engine: EngineConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub llm_api_key: String,
    #[serde(default)]
    pub telegram_bot_token: String,
    #[serde(default)]
    pub telegram_webhook_secret: Option<String>,
    #[serde(default)]
    pub mongodb_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// "gemini" or "openai"
    #[serde(default = "default_provider")]
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl LlmConfig {
    pub fn provider_config(&self, api_key: &str) -> ProviderConfig {
        let mut provider = match self.provider.as_str() {
            "openai" => ProviderConfig::openai(api_key, &self.model),
            _ => ProviderConfig::gemini(api_key, &self.model),
        };
        if let Some(base_url) = &self.base_url {
            provider = provider.with_base_url(base_url);
        }
        if let Some(temperature) = self.temperature {
            provider = provider.with_temperature(temperature);
        }
        provider
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api")]
    pub api: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api: default_telegram_api(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

/// Optional overrides of the engine thresholds. Unset values keep the engine defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    pub min_probability: Option<f64>,
    pub summary_interval: Option<usize>,
    pub suggestion_bonus: Option<f64>,
    pub parallel_evaluation: Option<bool>,
    pub context_window: Option<usize>,
    pub processing_timeout_secs: Option<u64>,
}

impl EngineConfig {
    pub fn classifier(&self) -> ClassifierConfig {
        let mut config = ClassifierConfig::default();
        if let Some(p) = self.min_probability {
            config = config.with_min_probability(p);
        }
        if let Some(n) = self.summary_interval {
            config = config.with_summary_interval(n);
        }
        config
    }

    pub fn arbitrator(&self) -> ArbitratorConfig {
        let mut config = ArbitratorConfig::default();
        if let Some(bonus) = self.suggestion_bonus {
            config = config.with_suggestion_bonus(bonus);
        }
        if let Some(parallel) = self.parallel_evaluation {
            config = config.with_parallel_evaluation(parallel);
        }
        config
    }

    pub fn pipeline(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        if let Some(window) = self.context_window {
            config = config.with_context_window(window);
        }
        if let Some(secs) = self.processing_timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

fn default_timeout() -> u64 {
    60
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_telegram_api() -> String {
    TELEGRAM_API_BASE.to_string()
}

fn env_section(prefix: &str) -> Environment {
    // Keeps the prefix as the section name: SERVER_PORT -> server.port.
    // Only single-word keys can be overridden this way.
    Environment::with_prefix(prefix)
        .keep_prefix(true)
        .separator("_")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_, MONGODB_, LLM_, LOG_, TELEGRAM_ prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(env_section("SERVER"))
            .add_source(env_section("MONGODB"))
            .add_source(env_section("LLM"))
            .add_source(env_section("LOG"))
            .add_source(env_section("TELEGRAM"));

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets come from ENV only (not in TOML)
        cfg.llm_api_key = required_env("LLM_API_KEY")?;
        cfg.telegram_bot_token = required_env("TELEGRAM_BOT_TOKEN")?;
        cfg.telegram_webhook_secret = optional_env("TELEGRAM_WEBHOOK_SECRET");
        cfg.mongodb_uri = optional_env("MONGODB_URI");

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));
        builder.build()?.try_deserialize()
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    optional_env(name)
        .ok_or_else(|| ConfigError::Message(format!("{} environment variable is required", name)))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
