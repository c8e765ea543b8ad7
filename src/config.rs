use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Default cumulative character bound for one chunk.
pub const DEFAULT_CHUNK_CHAR_LIMIT: usize = 3000;

/// Default token budget applied to single-shot raw-text requests.
pub const DEFAULT_MAX_INPUT_TOKENS: usize = 1024;

/// Runtime configuration for the briefly server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Provider used to generate summary text.
    pub summarizer_provider: SummarizerProvider,
    /// Model identifier passed to the provider.
    pub summarizer_model: String,
    /// Credential for the hosted OpenAI API; required when the provider is `openai`.
    pub openai_api_key: Option<String>,
    /// Optional endpoint override for the hosted API (proxies, tests).
    pub openai_base_url: Option<String>,
    /// Optional base URL of the local Ollama runtime.
    pub ollama_url: Option<String>,
    /// Cumulative character bound per chunk.
    pub chunk_char_limit: usize,
    /// Token budget for single-shot raw-text requests.
    pub max_input_tokens: usize,
    /// Which handler style backs `POST /summarize`.
    pub summarize_mode: SummarizeMode,
    /// Allowed CORS origin for browser clients.
    pub frontend_url: Option<String>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported summarization backends.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerProvider {
    /// Local Ollama runtime.
    Ollama,
    /// Hosted OpenAI chat-completions API.
    OpenAI,
}

/// Handler style mounted at `POST /summarize`.
///
/// The sync and deferred variants both claim the same route, so one process
/// serves one of them; `/ws` and `/status/{task_id}` are always available.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SummarizeMode {
    /// Run the pipeline inline and answer with the summary.
    Sync,
    /// Hand the work to the job tracker and answer with a task id.
    Deferred,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let summarizer_provider: SummarizerProvider = load_env("SUMMARIZER_PROVIDER")?
            .parse()
            .map_err(|()| ConfigError::InvalidValue("SUMMARIZER_PROVIDER".to_string()))?;
        let openai_api_key = load_env_optional("OPENAI_API_KEY");
        if summarizer_provider == SummarizerProvider::OpenAI && openai_api_key.is_none() {
            return Err(ConfigError::MissingVariable("OPENAI_API_KEY".to_string()));
        }

        let chunk_char_limit =
            parse_optional("CHUNK_CHAR_LIMIT")?.unwrap_or(DEFAULT_CHUNK_CHAR_LIMIT);
        if chunk_char_limit == 0 {
            return Err(ConfigError::InvalidValue("CHUNK_CHAR_LIMIT".to_string()));
        }

        Ok(Self {
            summarizer_provider,
            summarizer_model: load_env("SUMMARIZER_MODEL")?,
            openai_api_key,
            openai_base_url: load_env_optional("OPENAI_BASE_URL"),
            ollama_url: load_env_optional("OLLAMA_URL"),
            chunk_char_limit,
            max_input_tokens: parse_optional("MAX_INPUT_TOKENS")?
                .unwrap_or(DEFAULT_MAX_INPUT_TOKENS),
            summarize_mode: match load_env_optional("SUMMARIZE_MODE") {
                Some(value) => value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("SUMMARIZE_MODE".to_string()))?,
                None => SummarizeMode::Sync,
            },
            frontend_url: load_env_optional("FRONTEND_URL"),
            server_port: parse_optional("SERVER_PORT")?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for SummarizerProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            _ => Err(()),
        }
    }
}

impl std::str::FromStr for SummarizeMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sync" => Ok(Self::Sync),
            "deferred" => Ok(Self::Deferred),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        provider = ?config.summarizer_provider,
        model = %config.summarizer_model,
        mode = ?config.summarize_mode,
        chunk_char_limit = config.chunk_char_limit,
        max_input_tokens = config.max_input_tokens,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
