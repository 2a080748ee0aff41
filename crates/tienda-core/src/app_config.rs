use std::net::SocketAddr;
use std::path::PathBuf;

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Settings for the hosted-LLM path of the chat assistant.
#[derive(Clone)]
pub struct ChatConfig {
    /// When false the assistant answers from the local responder only.
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Ranked offer groups included in the system prompt.
    pub offer_limit: usize,
    /// Sent as `HTTP-Referer` so the provider can attribute traffic.
    pub referer: String,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("offer_limit", &self.offer_limit)
            .field("referer", &self.referer)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub data_dir: PathBuf,
    pub catalog_path: PathBuf,
    /// Reference point used when the shopper has not shared a location.
    pub default_location: Coordinate,
    pub chat: ChatConfig,
    pub geocoder_url: String,
    pub geocoder_timeout_secs: u64,
    pub user_agent: String,
}
