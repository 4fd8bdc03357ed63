use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:3001";
pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct:free";
pub const DEFAULT_CONFIG_FILE: &str = "rqbot.toml";

/// Flat variable names the bot has always honoured, mapped onto nested keys.
///
/// Applied after the `RQBOT_*` layer so an existing `.env` keeps working.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("backend_url", "backend.base_url"),
    ("allow_from_me", "router.allow_from_me"),
    ("openrouter_api_key", "assistant.api_key"),
    ("openrouter_model", "assistant.model"),
    ("openrouter_referrer", "assistant.referrer"),
    ("openrouter_title", "assistant.title"),
    ("log_level", "log_level"),
    ("port", "gateway.port"),
];

/// Top-level config (rqbot.toml + RQBOT_* env overrides + legacy variables).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RqbotConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Ordered handler manifest. Names are resolved against the factories
    /// known to the gateway; unknown names are skipped with a warning.
    #[serde(default = "default_handlers")]
    pub handlers: Vec<String>,
    /// Tracing filter directive used when `RUST_LOG` is not set.
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for RqbotConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            assistant: AssistantConfig::default(),
            router: RouterConfig::default(),
            gateway: GatewayConfig::default(),
            handlers: default_handlers(),
            log_level: None,
        }
    }
}

/// Remote media-control backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    /// Per-request timeout. Every backend call inherits this bound.
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

/// OpenAI-compatible completion provider used by the assistant handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// When unset the assistant handler declines every event.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_assistant_base_url")]
    pub base_url: String,
    /// Sent as `HTTP-Referer`.
    #[serde(default = "default_referrer")]
    pub referrer: String,
    /// Sent as `X-Title`.
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_assistant_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_assistant_base_url(),
            referrer: default_referrer(),
            title: default_title(),
            timeout_secs: default_assistant_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Message router behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Process events the bot account sent itself.
    #[serde(default)]
    pub allow_from_me: bool,
    /// Minimum gap between two onboarding replies to the same sender.
    #[serde(default = "default_cooldown")]
    pub onboarding_cooldown_secs: u64,
    /// Page size of a free-text search (upper bound of a pending selection).
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    /// Maximum queue entries rendered in a `queue` reply.
    #[serde(default = "default_queue_render_limit")]
    pub queue_render_limit: usize,
    /// Directory imported audio files are written to.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            allow_from_me: false,
            onboarding_cooldown_secs: default_cooldown(),
            search_limit: default_search_limit(),
            queue_render_limit: default_queue_render_limit(),
            media_dir: default_media_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL of the chat bridge that owns the messaging session.
    #[serde(default = "default_bridge_url")]
    pub bridge_url: String,
    /// The bot's own participant id, compared against mention lists.
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Bearer token required on `POST /events`. `None` disables the check.
    #[serde(default)]
    pub ingress_token: Option<String>,
    #[serde(default = "default_bridge_timeout")]
    pub bridge_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            bridge_url: default_bridge_url(),
            bot_id: None,
            ingress_token: None,
            bridge_timeout_secs: default_bridge_timeout(),
        }
    }
}

fn default_handlers() -> Vec<String> {
    vec!["assistant".to_string()]
}
fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}
fn default_backend_timeout() -> u64 {
    15
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_assistant_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}
fn default_referrer() -> String {
    "http://localhost".to_string()
}
fn default_title() -> String {
    "RQ Assistente".to_string()
}
fn default_assistant_timeout() -> u64 {
    20
}
fn default_max_tokens() -> u32 {
    300
}
fn default_temperature() -> f32 {
    0.4
}
fn default_system_prompt() -> String {
    "Você é o \"RQ Assistente (Público)\". Responda com clareza e objetividade. Seja breve."
        .to_string()
}
fn default_cooldown() -> u64 {
    600
}
fn default_search_limit() -> usize {
    5
}
fn default_queue_render_limit() -> usize {
    10
}
fn default_media_dir() -> String {
    "media".to_string()
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bridge_url() -> String {
    DEFAULT_BRIDGE_URL.to_string()
}
fn default_bridge_timeout() -> u64 {
    10
}

impl RqbotConfig {
    /// Load config from a TOML file with env var overrides.
    ///
    /// File lookup: explicit path > `RQBOT_CONFIG` > `./rqbot.toml`.
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .or_else(|| std::env::var("RQBOT_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        Self::figment(&path)
            .extract()
            .map_err(|e| crate::error::RqbotError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        let legacy_keys: Vec<&str> = LEGACY_ENV.iter().map(|(k, _)| *k).collect();

        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("RQBOT_").split("__"))
            .merge(Env::raw().only(&legacy_keys).map(|key| {
                LEGACY_ENV
                    .iter()
                    .find(|(flat, _)| key.as_str().eq_ignore_ascii_case(flat))
                    .map(|(_, nested)| (*nested).into())
                    .unwrap_or_else(|| key.into())
            }))
    }

    /// Whether the assistant has credentials to call the provider.
    pub fn assistant_enabled(&self) -> bool {
        self.assistant
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}
