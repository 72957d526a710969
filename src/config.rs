//! Environment-driven configuration

use crate::attention::AttentionConfig;
use crate::runtime::WidgetConfig;
use std::str::FromStr;
use std::time::Duration;

/// Process configuration with sensible defaults; every knob has an
/// environment override.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// The assistant endpoint the gateway posts turns to.
    pub assistant_url: String,
    /// Name of the env var holding the bearer token, read at call time.
    pub token_env_var: String,
    pub request_timeout: Duration,
    pub widget: WidgetConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let widget = WidgetConfig {
            attention: AttentionConfig {
                arm_delay: Duration::from_secs(env_parse("TRIPMATE_ATTENTION_ARM_SECS", 20)),
                show_duration: Duration::from_secs(env_parse("TRIPMATE_ATTENTION_SHOW_SECS", 3)),
                cooldown: Duration::from_secs(env_parse("TRIPMATE_ATTENTION_COOLDOWN_SECS", 30)),
            },
            handoff_delay: Duration::from_millis(env_parse("TRIPMATE_HANDOFF_DELAY_MS", 400)),
        };

        Self {
            port: env_parse("TRIPMATE_PORT", 8090),
            assistant_url: std::env::var("TRIPMATE_ASSISTANT_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api/chatbot/message".to_string()),
            token_env_var: "TRIPMATE_API_TOKEN".to_string(),
            request_timeout: Duration::from_secs(env_parse("TRIPMATE_REQUEST_TIMEOUT_SECS", 30)),
            widget,
        }
    }
}

fn env_parse<T: FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
