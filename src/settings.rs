use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Process-wide defaults, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GlobalDefaults {
    pub base_url: Option<String>,
    pub assistant_id: Option<String>,
}

impl GlobalDefaults {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("BUFETEC_API_BASE_URL").ok(),
            assistant_id: std::env::var("BUFETEC_ASSISTANT_ID").ok(),
        }
    }
}

/// Per-conversation settings, supplied when a conversation is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ConversationSettings {
    pub base_url: Option<String>,
    pub assistant_id: Option<String>,
}

/// Caller-supplied overrides, e.g. command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RequestOverrides {
    pub base_url: Option<String>,
    pub assistant_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub base_url: String,
    pub assistant_id: String,
}

/// Precedence: request overrides, then conversation settings, then global
/// defaults, then built-in fallbacks.
pub fn resolve_effective_settings(
    global: &GlobalDefaults,
    conversation: &ConversationSettings,
    request: &RequestOverrides,
) -> EffectiveSettings {
    let base_url = request
        .base_url
        .clone()
        .or_else(|| conversation.base_url.clone())
        .or_else(|| global.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let assistant_id = request
        .assistant_id
        .clone()
        .or_else(|| conversation.assistant_id.clone())
        .or_else(|| global.assistant_id.clone())
        .unwrap_or_default();

    EffectiveSettings { base_url, assistant_id }
}
