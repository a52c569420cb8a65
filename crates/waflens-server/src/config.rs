//! Server configuration from environment variables. AI settings start
//! from the data directory's settings file; environment values override.

use std::net::SocketAddr;
use std::path::PathBuf;
use waflens_core::AiSettings;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    /// Bearer token accepted for local development; maps to a fixed dev
    /// session. Unset in real deployments.
    pub dev_token: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<ServerConfig, String> {
        let bind = std::env::var("WAFLENS_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind
            .parse()
            .map_err(|e| format!("invalid WAFLENS_BIND '{}': {}", bind, e))?;

        let data_dir = std::env::var("WAFLENS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| waflens_core::default_data_dir());

        Ok(ServerConfig {
            bind,
            data_dir,
            dev_token: std::env::var("WAFLENS_DEV_TOKEN").ok(),
        })
    }
}

/// Overlay AI settings with environment values, when present.
pub fn ai_settings_from_env(base: AiSettings) -> AiSettings {
    apply_ai_overrides(base, |name| std::env::var(name).ok())
}

fn apply_ai_overrides(
    mut settings: AiSettings,
    get: impl Fn(&str) -> Option<String>,
) -> AiSettings {
    if let Some(provider) = get("WAFLENS_AI_PROVIDER") {
        settings.provider = provider;
    }
    if let Some(model) = get("WAFLENS_AI_MODEL") {
        settings.model = model;
    }
    if let Some(api_key) = get("WAFLENS_AI_API_KEY") {
        settings.api_key = api_key;
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_settings_file_values() {
        let base = AiSettings {
            provider: "google".to_string(),
            api_key: "file-key".to_string(),
            model: "gemini-2.0-flash".to_string(),
        };
        let merged = apply_ai_overrides(base, |name| match name {
            "WAFLENS_AI_PROVIDER" => Some("anthropic".to_string()),
            "WAFLENS_AI_MODEL" => Some("claude-sonnet-4-5".to_string()),
            _ => None,
        });
        assert_eq!(merged.provider, "anthropic");
        assert_eq!(merged.model, "claude-sonnet-4-5");
        // untouched values survive
        assert_eq!(merged.api_key, "file-key");
    }

    #[test]
    fn no_overrides_keeps_the_file_settings() {
        let base = AiSettings {
            provider: "ollama".to_string(),
            api_key: String::new(),
            model: "llama3".to_string(),
        };
        let merged = apply_ai_overrides(base.clone(), |_| None);
        assert_eq!(merged.provider, base.provider);
        assert_eq!(merged.model, base.model);
    }
}
