use serde::Deserialize;
use std::path::Path;

use anyhow::Context;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

/// Connection details for the plan backend (a PostgREST-style CRUD API).
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// REST root, e.g. "https://project.supabase.co/rest/v1".
    pub base_url: String,
    pub service_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Static bearer token callers must present on /api/agent.
    /// An ephemeral token is generated at startup when unset.
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8642
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            auth_token: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [provider]
            api_key = "sk-test"

            [store]
            base_url = "https://db.example.com/rest/v1"
            service_key = "service-role-key"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.base_url, "https://api.openai.com/v1");
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(config.server.port, 8642);
        assert!(config.server.auth_token.is_none());
    }

    #[test]
    fn explicit_server_section_overrides_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [provider]
            api_key = "sk-test"
            model = "gpt-4o-mini"

            [store]
            base_url = "https://db.example.com/rest/v1"
            service_key = "k"

            [server]
            bind_addr = "0.0.0.0"
            port = 9000
            auth_token = "sekrit"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.auth_token.as_deref(), Some("sekrit"));
    }
}
