// src/config.rs
//! Secret/configuration loading. One `Secrets::load()` per invocation; the
//! value is passed by reference from the entrypoint, never cached globally.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Env var pointing at a JSON file holding the secret-store payload.
pub const ENV_SECRETS_PATH: &str = "DAEPIRO_SECRETS_PATH";

/// The secret-store payload, keyed exactly as the store hands it out.
#[derive(Debug, Clone, Deserialize)]
pub struct Secrets {
    #[serde(rename = "ADMIN_ACCESS_TOKEN")]
    pub admin_access_token: String,
    #[serde(rename = "API_SERVER_BASE_URL")]
    pub api_server_base_url: String,
    #[serde(rename = "DISASTER_MESSAGE_API_URL")]
    pub disaster_message_api_url: String,
    #[serde(rename = "DISASTER_MESSAGE_API_SERVICE_KEY")]
    pub disaster_message_api_service_key: String,
    #[serde(rename = "DISASTER_NEWS_URL")]
    pub disaster_news_url: String,
}

impl Secrets {
    /// Parse a secret-store payload file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(&path)
            .with_context(|| format!("reading secrets from {}", path.as_ref().display()))?;
        let mut cfg: Secrets = serde_json::from_str(&data).context("parsing secrets json")?;
        cfg.api_server_base_url = cfg.api_server_base_url.trim_end_matches('/').to_string();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolve secrets for this invocation:
    /// 1) $DAEPIRO_SECRETS_PATH (JSON payload file)
    /// 2) the same keys as individual environment variables
    pub fn load() -> Result<Self> {
        if let Ok(p) = env::var(ENV_SECRETS_PATH) {
            return Self::load_from_file(&p);
        }

        let get = |key: &str| {
            env::var(key).map_err(|_| anyhow!("missing secret {key} (env or {ENV_SECRETS_PATH})"))
        };
        let cfg = Secrets {
            admin_access_token: get("ADMIN_ACCESS_TOKEN")?,
            api_server_base_url: get("API_SERVER_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            disaster_message_api_url: get("DISASTER_MESSAGE_API_URL")?,
            disaster_message_api_service_key: get("DISASTER_MESSAGE_API_SERVICE_KEY")?,
            disaster_news_url: get("DISASTER_NEWS_URL")?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.admin_access_token.trim().is_empty() {
            return Err(anyhow!("ADMIN_ACCESS_TOKEN is empty"));
        }
        if self.api_server_base_url.trim().is_empty() {
            return Err(anyhow!("API_SERVER_BASE_URL is empty"));
        }
        Ok(())
    }
}
