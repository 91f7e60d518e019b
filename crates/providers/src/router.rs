//! Pick the model client the configuration asks for.

use std::sync::Arc;

use mythos_config::AppConfig;
use mythos_core::error::ProviderError;
use mythos_core::provider::Provider;
use tracing::info;

use crate::{GeminiProvider, ReverseProxyProvider};

/// An enabled reverse proxy wins over a direct API key.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    if config.proxy.is_enabled() {
        info!(proxy = %config.proxy.name, "Routing requests through reverse proxy");
        return Ok(Arc::new(ReverseProxyProvider::new(
            config.proxy.name.clone(),
            config.proxy.url.clone(),
            config.proxy.password.clone(),
        )));
    }

    match config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => {
            info!(model = %config.model, "Using direct Gemini API");
            Ok(Arc::new(GeminiProvider::new(key)))
        }
        None => Err(ProviderError::NotConfigured(
            "set api_key in config.toml, GEMINI_API_KEY, or configure a proxy".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_credentials_is_not_configured() {
        let config = AppConfig::default();
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn api_key_selects_gemini() {
        let config = AppConfig {
            api_key: Some("AIza-test".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn enabled_proxy_takes_precedence() {
        let mut config = AppConfig {
            api_key: Some("AIza-test".into()),
            ..AppConfig::default()
        };
        config.proxy.name = "Tawa".into();
        config.proxy.url = "https://proxy.example/v1".into();

        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "proxy:Tawa");
    }

    #[test]
    fn blank_key_is_ignored() {
        let config = AppConfig {
            api_key: Some("   ".into()),
            ..AppConfig::default()
        };
        assert!(build_from_config(&config).is_err());
    }
}
