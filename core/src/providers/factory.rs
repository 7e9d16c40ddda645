use crate::config::{Config, DEFAULT_MODEL};
use crate::providers::{GeminiProvider, OpenAIProvider};
use crate::traits::Provider;
use anyhow::{Result, anyhow};
use std::sync::Arc;

const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    create_provider_with_env(config, |name| std::env::var(name).ok())
}

fn create_provider_with_env(
    config: &Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn Provider>> {
    let provider_name = config.provider.as_deref().unwrap_or("gemini");

    match provider_name.to_lowercase().as_str() {
        "gemini" | "google" => {
            let api_key = resolve_api_key_with_fallback(
                &["GEMINI_API_KEY", "GOOGLE_API_KEY", "CLANKER_GEMINI_API_KEY"],
                &config.api_key,
                &lookup,
            )?;
            let mut provider = GeminiProvider::new(api_key).with_model(config.model.clone());
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        "openai" => {
            let api_key = resolve_api_key_with_fallback(
                &["OPENAI_API_KEY", "CLANKER_OPENAI_API_KEY"],
                &config.api_key,
                &lookup,
            )?;
            // A config that never named a model still carries the Gemini default.
            let model = if config.model == DEFAULT_MODEL {
                OPENAI_DEFAULT_MODEL
            } else {
                config.model.as_str()
            };
            let mut provider = OpenAIProvider::new(api_key).with_model(model);
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        _ => Err(anyhow!(
            "Unknown provider: {}. Available: gemini, openai",
            provider_name
        )),
    }
}

fn resolve_api_key_with_fallback(
    env_vars: &[&str],
    config_key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<String> {
    for var_name in env_vars {
        if let Some(key) = lookup(var_name).filter(|k| !k.trim().is_empty()) {
            return Ok(key);
        }
    }
    if !config_key.is_empty() {
        Ok(config_key.to_string())
    } else {
        Err(anyhow!(
            "No API key found. Set {} or run 'clanker onboard'.",
            env_vars.join(" or ")
        ))
    }
}
