// Configuration loader
// Loads provider keys from ~/.solace/config.toml or environment variables

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use super::settings::Config;

/// Load configuration from the Solace config file, then let environment
/// variables fill any keys the file leaves empty. The server runs without
/// any provider keys, degrading to lexicon sentiment and canned replies.
pub fn load_config() -> Result<Config> {
    let mut config = match try_load_from_file()? {
        Some(config) => config,
        None => Config::new(),
    };

    if config.gemini_api_key.is_none() {
        config.gemini_api_key = non_empty_env("GEMINI_API_KEY");
    }
    if config.sentiment_api_key.is_none() {
        config.sentiment_api_key = non_empty_env("GOOGLE_NL_API_KEY");
    }
    if config.speech_api_key.is_none() {
        config.speech_api_key = non_empty_env("GOOGLE_SPEECH_API_KEY");
    }

    if config.gemini_api_key.is_none() {
        tracing::warn!("No Gemini API key configured; chat replies will use canned fallbacks");
    }
    if config.sentiment_api_key.is_none() {
        tracing::warn!("No sentiment API key configured; using lexicon fallback scoring");
    }

    Ok(config)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn try_load_from_file() -> Result<Option<Config>> {
    let Some(home) = dirs::home_dir() else {
        return Ok(None);
    };
    let config_path = home.join(".solace/config.toml");

    if !config_path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;

    parse_config(&contents).map(Some)
}

fn parse_config(contents: &str) -> Result<Config> {
    #[derive(Debug, Default, serde::Deserialize)]
    struct TomlProviders {
        gemini_api_key: Option<String>,
        gemini_model: Option<String>,
        sentiment_api_key: Option<String>,
        speech_api_key: Option<String>,
    }

    #[derive(Debug, Default, serde::Deserialize)]
    struct TomlStorage {
        alert_db_path: Option<PathBuf>,
        crisis_keywords_path: Option<PathBuf>,
    }

    #[derive(Debug, serde::Deserialize)]
    struct TomlConfig {
        #[serde(default)]
        providers: TomlProviders,
        #[serde(default)]
        storage: TomlStorage,
    }

    let toml_config: TomlConfig =
        toml::from_str(contents).context("Failed to parse config.toml")?;

    let mut config = Config::new();
    config.gemini_api_key = toml_config.providers.gemini_api_key;
    config.gemini_model = toml_config.providers.gemini_model;
    config.sentiment_api_key = toml_config.providers.sentiment_api_key;
    config.speech_api_key = toml_config.providers.speech_api_key;
    config.crisis_keywords_path = toml_config.storage.crisis_keywords_path;
    if let Some(path) = toml_config.storage.alert_db_path {
        config.alert_db_path = path;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [providers]
            gemini_api_key = "g-key"
            gemini_model = "gemini-1.5-pro"
            sentiment_api_key = "nl-key"

            [storage]
            alert_db_path = "/tmp/solace-alerts"
            "#,
        )
        .unwrap();

        assert_eq!(config.gemini_api_key.as_deref(), Some("g-key"));
        assert_eq!(config.gemini_model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(config.sentiment_api_key.as_deref(), Some("nl-key"));
        assert!(config.speech_api_key.is_none());
        assert_eq!(config.alert_db_path, PathBuf::from("/tmp/solace-alerts"));
    }

    #[test]
    fn test_empty_file_is_valid() {
        let config = parse_config("").unwrap();
        assert!(config.gemini_api_key.is_none());
        assert!(config.alert_db_path.ends_with("alerts"));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(parse_config("providers = [unclosed").is_err());
    }
}
