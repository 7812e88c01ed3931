use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::provider::ProviderId;

/// Environment variable holding the Tavily API key.
pub const API_KEY_ENV: &str = "TAVILY_API_KEY";
/// Environment variable toggling mock mode.
pub const MOCK_ENV: &str = "MOCK_TAVILY";

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,

    /// Overrides the provider's public endpoint, mostly useful for proxies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Optional provider id; "tavily" when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,

    /// Answer every lookup with canned data when no client is available.
    #[serde(default)]
    pub mock: bool,

    /// Example TOML:
    /// [providers.tavily]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Return the configured provider as a strongly-typed ProviderId.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            None => Ok(ProviderId::Tavily),
            Some(s) => ProviderId::try_from(s),
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "city-hub", "city-hub")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace a provider API key, keeping its other settings.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.entry(provider_id.as_str().to_string()).or_default().api_key = api_key;
    }

    /// Returns the API key for a provider, if a non-blank one is present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Settings the process runs with, after layering the environment over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// `None` when the configured provider id is not supported by this build.
    pub provider: Option<ProviderId>,
    pub api_key: Option<String>,
    pub mock: bool,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Layer `env` over `config`. `env` is a lookup so callers can avoid touching
    /// the process environment.
    pub fn resolve<F>(config: &Config, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match config.default_provider_id() {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!(error = %err, "configured search provider is not available");
                None
            }
        };

        let file = provider.and_then(|id| config.provider_config(id));

        let api_key = env(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .or_else(|| provider.and_then(|id| config.provider_api_key(id)).map(str::to_owned));

        let mock = config.mock || env(MOCK_ENV).is_some_and(|v| is_truthy(&v));

        Settings {
            provider,
            api_key,
            mock,
            base_url: file.and_then(|cfg| cfg.base_url.clone()),
            timeout_secs: file.and_then(|cfg| cfg.timeout_secs),
        }
    }

    pub fn from_env(config: &Config) -> Self {
        Self::resolve(config, |key| std::env::var(key).ok())
    }

    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock |= mock;
        self
    }
}

/// `1`, `true` and `yes` (any case) switch a flag on; everything else is off.
pub fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_provider_is_tavily_when_not_set() {
        let cfg = Config::default();
        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::Tavily);
    }

    #[test]
    fn unknown_default_provider_errors() {
        let cfg = Config { default_provider: Some("bing".into()), ..Config::default() };
        let err = cfg.default_provider_id().unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn upsert_keeps_other_provider_settings() {
        let mut cfg = Config::default();
        cfg.providers.insert(
            "tavily".into(),
            ProviderConfig { api_key: "OLD".into(), base_url: Some("http://proxy".into()), timeout_secs: None },
        );

        cfg.upsert_provider_api_key(ProviderId::Tavily, "NEW".into());

        let provider = cfg.provider_config(ProviderId::Tavily).expect("provider must exist");
        assert_eq!(provider.api_key, "NEW");
        assert_eq!(provider.base_url.as_deref(), Some("http://proxy"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Tavily, "   ".into());
        assert_eq!(cfg.provider_api_key(ProviderId::Tavily), None);
    }

    #[test]
    fn parses_toml_file_layout() {
        let cfg = Config::from_toml(
            r#"
            mock = true

            [providers.tavily]
            api_key = "tvly-file"
            timeout_secs = 10
            "#,
        )
        .expect("valid toml");

        assert!(cfg.mock);
        assert_eq!(cfg.provider_api_key(ProviderId::Tavily), Some("tvly-file"));
        assert_eq!(cfg.provider_config(ProviderId::Tavily).unwrap().timeout_secs, Some(10));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Tavily, "tvly-file".into());

        let settings = Settings::resolve(&cfg, |key| {
            (key == API_KEY_ENV).then(|| "tvly-env".to_string())
        });

        assert_eq!(settings.api_key.as_deref(), Some("tvly-env"));
        assert_eq!(settings.provider, Some(ProviderId::Tavily));
    }

    #[test]
    fn empty_env_key_falls_back_to_file() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Tavily, "tvly-file".into());

        let settings = Settings::resolve(&cfg, |key| (key == API_KEY_ENV).then(String::new));

        assert_eq!(settings.api_key.as_deref(), Some("tvly-file"));
    }

    #[test]
    fn no_key_anywhere_resolves_to_none() {
        let settings = Settings::resolve(&Config::default(), no_env);
        assert_eq!(settings.api_key, None);
        assert!(!settings.mock);
    }

    #[test]
    fn mock_env_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", "yes", "Yes"] {
            let settings = Settings::resolve(&Config::default(), |key| {
                (key == MOCK_ENV).then(|| value.to_string())
            });
            assert!(settings.mock, "{value} should enable mock mode");
        }

        for value in ["0", "false", "no", "", "on"] {
            let settings = Settings::resolve(&Config::default(), |key| {
                (key == MOCK_ENV).then(|| value.to_string())
            });
            assert!(!settings.mock, "{value} should not enable mock mode");
        }
    }

    #[test]
    fn mock_flag_only_turns_mock_on() {
        let cfg = Config { mock: true, ..Config::default() };
        let settings = Settings::resolve(&cfg, no_env).with_mock(false);
        assert!(settings.mock);

        let settings = Settings::resolve(&Config::default(), no_env).with_mock(true);
        assert!(settings.mock);
    }

    #[test]
    fn unsupported_provider_resolves_without_provider() {
        let cfg = Config { default_provider: Some("bing".into()), ..Config::default() };
        let settings = Settings::resolve(&cfg, |key| {
            (key == API_KEY_ENV).then(|| "tvly-env".to_string())
        });

        assert_eq!(settings.provider, None);
        assert_eq!(settings.api_key.as_deref(), Some("tvly-env"));
    }
}
