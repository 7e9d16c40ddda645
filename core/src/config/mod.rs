use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CLANKER_DIR: &str = ".clanker";

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    /// Directory the file tools resolve relative paths against.
    #[serde(skip)]
    pub workspace_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: None,
            api_key: String::new(),
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            workspace_dir: PathBuf::from("."),
        }
    }
}

pub fn get_clanker_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(CLANKER_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_clanker_dir().join("config.toml")
}

pub fn ensure_clanker_dir() -> Result<PathBuf> {
    let clanker_dir = get_clanker_dir();

    if !clanker_dir.exists() {
        std::fs::create_dir_all(&clanker_dir).with_context(|| {
            format!(
                "Failed to create clanker directory at {}",
                clanker_dir.display()
            )
        })?;
    }

    Ok(clanker_dir)
}

impl Config {
    /// Config file when present, defaults otherwise, with `CLANKER_*`
    /// environment variables layered on top.
    pub fn load() -> Result<Self> {
        let mut config = if config_exists() {
            load_config()?
        } else {
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(provider) = non_empty("CLANKER_PROVIDER") {
            self.provider = Some(provider);
        }
        if let Some(model) = non_empty("CLANKER_MODEL") {
            self.model = model;
        }
        if let Some(base_url) = non_empty("CLANKER_BASE_URL") {
            self.base_url = Some(base_url);
        }
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path())
}

pub fn load_config_from(config_path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(config_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!(
                "Config file not found. Run 'clanker onboard' to set up your configuration."
            )
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", config_path.display(), e)
        }
    })?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    Ok(config)
}

pub fn save_config(config: &Config) -> Result<()> {
    ensure_clanker_dir()?;
    save_config_to(config, &get_config_path())
}

pub fn save_config_to(config: &Config, config_path: &Path) -> Result<()> {
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn defaults_target_gemini_in_current_dir() {
        let config = Config::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.provider.is_none());
        assert_eq!(config.workspace_dir, PathBuf::from("."));
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "provider = \"openai\"\napi_key = \"sk-test\"\n").unwrap();

        let config = load_config_from(&path).unwrap();

        assert_eq!(config.provider.as_deref(), Some("openai"));
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        let config = Config {
            provider: Some("gemini".into()),
            model: "gemini-2.5-pro".into(),
            ..Config::default()
        };

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.provider.as_deref(), Some("gemini"));
        assert_eq!(loaded.model, "gemini-2.5-pro");
    }

    #[test]
    fn missing_file_suggests_onboarding() {
        let tmp = TempDir::new().unwrap();
        let err = load_config_from(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("clanker onboard"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "model = [").unwrap();

        assert!(load_config_from(&path).is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CLANKER_MODEL", "gemini-2.5-flash"),
            ("CLANKER_BASE_URL", "http://localhost:8080"),
            ("CLANKER_PROVIDER", "  "),
        ]);
        let mut config = Config {
            provider: Some("gemini".into()),
            ..Config::default()
        };

        config.apply_env_with(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.provider.as_deref(), Some("gemini"));
    }
}
