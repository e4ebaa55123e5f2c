//! Configuration - `$SESAMI_HOME/config.json` overlaid with flags and env vars

use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";

/// Label recorded in the lock history when none is given
pub const DEFAULT_HISTORY_LABEL: &str = "sesami";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine home directory, set SESAMI_HOME")]
    NoHome,
    #[error("config file already exists at {0}")]
    AlreadyExists(PathBuf),
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid secret key: {0}")]
    InvalidKey(String),
    #[error("missing {0}, pass it as a flag, an env var or in config.json")]
    Missing(&'static str),
}

/// On-disk configuration; every field may also come from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Values given on the command line (clap already folds in env vars)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub device_id: Option<String>,
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
    pub base_url: Option<String>,
    pub history_label: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// SESAMI_HOME, or `~/.sesami`
pub fn sesami_home() -> Result<PathBuf, ConfigError> {
    if let Ok(home) = std::env::var("SESAMI_HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir()
        .map(|h| h.join(".sesami"))
        .ok_or(ConfigError::NoHome)
}

impl Config {
    /// Read a config file. A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Command line values win over the file
    pub fn merge(self, overrides: Overrides) -> Self {
        Self {
            device_id: overrides.device_id.or(self.device_id),
            api_key: overrides.api_key.or(self.api_key),
            secret_key: overrides.secret_key.or(self.secret_key),
            base_url: overrides.base_url.or(self.base_url),
            history_label: overrides.history_label.or(self.history_label),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
        }
    }

    pub fn device_id(&self) -> Result<&str, ConfigError> {
        self.device_id
            .as_deref()
            .ok_or(ConfigError::Missing("device id"))
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::Missing("api key"))
    }

    pub fn secret_key(&self) -> Result<&str, ConfigError> {
        self.secret_key
            .as_deref()
            .ok_or(ConfigError::Missing("secret key"))
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(sesami_proto::DEFAULT_BASE_URL)
    }

    pub fn history_label(&self) -> &str {
        self.history_label
            .as_deref()
            .unwrap_or(DEFAULT_HISTORY_LABEL)
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_secs.map(std::time::Duration::from_secs)
    }
}

/// Write a new config file, refusing to overwrite an existing one
pub fn init_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(key) = config.secret_key.as_deref() {
        key.parse::<sesami_proto::SecretKey>()
            .map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
    }

    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";

    fn sample() -> Config {
        Config {
            device_id: Some("dev-from-file".to_string()),
            api_key: Some("key-from-file".to_string()),
            secret_key: Some(KEY.to_string()),
            base_url: None,
            history_label: Some("hallway".to_string()),
            timeout_secs: Some(10),
        }
    }

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url(), "https://app.candyhouse.co");
        assert_eq!(config.history_label(), DEFAULT_HISTORY_LABEL);
        assert!(matches!(config.device_id(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home").join(CONFIG_FILE);
        init_config(&path, &sample()).unwrap();
        assert_eq!(Config::load(&path).unwrap(), sample());
        assert_eq!(
            Config::load(&path).unwrap().timeout(),
            Some(std::time::Duration::from_secs(10))
        );
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        init_config(&path, &sample()).unwrap();
        assert!(matches!(
            init_config(&path, &Config::default()),
            Err(ConfigError::AlreadyExists(_))
        ));
    }

    #[test]
    fn init_rejects_bad_secret_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            secret_key: Some("not-hex".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            init_config(&dir.path().join(CONFIG_FILE), &config),
            Err(ConfigError::InvalidKey(_))
        ));
        assert!(!dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn flags_override_file() {
        let merged = sample().merge(Overrides {
            device_id: Some("dev-from-flag".to_string()),
            base_url: Some("http://127.0.0.1:9000".to_string()),
            ..Overrides::default()
        });
        assert_eq!(merged.device_id().unwrap(), "dev-from-flag");
        assert_eq!(merged.api_key().unwrap(), "key-from-file");
        assert_eq!(merged.base_url(), "http://127.0.0.1:9000");
        assert_eq!(merged.history_label(), "hallway");
    }

    #[test]
    fn init_writes_label_and_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = Config::default().merge(Overrides {
            device_id: Some("dev".to_string()),
            history_label: Some("front door".to_string()),
            timeout_secs: Some(15),
            ..Overrides::default()
        });
        init_config(&path, &config).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.history_label(), "front door");
        assert_eq!(loaded.timeout(), Some(std::time::Duration::from_secs(15)));
    }

    #[test]
    fn parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        match Config::load(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
