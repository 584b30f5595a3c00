use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Remote backend settings. Both values present selects the remote
/// persistence adapter; anything less means local files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    /// Server URL (e.g. "https://sync.example.com")
    pub server_url: Option<String>,
    /// API key for authentication
    pub api_key: Option<String>,
}

impl SyncConfig {
    /// Returns true if sync is configured (has both server_url and api_key)
    pub fn is_configured(&self) -> bool {
        self.server_url.is_some() && self.api_key.is_some()
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted collections
    pub data_dir: PathBuf,
    /// Stable identifier for this device, used as the merge tie-breaker tag
    pub device_id: String,
    /// Quiescence window between the last mutation and the deferred save
    pub debounce_ms: u64,
    /// Remote backend settings
    pub sync: SyncConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            device_id: String::new(),
            debounce_ms: crate::store::DEFAULT_DEBOUNCE_WINDOW.as_millis() as u64,
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Self::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        // Apply environment variable overrides
        if let Ok(data_dir) = std::env::var("GAIN_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(device_id) = std::env::var("GAIN_DEVICE_ID") {
            config.device_id = device_id;
        }
        if let Ok(url) = std::env::var("GAIN_SYNC_URL") {
            config.sync.server_url = Some(url);
        }
        if let Ok(key) = std::env::var("GAIN_SYNC_API_KEY") {
            config.sync.api_key = Some(key);
        }

        config.ensure_device_id()?;

        Ok(config)
    }

    /// Fills in a stable device id when neither the file nor the environment
    /// provided one: reads `<data_dir>/.device-id`, generating and writing
    /// it on first run so the device keeps one identity across launches.
    fn ensure_device_id(&mut self) -> Result<(), ConfigError> {
        if !self.device_id.is_empty() {
            return Ok(());
        }

        let marker = self.data_dir.join(".device-id");
        if let Ok(id) = std::fs::read_to_string(&marker) {
            let id = id.trim();
            if !id.is_empty() {
                self.device_id = id.to_string();
                return Ok(());
            }
        }

        let id = Uuid::new_v4().to_string();
        std::fs::create_dir_all(&self.data_dir)
            .map_err(|e| ConfigError::WriteError(self.data_dir.clone(), e))?;
        std::fs::write(&marker, &id).map_err(|e| ConfigError::WriteError(marker, e))?;
        self.device_id = id;
        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Default config file path: ~/.config/gain/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gain")
            .join("config.yaml")
    }

    /// Default data directory: ~/.local/share/gain (platform equivalent)
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gain")
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            data_dir: PathBuf::from("/tmp/gain-tests"),
            device_id: "test-device".to_string(),
            debounce_ms: 30,
            sync: SyncConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    WriteError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::WriteError(path, e) => {
                write!(f, "Failed to write '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
