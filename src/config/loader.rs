//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "CTS";

/// Config file name
const CONFIG_FILE_NAME: &str = "cts.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "CTS_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `CTS_CONFIG` environment variable (explicit path)
    /// 2. `./cts.toml` (current directory)
    /// 3. The platform config directory (`~/.config/cts/cts.toml` on Linux)
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables can override selected values afterwards.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = if let Some(ref path) = config_path {
            debug!(path = %path.display(), "loading configuration file");
            load_from_file(path)?
        } else {
            Config::default()
        };

        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> Self {
        let mut config = Config::default();
        // Still apply env overrides even with defaults
        let _ = apply_env_overrides(&mut config);

        Self {
            config_path: None,
            config,
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    // 1. Explicit environment variable
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. Current directory
    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    // 3. Platform config directory
    if let Some(dirs) = ProjectDirs::from("", "", "cts") {
        let app_config = dirs.config_dir().join(CONFIG_FILE_NAME);
        if app_config.exists() {
            return Some(app_config);
        }
    }

    // 4. No config file found - will use defaults
    None
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

/// Apply environment variable overrides to the configuration.
///
/// Overrides cover the values that change between checkouts and benches:
/// - `CTS_EC_DIR`
/// - `CTS_RESULTS_DIR`
/// - `CTS_OCD_SCRIPT_DIR`
/// - `CTS_SUITE_TIME_SECS`
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    if let Ok(val) = std::env::var(format!("{}_EC_DIR", ENV_PREFIX)) {
        config.paths.ec_dir = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var(format!("{}_RESULTS_DIR", ENV_PREFIX)) {
        config.paths.results_dir = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var(format!("{}_OCD_SCRIPT_DIR", ENV_PREFIX)) {
        config.paths.ocd_script_dir = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var(format!("{}_SUITE_TIME_SECS", ENV_PREFIX)) {
        config.suite.max_suite_time_secs = val.parse().map_err(|_| {
            ConfigError::env_parse(
                format!("{}_SUITE_TIME_SECS", ENV_PREFIX),
                "Invalid duration in seconds",
            )
        })?;
    }

    Ok(())
}
