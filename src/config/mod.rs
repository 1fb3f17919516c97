use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use toml::map::Entry;
use tracing::warn;

use crate::error::ConfigError;

/// Environment variable naming an extra config file, loaded last
pub const CONFIG_ENV_VAR: &str = "POPUP_MENU_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Idle time in milliseconds before a popup the pointer left asks to
    /// be closed. Negative values disable auto-hide.
    pub auto_hide_delay: i64,
    /// Class toggled on items along the active chain
    pub active_class: String,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_hide_delay: -1,
            active_class: "active".to_string(),
        }
    }
}

impl Config {
    /// Run `f` against the process-wide config, loading it on first use
    pub fn with<R>(f: impl FnOnce(&Config) -> R) -> R {
        let config = CONFIG.get_or_init(Config::init);
        f(config)
    }

    /// Auto-hide delay, `None` when disabled
    pub fn auto_hide_delay(&self) -> Option<Duration> {
        auto_hide_duration(self.auto_hide_delay)
    }

    /// Parse a single config file on top of the defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn init() -> Self {
        // Lowest to highest priority
        let mut layers = Vec::new();
        layers.extend(get_system_config_path());
        layers.extend(get_user_config_path());
        layers.push(PathBuf::from("popup_menu.toml"));
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            layers.push(PathBuf::from(path));
        }

        let config = Self::load_layers(&layers);
        tracing::info!(
            "Config initialized: auto_hide_delay={} active_class={}",
            config.auto_hide_delay,
            config.active_class
        );
        config
    }

    /// Merge every readable file of `layers` over the defaults, later
    /// files winning key by key
    pub fn load_layers(layers: &[PathBuf]) -> Self {
        let mut merged =
            toml::Value::try_from(Self::default()).expect("default config is always valid toml");
        let mut found_any_config = false;

        for path in layers {
            let Ok(content) = std::fs::read_to_string(path) else {
                continue;
            };
            match content.parse::<toml::Value>() {
                Ok(value) => {
                    merge_value(&mut merged, value);
                    found_any_config = true;
                    tracing::info!("Loaded config from {}", path.display());
                }
                Err(err) => warn!("Failed to parse {}: {err}", path.display()),
            }
        }

        if !found_any_config {
            tracing::debug!("No configuration file found, using default config");
        }

        merged.try_into().unwrap_or_else(|err| {
            warn!("Falling back to default config due to invalid overrides: {err}");
            Self::default()
        })
    }
}

/// Milliseconds to an auto-hide duration; negative disables
pub fn auto_hide_duration(delay_ms: i64) -> Option<Duration> {
    u64::try_from(delay_ms).ok().map(Duration::from_millis)
}

fn merge_value(base: &mut toml::Value, overrides: toml::Value) {
    match (base, overrides) {
        (toml::Value::Table(base_map), toml::Value::Table(override_map)) => {
            for (key, override_value) in override_map {
                match base_map.entry(key) {
                    Entry::Occupied(mut entry) => merge_value(entry.get_mut(), override_value),
                    Entry::Vacant(entry) => {
                        entry.insert(override_value);
                    }
                }
            }
        }
        (base_value, override_value) => {
            *base_value = override_value;
        }
    }
}

fn get_system_config_path() -> Option<PathBuf> {
    let path = PathBuf::from("/etc/popup-menu/config.toml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

fn get_user_config_path() -> Option<PathBuf> {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".config"))
        })?;

    let path = config_dir.join("popup-menu").join("config.toml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}
