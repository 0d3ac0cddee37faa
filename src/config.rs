//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$FILEMAILER_CONFIG` (environment variable)
//! 2. `~/.config/filemailer/config.toml` (Linux/macOS)
//!    `%APPDATA%\filemailer\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::relative::RelativeTime;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Where captured mail is written.
    pub mailer: MailerConfig,
    /// Inspection settings.
    pub panel: PanelConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Capture settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MailerConfig {
    /// Directory that receives captured messages. Required for capture.
    pub temp_dir: Option<PathBuf>,
}

/// Inspection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Messages dated after `now + new_message_time` count as new.
    pub new_message_time: RelativeTime,
    /// Files modified before `now + autoremove` are deleted before listing.
    /// `false` disables the policy.
    #[serde(
        serialize_with = "serialize_autoremove",
        deserialize_with = "deserialize_autoremove"
    )]
    pub autoremove: Option<RelativeTime>,
    /// Header names shown in summary views.
    pub show: Vec<String>,
    /// Suppress the inspection output entirely when there are no messages.
    pub hide_empty: bool,
    /// Number of parsed messages kept in the cache.
    pub cache_size: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            new_message_time: default_relative("-2 seconds"),
            autoremove: Some(default_relative("-5 seconds")),
            show: vec!["subject".to_string(), "from".to_string(), "to".to_string()],
            hide_empty: true,
            cache_size: 256,
        }
    }
}

fn default_relative(text: &str) -> RelativeTime {
    text.parse().expect("built-in relative time is valid")
}

impl PanelConfig {
    /// The `show` list with duplicates removed, first occurrence kept.
    pub fn shown_headers(&self) -> Vec<String> {
        let mut seen = Vec::with_capacity(self.show.len());
        for name in &self.show {
            let name = name.to_lowercase();
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }
}

// ── Autoremove: duration string or `false` ──────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum AutoremoveSetting {
    Enabled(bool),
    After(RelativeTime),
}

fn deserialize_autoremove<'de, D>(deserializer: D) -> Result<Option<RelativeTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match AutoremoveSetting::deserialize(deserializer)? {
        AutoremoveSetting::Enabled(false) => None,
        AutoremoveSetting::Enabled(true) => PanelConfig::default().autoremove,
        AutoremoveSetting::After(rt) => Some(rt),
    })
}

fn serialize_autoremove<S>(value: &Option<RelativeTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(rt) => rt.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("FILEMAILER_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("filemailer").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("filemailer")
}
