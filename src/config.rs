//! TOML-based configuration system.
//!
//! Loads settings from a `config.toml` file, falling back to defaults that
//! match the browser's built-in behavior. Every struct implements `Default`
//! so a missing or partial config file behaves like no file at all.
//!
//! ## Config file search order
//!
//! 1. `LUMEN_CONFIG` environment variable (explicit override)
//! 2. Next to the executable (`<exe_dir>/config.toml`)
//! 3. Platform config directory (`%APPDATA%\Lumen\config.toml` on Windows)
//! 4. Current working directory (`./config.toml`)
//! 5. No file found → `Config::default()`

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::privacy::{Blocklist, DEFAULT_RULES};

/// User agent sent by every session unless overridden.
///
/// Embedded engines' own user agents often get "unsupported browser" pages,
/// so a mainstream desktop UA is always set explicitly.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:122.0) Gecko/20100101 Firefox/122.0";

// ─────────────────────────────────────────────────────────────────────────────
// Config structs
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub window: WindowConfig,
    pub profile: ProfileConfig,
    pub network: NetworkConfig,
    pub blocking: BlockingConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Page opened by new tabs and the home button.
    pub home_url: String,
    pub window_title: String,
}

/// Window dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

/// Where the persistent profile lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Directory name under the user's home.
    pub dir_name: String,
    /// Absolute profile root. Overrides `<home>/<dir_name>` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// Network identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub user_agent: String,
}

/// Request blocking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockingConfig {
    pub enabled: bool,
    /// Substring patterns. Replaces the built-in list entirely.
    pub rules: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Default impls
// ─────────────────────────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            home_url: "https://www.google.com".to_string(),
            window_title: "Lumen".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            dir_name: ".lumen_profile".to_string(),
            root: None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: DEFAULT_RULES.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl BlockingConfig {
    pub fn blocklist(&self) -> Blocklist {
        Blocklist::new(self.rules.iter().cloned())
    }
}

impl NetworkConfig {
    /// The configured user agent, or the default one when left blank.
    pub fn effective_user_agent(&self) -> &str {
        if self.user_agent.trim().is_empty() {
            DEFAULT_USER_AGENT
        } else {
            &self.user_agent
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Loads configuration from the first config file found. Falls back to
    /// defaults when no file is found or parsing fails.
    pub fn load() -> Self {
        match find_config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        }
    }

    /// Loads configuration from an explicit path, with the same fallbacks.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "Configuration loaded");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                    Config::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read config, using defaults");
                Config::default()
            }
        }
    }
}

/// Searches for a config file in the standard locations.
fn find_config_path() -> Option<PathBuf> {
    // 1. Explicit env var override
    if let Ok(path) = std::env::var("LUMEN_CONFIG") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
    }

    // 2. Next to the executable
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // 3. Platform config directory
    if let Some(dir) = platform_config_dir() {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // 4. Current working directory
    let p = PathBuf::from("config.toml");
    if p.is_file() {
        return Some(p);
    }

    None
}

/// Returns the platform config directory without adding a dependency.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join("Lumen"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .or_else(|| std::env::var("HOME").ok().map(|h| format!("{h}/.config")))
            .map(|dir| PathBuf::from(dir).join("lumen"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let c = Config::default();
        assert_eq!(c.general.home_url, "https://www.google.com");
        assert_eq!(c.general.window_title, "Lumen");
        assert_eq!(c.window.width, 1200);
        assert_eq!(c.window.height, 800);
        assert_eq!(c.profile.dir_name, ".lumen_profile");
        assert!(c.profile.root.is_none());
        assert_eq!(c.network.user_agent, DEFAULT_USER_AGENT);
        assert!(c.blocking.enabled);
        assert_eq!(c.blocking.rules.len(), DEFAULT_RULES.len());
    }

    #[test]
    fn test_empty_toml_returns_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.window.width, 1200);
        assert!(config.blocking.enabled);
        assert_eq!(config.general.home_url, "https://www.google.com");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml = r#"
[window]
width = 1920

[profile]
root = "/tmp/lumen-test-profile"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.window.height, 800); // default
        assert_eq!(
            config.profile.root.as_deref(),
            Some(Path::new("/tmp/lumen-test-profile"))
        );
        assert_eq!(config.profile.dir_name, ".lumen_profile"); // default
    }

    #[test]
    fn test_custom_rules_replace_defaults() {
        let toml = r#"
[blocking]
rules = ["tracker.example", "", "tracker.example"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let list = config.blocking.blocklist();
        assert_eq!(list.len(), 1);
        assert!(list.should_block("https://tracker.example/t.js"));
        assert!(!list.should_block("https://ads.doubleclick.net/x"));
    }

    #[test]
    fn test_blank_user_agent_falls_back() {
        let toml = r#"
[network]
user_agent = "  "
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.network.effective_user_agent(), DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_load_from_invalid_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[window\nwidth = ").unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.window.width, 1200);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml"));
        assert!(config.blocking.enabled);
    }

    #[test]
    fn test_load_from_reads_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general]\nhome_url = \"https://example.org\"\n").unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.general.home_url, "https://example.org");
        assert_eq!(config.general.window_title, "Lumen");
    }

    #[test]
    fn test_full_toml_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.window.width, config.window.width);
        assert_eq!(deserialized.blocking.rules, config.blocking.rules);
        assert_eq!(deserialized.network.user_agent, config.network.user_agent);
    }
}
