//! Configuration file handling
//!
//! The suite reads a TOML file from the platform config directory and
//! accepts environment overrides for the values that change per run
//! (`ARC_E2E_BASE_URL`, `CHROME_PATH`). Everything has a default so a
//! missing file is not an error.

use serde::Deserialize;
use std::path::PathBuf;

use super::{Error, Result};

/// Chromium executables probed on PATH when no explicit path is configured
const BROWSER_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

/// Well-known absolute install locations probed last
const BROWSER_FALLBACK_PATHS: &[&str] = &[
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/usr/bin/google-chrome",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the environment under test
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Browser settings
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            browser: BrowserSettings::default(),
            timeouts: Timeouts::default(),
        }
    }
}

fn default_base_url() -> String {
    "https://dev.cittadini.pagopa.it".to_string()
}

/// Browser launch settings
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// Explicit path to a Chromium/Chrome binary; discovery otherwise
    pub executable: Option<PathBuf>,

    /// Run without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Disable the Chromium sandbox (required in most CI containers)
    #[serde(default)]
    pub no_sandbox: bool,

    /// Viewport width in pixels
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Viewport height in pixels
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Additional command-line flags passed to the browser
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            headless: default_headless(),
            no_sandbox: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
            args: Vec::new(),
        }
    }
}

fn default_headless() -> bool {
    true
}
fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}

impl BrowserSettings {
    /// Resolve the browser executable to launch.
    ///
    /// Order: explicit config path, `CHROME_PATH` environment variable,
    /// PATH lookup over the usual binary names, well-known install paths.
    pub fn resolve_executable(&self) -> Result<PathBuf> {
        if let Some(path) = &self.executable {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(Error::Config(format!(
                "configured browser executable '{}' does not exist",
                path.display()
            )));
        }

        if let Ok(env_path) = std::env::var("CHROME_PATH") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Ok(path);
            }
        }

        for name in BROWSER_CANDIDATES {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }

        for raw in BROWSER_FALLBACK_PATHS {
            let path = PathBuf::from(raw);
            if path.exists() {
                return Ok(path);
            }
        }

        let mut searched: Vec<&str> = vec!["$CHROME_PATH"];
        searched.extend(BROWSER_CANDIDATES);
        searched.extend(BROWSER_FALLBACK_PATHS);
        Err(Error::BrowserNotFound {
            searched: searched.join(", "),
        })
    }
}

/// Timeout settings in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct Timeouts {
    /// Navigation and generic UI waits
    #[serde(default = "default_ui")]
    pub ui_secs: u64,

    /// Waiting for a matching network response
    #[serde(default = "default_response")]
    pub response_secs: u64,

    /// Error-path rendering; slower than the happy path because the
    /// application retries with backoff before showing its error UI
    #[serde(default = "default_error_render")]
    pub error_render_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            ui_secs: default_ui(),
            response_secs: default_response(),
            error_render_secs: default_error_render(),
        }
    }
}

fn default_ui() -> u64 {
    10
}
fn default_response() -> u64 {
    30
}
fn default_error_render() -> u64 {
    20
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if the file doesn't exist. The
    /// `ARC_E2E_BASE_URL` environment variable overrides `base_url`.
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var("ARC_E2E_BASE_URL") {
            config.base_url = url;
        }

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}

/// Path to the configuration file
///
/// - Linux: `~/.config/arc-e2e/config.toml`
/// - macOS: `~/Library/Application Support/arc-e2e/config.toml`
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "arc-e2e")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://dev.cittadini.pagopa.it");
        assert!(config.browser.headless);
        assert_eq!(config.timeouts.ui_secs, 10);
        assert_eq!(config.timeouts.response_secs, 30);
        assert_eq!(config.timeouts.error_render_secs, 20);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            base_url = "https://uat.cittadini.pagopa.it"

            [timeouts]
            error_render_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://uat.cittadini.pagopa.it");
        assert_eq!(config.timeouts.error_render_secs, 30);
        // untouched sections fall back
        assert_eq!(config.timeouts.response_secs, 30);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_missing_explicit_executable_is_an_error() {
        let settings = BrowserSettings {
            executable: Some(PathBuf::from("/definitely/not/a/browser")),
            ..BrowserSettings::default()
        };
        assert!(settings.resolve_executable().is_err());
    }
}
