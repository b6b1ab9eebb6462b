//! Configuration management for Marquee.
//!
//! Loads configuration from ${MARQUEE_HOME}/config.toml with sensible defaults.
//! Service endpoints and keys can be overridden from the environment.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Env var overriding the backend base URL.
pub const BACKEND_URL_ENV: &str = "MARQUEE_BACKEND_URL";
/// Env var overriding the backend anon (public) key.
pub const ANON_KEY_ENV: &str = "MARQUEE_ANON_KEY";
/// Env var overriding the catalog base URL.
pub const CATALOG_URL_ENV: &str = "TMDB_BASE_URL";
/// Env var overriding the catalog API key.
pub const CATALOG_KEY_ENV: &str = "TMDB_API_KEY";

/// Default catalog API root.
pub const DEFAULT_CATALOG_URL: &str = "https://api.themoviedb.org/3";
/// Default catalog image root.
pub const DEFAULT_IMAGE_URL: &str = "https://image.tmdb.org/t/p";

/// Returns the default config template with comments.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for Marquee configuration and data directories.
    //!
    //! MARQUEE_HOME resolution order:
    //! 1. MARQUEE_HOME environment variable (if set)
    //! 2. ~/.config/marquee (default)
    //! 3. ./.marquee when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the Marquee home directory.
    pub fn marquee_home() -> PathBuf {
        if let Ok(home) = std::env::var("MARQUEE_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".marquee"),
            |h| h.join(".config").join("marquee"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        marquee_home().join("config.toml")
    }

    /// Returns the path to the client-local key/value storage file.
    pub fn storage_path() -> PathBuf {
        marquee_home().join("storage.json")
    }

    /// Returns the directory holding log files.
    pub fn logs_dir() -> PathBuf {
        marquee_home().join("logs")
    }
}

/// Backend-as-a-service connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: Option<String>,
    /// Public anon key sent as `apikey` on every request.
    pub anon_key: Option<String>,
}

/// Movie catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub image_base_url: String,
    /// Optional ISO language tag passed to the catalog (e.g. "en-US").
    pub language: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            image_base_url: DEFAULT_IMAGE_URL.to_string(),
            language: None,
        }
    }
}

/// Notification timing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    /// Default lifetime of a toast; 0 keeps toasts until dismissed.
    pub lifetime_ms: u64,
    /// Length of the exit phase before a toast is removed.
    pub exit_ms: u64,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            lifetime_ms: 3500,
            exit_ms: 300,
        }
    }
}

impl ToastConfig {
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }

    pub fn exit(&self) -> Duration {
        Duration::from_millis(self.exit_ms)
    }
}

/// Local validation rules for auth forms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub min_password_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_len: 6,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when `MARQUEE_LOG` is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub catalog: CatalogConfig,
    pub toasts: ToastConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

impl Config {
    /// Loads configuration from the default path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the default template to `path`, refusing to overwrite.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    /// Resolves the backend URL (env > config).
    ///
    /// # Errors
    /// Returns an error if no URL is configured or it is malformed.
    pub fn backend_url(&self) -> Result<String> {
        resolve_setting(self.backend.url.as_deref(), BACKEND_URL_ENV, None)
            .with_context(|| {
                format!("No backend URL configured. Set {BACKEND_URL_ENV} or [backend].url.")
            })
            .and_then(|url| validate_url(&url, "backend"))
    }

    /// Resolves the backend anon key (env > config).
    ///
    /// # Errors
    /// Returns an error if no key is configured.
    pub fn anon_key(&self) -> Result<String> {
        resolve_setting(self.backend.anon_key.as_deref(), ANON_KEY_ENV, None).with_context(|| {
            format!("No backend anon key configured. Set {ANON_KEY_ENV} or [backend].anon_key.")
        })
    }

    /// Resolves the catalog base URL (env > config > default).
    ///
    /// # Errors
    /// Returns an error if the resolved URL is malformed.
    pub fn catalog_url(&self) -> Result<String> {
        let url = resolve_setting(
            self.catalog.base_url.as_deref(),
            CATALOG_URL_ENV,
            Some(DEFAULT_CATALOG_URL),
        )
        .context("No catalog URL configured")?;
        validate_url(&url, "catalog")
    }

    /// Resolves the catalog API key (env > config).
    ///
    /// # Errors
    /// Returns an error if no key is configured.
    pub fn catalog_key(&self) -> Result<String> {
        resolve_setting(self.catalog.api_key.as_deref(), CATALOG_KEY_ENV, None).with_context(
            || format!("No catalog API key. Set {CATALOG_KEY_ENV} or [catalog].api_key."),
        )
    }
}

/// Resolves a setting with precedence: env > config > default.
fn resolve_setting(config_value: Option<&str>, env_var: &str, default: Option<&str>) -> Option<String> {
    let non_empty = |value: &str| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    std::env::var(env_var)
        .ok()
        .as_deref()
        .and_then(non_empty)
        .or_else(|| config_value.and_then(non_empty))
        .or_else(|| default.map(str::to_string))
}

fn validate_url(url: &str, service: &str) -> Result<String> {
    url::Url::parse(url).with_context(|| format!("Invalid {service} base URL: {url}"))?;
    Ok(url.trim_end_matches('/').to_string())
}
