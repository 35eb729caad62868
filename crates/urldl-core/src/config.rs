use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::CurlOptions;

/// HTTP transfer settings (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Seconds allowed for establishing the connection.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Seconds allowed for the whole transfer (None = no limit).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: Some(30),
            timeout_secs: None,
            user_agent: Some(concat!("urldl/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl From<&HttpConfig> for CurlOptions {
    fn from(cfg: &HttpConfig) -> Self {
        CurlOptions {
            connect_timeout: cfg.connect_timeout_secs.map(Duration::from_secs),
            timeout: cfg.timeout_secs.map(Duration::from_secs),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

/// How the output file is written: in place ("direct") or via `.part` + rename ("atomic").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    #[default]
    Direct,
    Atomic,
}

/// Global configuration loaded from `~/.config/urldl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrldlConfig {
    /// Default manifest encoding label (WHATWG name, e.g. "utf-8", "latin1").
    pub encoding: String,
    /// Ignore blank manifest lines instead of reporting them as failures.
    #[serde(default)]
    pub skip_blank_lines: bool,
    /// Output write mode; if missing, "direct".
    #[serde(default)]
    pub write_mode: Option<WriteMode>,
    /// Optional HTTP settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

impl Default for UrldlConfig {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            skip_blank_lines: false,
            write_mode: None,
            http: None,
        }
    }
}

impl UrldlConfig {
    pub fn write_mode(&self) -> WriteMode {
        self.write_mode.unwrap_or_default()
    }

    pub fn curl_options(&self) -> CurlOptions {
        match &self.http {
            Some(http) => http.into(),
            None => (&HttpConfig::default()).into(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urldl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<UrldlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = UrldlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: UrldlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
