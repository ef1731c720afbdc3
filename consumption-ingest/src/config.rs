use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlConfig {
    pub url_login: String,
    pub url_consumption: String,
    pub apikey: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InfluxDbConfig {
    pub host: String,
    pub port: u16,
    pub db: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub ssl: bool,
}

impl InfluxDbConfig {
    pub fn write_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}/write", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from(".") }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfig {
    /// Unset means no timeout on API or database requests.
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "USER")]
    pub user: UserConfig,
    #[serde(rename = "URL")]
    pub url: UrlConfig,
    #[serde(rename = "INFLUXDB")]
    pub influxdb: InfluxDbConfig,
    #[serde(rename = "OUTPUT", default)]
    pub output: OutputConfig,
    #[serde(rename = "HTTP", default)]
    pub http: HttpConfig,
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "config.toml";
    pub const PATH_ENV: &'static str = "EREDES_CONFIG";

    /// Load from `$EREDES_CONFIG`, falling back to `config.toml`.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var(Self::PATH_ENV).unwrap_or_else(|_| Self::DEFAULT_PATH.to_string());
        Self::from_file(path)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let required = [
            ("USER.username", &self.user.username),
            ("USER.password", &self.user.password),
            ("URL.url_login", &self.url.url_login),
            ("URL.url_consumption", &self.url.url_consumption),
            ("URL.apikey", &self.url.apikey),
            ("INFLUXDB.host", &self.influxdb.host),
            ("INFLUXDB.db", &self.influxdb.db),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                bail!("{key} must not be empty");
            }
        }

        if self.influxdb.port == 0 {
            bail!("INFLUXDB.port must be non-zero");
        }
        if self.http.timeout_secs == Some(0) {
            bail!("HTTP.timeout_secs must be positive when set");
        }

        Ok(())
    }
}
