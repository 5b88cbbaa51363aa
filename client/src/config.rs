use {
    anyhow::{Context as _, Result, anyhow},
    derivative::Derivative,
    serde::Deserialize,
    std::{
        path::{Path, PathBuf},
        time::Duration,
    },
    url::Url,
};

pub const CONFIG_FILE_NAME: &str = "ironbox.json5";

#[derive(Derivative, Clone, Deserialize)]
#[derivative(Debug)]
pub struct Config {
    /// Base URL of the IronBox API. The public service is used if not set.
    #[serde(default)]
    pub endpoint: Option<Url>,
    pub email: String,
    /// Prompted for if not set.
    #[derivative(Debug = "ignore")]
    #[serde(default)]
    pub password: Option<String>,
    pub container_id: i64,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(default = "default_transport_attempts")]
    pub transport_attempts: usize,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_transport_attempts() -> usize {
    1
}

#[must_use]
#[inline]
pub fn default_log_filter() -> String {
    "info".into()
}

impl Config {
    #[inline]
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| anyhow!("cannot find config dir"))?;
        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    #[inline]
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs_err::read_to_string(path)?;
        json5::from_str(&text).with_context(|| format!("invalid config file {path:?}"))
    }
}
