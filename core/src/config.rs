use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

/// What `publish` does when a subscriber fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Stop at the first failing subscriber and return its error.
    #[default]
    FailFast,
    /// Run every subscriber, log each failure and report them together.
    Isolate,
}

impl FromStr for DeliveryPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_fast" | "fail-fast" => Ok(Self::FailFast),
            "isolate" => Ok(Self::Isolate),
            other => anyhow::bail!("unknown delivery policy {other:?}"),
        }
    }
}

/// Runtime configuration for an [`EventBus`](crate::EventBus) and its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    pub delivery: DeliveryPolicy,
    /// Longest accepted topic name, in characters. `None` accepts any length.
    pub max_topic_len: Option<usize>,
    /// `tracing_subscriber::EnvFilter` directive used by the binary.
    pub log_filter: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            delivery: DeliveryPolicy::default(),
            max_topic_len: None,
            log_filter: default_log_filter(),
        }
    }
}

#[derive(Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    bus: FileBus,
    #[serde(default)]
    logging: FileLogging,
}

#[derive(Deserialize, Default)]
struct FileBus {
    #[serde(default)]
    delivery: DeliveryPolicy,
    #[serde(default)]
    max_topic_len: Option<usize>,
}

#[derive(Deserialize)]
struct FileLogging {
    #[serde(default = "default_log_filter")]
    filter: String,
}

fn default_log_filter() -> String {
    "info".into()
}

impl Default for FileLogging {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl BusConfig {
    /// Resolve configuration from an explicit file, environment variables and defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = Self::default();

        // config file path precedence: argument -> ENV -> per-user config dir
        let config_path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("EVENTBUS_CONFIG").ok().map(PathBuf::from))
            .or_else(default_config_path);

        if let Some(config_path) = config_path {
            match fs::read_to_string(&config_path) {
                Ok(text) => {
                    let file_cfg: FileConfig = toml::from_str(&text).with_context(|| {
                        format!("invalid config file {}", config_path.display())
                    })?;
                    cfg.delivery = file_cfg.bus.delivery;
                    cfg.max_topic_len = file_cfg.bus.max_topic_len;
                    cfg.log_filter = file_cfg.logging.filter;
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!("reading config file {}", config_path.display())
                    });
                }
            }
        }

        // environment overrides
        if let Ok(d) = std::env::var("EVENTBUS_DELIVERY") {
            cfg.delivery = d.parse().context("invalid EVENTBUS_DELIVERY")?;
        }
        if let Ok(l) = std::env::var("EVENTBUS_LOG") {
            if !l.trim().is_empty() {
                cfg.log_filter = l;
            }
        }

        if cfg.max_topic_len == Some(0) {
            anyhow::bail!("max_topic_len must be at least 1");
        }
        Ok(cfg)
    }
}

/// `eventbus.toml` inside the platform config directory, when one exists.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "eventbus", "eventbus").map(|p| p.config_dir().join("eventbus.toml"))
}
