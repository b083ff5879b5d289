//! Lottery sources and run settings.
//!
//! The built-in defaults describe the six sources of the aggregate run plus the
//! Lao Santipap single-source page. A YAML file can replace either the source
//! list or the time-gate settings:
//!
//! ```yaml
//! sources:
//!   - key: hanoi
//!     name: ฮานอย
//!     url: https://www.raakaadee.com/ตรวจหวย-หุ้น/หวยฮานอยปกติ/
//!     mirrors: [read_mode]
//! gate:
//!   windows:
//!     - { hour: 16, minute: 30 }
//!   width_minutes: 5
//!   utc_offset_minutes: 420
//! ```

use crate::error::{Error, Result};
use crate::schedule::{
    DEFAULT_RUN_WINDOWS, DEFAULT_UTC_OFFSET_MINUTES, DEFAULT_WINDOW_MINUTES, MINUTES_PER_DAY,
    RunWindow, TimeGate,
};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, instrument};
use url::Url;

/// Key of the source processed by `single` when no `--lottery` is given.
pub const DEFAULT_SINGLE_KEY: &str = "lao_santipap";

/// Alternate front-ends that serve the same page when the origin blocks us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mirror {
    /// `https://r.jina.ai/<url>`: renders the page and returns readable text.
    ReadMode,
    /// `https://api.allorigins.win/raw?url=<url>`: plain pass-through proxy.
    AllOrigins,
}

impl Mirror {
    pub fn rewrite(&self, url: &str) -> String {
        match self {
            Mirror::ReadMode => format!("https://r.jina.ai/{url}"),
            Mirror::AllOrigins => format!(
                "https://api.allorigins.win/raw?url={}",
                urlencoding::encode(url)
            ),
        }
    }
}

/// A lottery results page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LotterySource {
    /// Short identifier, also used as the `lottery` field of single documents.
    pub key: String,
    /// Display label.
    pub name: String,
    /// Canonical page address.
    pub url: String,
    /// Fallback mirrors, tried in order after `url`.
    #[serde(default)]
    pub mirrors: Vec<Mirror>,
}

impl LotterySource {
    pub fn new(key: &str, name: &str, url: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            mirrors: Vec::new(),
        }
    }

    pub fn with_mirrors(mut self, mirrors: Vec<Mirror>) -> Self {
        self.mirrors = mirrors;
        self
    }
}

/// The aggregate set followed by the single-source default.
pub fn default_sources() -> Vec<LotterySource> {
    vec![
        LotterySource::new(
            "lao_pattana",
            "หวยลาวพัฒนา",
            "https://www.sanook.com/news/laolotto/",
        ),
        LotterySource::new(
            "lao_samakkee",
            "ลาวสามัคคี",
            "https://www.raakaadee.com/ตรวจหวย-หุ้น/หวยลาวสามัคคี/",
        ),
        LotterySource::new(
            "lao_vip",
            "ลาว VIP",
            "https://www.raakaadee.com/ตรวจหวย-หุ้น/หวยลาว-VIP/",
        ),
        LotterySource::new(
            "lao_star",
            "ลาวสตาร์",
            "https://www.raakaadee.com/ตรวจหวย-หุ้น/หวยลาวสตาร์/",
        ),
        LotterySource::new(
            "lao_extra",
            "ลาว Extra",
            "https://www.raakaadee.com/ตรวจหวย-หุ้น/หวยลาว-Extra/",
        ),
        LotterySource::new(
            "hanoi",
            "ฮานอย",
            "https://www.raakaadee.com/ตรวจหวย-หุ้น/หวยฮานอยปกติ/",
        ),
        LotterySource::new(
            DEFAULT_SINGLE_KEY,
            "ลาวสันติภาพ",
            "https://www.raakaadee.com/ตรวจหวย-หุ้น/หวยลาวสันติภาพ/",
        )
        .with_mirrors(vec![Mirror::ReadMode]),
    ]
}

/// Keys processed by the aggregate run when the source list is not overridden.
pub const AGGREGATE_KEYS: [&str; 6] =
    ["lao_pattana", "lao_samakkee", "lao_vip", "lao_star", "lao_extra", "hanoi"];

/// Time-gate settings as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GateSettings {
    pub windows: Vec<RunWindow>,
    pub width_minutes: u32,
    pub utc_offset_minutes: i32,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            windows: DEFAULT_RUN_WINDOWS.to_vec(),
            width_minutes: DEFAULT_WINDOW_MINUTES,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

impl GateSettings {
    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            Error::Config(format!(
                "utc_offset_minutes {} out of range",
                self.utc_offset_minutes
            ))
        })
    }

    pub fn to_gate(&self) -> Result<TimeGate> {
        Ok(TimeGate::new(self.windows.clone(), self.width_minutes, self.offset()?))
    }

    fn validate(&self) -> Result<()> {
        for window in &self.windows {
            if window.hour > 23 || window.minute > 59 {
                return Err(Error::Config(format!("invalid run window {window}")));
            }
        }
        if self.width_minutes == 0 || self.width_minutes > MINUTES_PER_DAY {
            return Err(Error::Config(format!(
                "width_minutes must be between 1 and {MINUTES_PER_DAY}, got {}",
                self.width_minutes
            )));
        }
        self.offset().map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct SettingsFile {
    sources: Option<Vec<LotterySource>>,
    #[serde(default)]
    gate: GateSettings,
}

/// Everything a run needs besides CLI flags and credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub sources: Vec<LotterySource>,
    /// Keys for the aggregate run, in output order.
    pub aggregate_keys: Vec<String>,
    pub gate: GateSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            aggregate_keys: AGGREGATE_KEYS.iter().map(|k| k.to_string()).collect(),
            gate: GateSettings::default(),
        }
    }
}

impl Settings {
    /// Parse YAML settings. A file that lists `sources` makes every listed
    /// source part of the aggregate run, in file order.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: SettingsFile = serde_yaml::from_str(yaml)?;
        let mut settings = Settings {
            gate: file.gate,
            ..Settings::default()
        };
        if let Some(sources) = file.sources {
            settings.aggregate_keys = sources.iter().map(|s| s.key.clone()).collect();
            settings.sources = sources;
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path`, or fall back to the built-in defaults.
    ///
    /// # Arguments
    ///
    /// * `path` - YAML settings file; `None` means no file was given
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the file cannot be read or fails validation,
    /// [`Error::Yaml`] if it is not valid YAML.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path).await.map_err(|e| {
                    Error::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                let settings = Self::from_yaml(&yaml)?;
                info!(
                    path = %path.display(),
                    sources = settings.sources.len(),
                    "Loaded configuration file"
                );
                Ok(settings)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.key.trim().is_empty() {
                return Err(Error::Config("source key must not be empty".to_string()));
            }
            if !seen.insert(source.key.as_str()) {
                return Err(Error::Config(format!("duplicate source key {}", source.key)));
            }
            let url = Url::parse(&source.url)
                .map_err(|e| Error::Config(format!("invalid URL for {}: {e}", source.key)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "URL for {} must be http or https, got {}",
                    source.key,
                    url.scheme()
                )));
            }
        }
        for key in &self.aggregate_keys {
            self.source(key)?;
        }
        self.gate.validate()
    }

    /// Look up a configured source by key.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for a key that is not configured.
    pub fn source(&self, key: &str) -> Result<&LotterySource> {
        self.sources
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| Error::Config(format!("unknown lottery key {key}")))
    }

    /// Sources of the aggregate run, in configured order.
    pub fn aggregate_sources(&self) -> Result<Vec<LotterySource>> {
        self.aggregate_keys.iter().map(|key| self.source(key).cloned()).collect()
    }
}
