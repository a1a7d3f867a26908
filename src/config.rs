//! On-disk editor settings and the session an overlay is opened with.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::editor::{CellPalettes, DEFAULT_SAVE_DELAY, EditorInputs};
use crate::model::{Cell, Source, Template, TimeRange};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Prepended to relative parse endpoints (a source's `links.queries`).
    #[serde(default)]
    pub parser_url: Option<String>,

    #[serde(default = "default_save_delay_ms")]
    pub save_delay_ms: u64,

    #[serde(default = "default_auto_refresh_secs")]
    pub auto_refresh_secs: u64,

    /// Where logs go while the TUI owns the terminal.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

fn default_version() -> u32 {
    1
}

fn default_save_delay_ms() -> u64 {
    DEFAULT_SAVE_DELAY.as_millis() as u64
}

fn default_auto_refresh_secs() -> u64 {
    0
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            parser_url: None,
            save_delay_ms: default_save_delay_ms(),
            auto_refresh_secs: default_auto_refresh_secs(),
            log_file: None,
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: EditorConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", path.display()))?;
        if cfg.version != 1 {
            anyhow::bail!("unsupported config version {}", cfg.version);
        }
        Ok(cfg)
    }

    /// Load `path` if given, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }
}

/// What the dashboard hands the overlay when it opens.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub cell: Cell,
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Id of the dashboard's current source; defaults to the first source.
    #[serde(default)]
    pub default_source: Option<String>,
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub palettes: CellPalettes,
    #[serde(default)]
    pub time_range: Option<TimeRange>,
}

impl Session {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
    }

    pub fn into_inputs(self, cfg: &EditorConfig) -> Result<EditorInputs> {
        let default_source = match self.default_source.as_deref() {
            Some(id) => self
                .sources
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .with_context(|| format!("default source {} not in session sources", id))?,
            None => self
                .sources
                .first()
                .cloned()
                .context("session lists no sources")?,
        };

        Ok(EditorInputs {
            cell: self.cell,
            sources: self.sources,
            default_source,
            templates: self.templates,
            time_range: self.time_range.unwrap_or_else(TimeRange::dashboard),
            auto_refresh: Duration::from_secs(cfg.auto_refresh_secs),
            palettes: self.palettes,
        })
    }
}
