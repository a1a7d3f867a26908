//! Diagnostics setup.
//!
//! Filter comes from `CELLEDIT_LOG` (default `warn`). While the TUI owns the
//! terminal, events go to a file instead of stderr.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use anyhow::{Context, Result};
use time::OffsetDateTime;
use time::format_description::FormatItem;
use tracing_subscriber::EnvFilter;

const FILTER_ENV: &str = "CELLEDIT_LOG";

fn file_stamp_format() -> &'static [FormatItem<'static>] {
    static FMT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();
    FMT.get_or_init(|| {
        time::format_description::parse("[year][month][day]T[hour][minute][second]")
            .unwrap_or_default()
    })
}

pub fn init(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let res = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    res.map_err(|e| anyhow::anyhow!("init logging: {}", e))
}

/// Per-run log file in the temp dir, e.g. `celledit-20260116T093000.log`.
pub fn default_log_path() -> PathBuf {
    let stamp = OffsetDateTime::now_utc()
        .format(file_stamp_format())
        .unwrap_or_else(|_| "run".to_string());
    std::env::temp_dir().join(format!("celledit-{}.log", stamp))
}
