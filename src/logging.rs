// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! 日志初始化

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "cam_sentinel=info,sentinel=info";
const LOG_FILE_NAME: &str = "monitor.log";

/// 解析日志文件路径: 已存在的目录 → 目录下的 monitor.log, 否则确保父目录存在
pub fn resolve_log_path(configured: &Path) -> Result<PathBuf> {
    if configured.is_dir() {
        return Ok(configured.join(LOG_FILE_NAME));
    }
    if let Some(parent) = configured.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
    }
    Ok(configured.to_path_buf())
}

/// 初始化全局 tracing subscriber
///
/// `log_file` 为 None 时输出到 stderr.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    match log_file {
        Some(configured) => {
            let path = resolve_log_path(configured)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
