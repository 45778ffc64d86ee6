//! Where the shell writes its log file and how it is read back for support
//! requests.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tauri::plugin::TauriPlugin;
use tauri::Runtime;
use tauri_plugin_log::{Target, TargetKind};

const APP_DIR: &str = "selftest";
const LOG_DIR: &str = "logs";
const LOG_FILE_STEM: &str = "selftest";

/// `<local data dir>/selftest/logs`, falling back to the home directory on
/// targets without a data dir.
pub fn log_directory() -> Option<PathBuf> {
    let base = dirs::data_local_dir().or_else(dirs::home_dir)?;
    Some(base.join(APP_DIR).join(LOG_DIR))
}

pub fn log_file_path() -> Option<PathBuf> {
    Some(log_directory()?.join(log_file_name()))
}

fn log_file_name() -> String {
    format!("{LOG_FILE_STEM}.log")
}

/// Stdout and the webview console always; the log folder when one exists.
pub fn plugin<R: Runtime>() -> TauriPlugin<R> {
    let mut builder = tauri_plugin_log::Builder::default()
        .level(log::LevelFilter::Info)
        .clear_targets()
        .target(Target::new(TargetKind::Stdout))
        .target(Target::new(TargetKind::Webview));

    if let Some(path) = log_directory() {
        builder = builder.target(Target::new(TargetKind::Folder {
            path,
            file_name: Some(LOG_FILE_STEM.into()),
        }));
    }
    builder.build()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFile {
    pub file_name: String,
    pub content: String,
}

pub async fn read_log_file() -> Result<LogFile> {
    let path = log_file_path().ok_or_else(|| anyhow!("log location unavailable"))?;
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(LogFile {
        file_name: log_file_name(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_lives_under_app_log_dir() {
        let (Some(dir), Some(file)) = (log_directory(), log_file_path()) else {
            return;
        };
        assert_eq!(file.parent(), Some(dir.as_path()));
        assert!(dir.ends_with("selftest/logs"));
        assert_eq!(file.file_name().and_then(|n| n.to_str()), Some("selftest.log"));
    }
}
