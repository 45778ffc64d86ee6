use crate::logging::{read_log_file, LogFile};

/// Hands the current log file to the page so users can attach it to a report.
#[tauri::command]
pub async fn fetch_shell_logs() -> Result<LogFile, String> {
    read_log_file()
        .await
        .map_err(|err| format!("Failed to read log file: {err:#}"))
}
