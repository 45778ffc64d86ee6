use serde_json::Value;
use tauri::{AppHandle, State};
use tauri_plugin_notification::NotificationExt;

use crate::bridge::TARGET_URL_FIELD;
use crate::ShellRuntime;

const DEFAULT_TITLE: &str = "Notification";

/// Shows a push message that arrived while the app is in the foreground.
#[tauri::command]
pub async fn shell_show_notification(
    title: Option<String>,
    body: Option<String>,
    data: Option<Value>,
    app: AppHandle,
) -> Result<(), String> {
    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let body = body.unwrap_or_default();

    let mut builder = app.notification().builder().title(&title).body(&body);
    if let Some(target) = data
        .as_ref()
        .and_then(|d| d.get(TARGET_URL_FIELD))
        .and_then(Value::as_str)
    {
        builder = builder.extra(TARGET_URL_FIELD, target);
    }

    builder
        .show()
        .map_err(|err| format!("Failed to show notification: {err}"))?;
    log::info!("[shell:push] local notification shown: {title}");
    Ok(())
}

/// A notification was clicked; `data` is its payload.
#[tauri::command]
pub async fn shell_notification_clicked(
    data: Value,
    state: State<'_, ShellRuntime>,
) -> Result<(), String> {
    state.bridge().handle_notification_click(&data).await;
    Ok(())
}
