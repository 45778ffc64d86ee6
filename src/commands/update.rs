use tauri::{AppHandle, State};

use crate::version::{fetch_version_info, Platform, UpdateNotice};
use crate::ShellRuntime;

#[tauri::command]
pub async fn shell_check_for_update(
    app: AppHandle,
    state: State<'_, ShellRuntime>,
) -> Result<Option<UpdateNotice>, String> {
    let Some(url) = state.config().version_check_url.as_deref() else {
        return Ok(None);
    };

    let response = fetch_version_info(state.http(), url)
        .await
        .map_err(|err| format!("Version check failed: {err}"))?;

    let current = app.package_info().version.to_string();
    let notice = UpdateNotice::evaluate(&current, &response, Platform::current());
    if let Some(notice) = &notice {
        log::info!(
            "[shell:update] {} -> {} available (required: {})",
            notice.current_version,
            notice.latest_version,
            notice.required
        );
    }
    Ok(notice)
}

#[tauri::command]
pub async fn shell_open_store(
    app_url: String,
    web_url: String,
    state: State<'_, ShellRuntime>,
) -> Result<(), String> {
    let router = state.router();
    router
        .dispatcher()
        .open_store(&app_url, &web_url)
        .await
        .map_err(|err| format!("Failed to open store: {err}"))
}
