use log::warn;
use tauri::{AppHandle, State};

use crate::messages::{route_web_message, WebMessage};
use crate::surface::{main_surface, navigate_to_url};
use crate::ShellRuntime;

/// Entry point for `window.sendToApp` and the injected console hooks.
#[tauri::command]
pub async fn shell_web_message(
    payload: String,
    state: State<'_, ShellRuntime>,
) -> Result<(), String> {
    let Some(message) = WebMessage::parse(&payload) else {
        return Ok(());
    };
    route_web_message(message, state.router().dispatcher(), state.push()).await;
    Ok(())
}

/// Receives a new or rotated push token from the platform layer.
#[tauri::command]
pub async fn shell_push_token(
    token: String,
    app: AppHandle,
    state: State<'_, ShellRuntime>,
) -> Result<(), String> {
    let token = token.trim();
    if token.is_empty() {
        return Err("Push token is empty".to_string());
    }

    let Some(auto_login_url) = state.push().handle_token(token, state.config()).await else {
        return Ok(());
    };

    match main_surface(&app) {
        Some(window) => navigate_to_url(&window, &auto_login_url)
            .map_err(|err| format!("Failed to start auto-login: {err}")),
        None => {
            warn!("[shell:push] auto-login skipped, surface not mounted");
            Ok(())
        }
    }
}
