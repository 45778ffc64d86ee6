use tauri::{AppHandle, State, WebviewWindow};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};

use crate::surface::SurfaceSnapshot;
use crate::ShellRuntime;

/// Hardware/gesture back: step back in the page, or offer to quit.
#[tauri::command]
pub async fn shell_back_pressed(
    can_go_back: bool,
    window: WebviewWindow,
    app: AppHandle,
) -> Result<(), String> {
    if can_go_back {
        return window
            .eval("history.back()")
            .map_err(|err| format!("Failed to go back: {err}"));
    }

    let handle = app.clone();
    app.dialog()
        .message("The app will close when you press OK.")
        .title("Notice")
        .kind(MessageDialogKind::Warning)
        .buttons(MessageDialogButtons::OkCancelCustom(
            "OK".to_string(),
            "Cancel".to_string(),
        ))
        .show(move |confirmed| {
            if confirmed {
                handle.exit(0);
            }
        });
    Ok(())
}

#[tauri::command]
pub async fn shell_back_affordance(
    can_go_back: bool,
    state: State<'_, ShellRuntime>,
) -> Result<bool, String> {
    let current_url = state.surface().current_url();
    Ok(state
        .router()
        .back_affordance_visible(can_go_back, &current_url))
}

#[tauri::command]
pub async fn shell_surface_state(
    state: State<'_, ShellRuntime>,
) -> Result<SurfaceSnapshot, String> {
    Ok(state.surface().snapshot())
}
