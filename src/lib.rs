pub mod bridge;
mod commands;
pub mod config;
pub mod logging;
pub mod messages;
pub mod push;
pub mod routing;
pub mod storage;
pub mod surface;
pub mod version;

use std::sync::Arc;

use anyhow::Result;
use log::info;
use reqwest::Client;
use tauri::{AppHandle, Manager, Runtime};
use tauri_plugin_dialog::init as dialog_plugin;
use tauri_plugin_notification::init as notification_plugin;
use tauri_plugin_shell::init as shell_plugin;

use bridge::NotificationBridge;
use commands::logs::fetch_shell_logs;
use commands::navigation::{shell_back_affordance, shell_back_pressed, shell_surface_state};
use commands::notifications::{shell_notification_clicked, shell_show_notification};
use commands::update::{shell_check_for_update, shell_open_store};
use commands::web::{shell_push_token, shell_web_message};
use config::ShellConfig;
use push::{HttpTokenRegistry, PushCoordinator};
use routing::NavigationRouter;
use storage::{default_store_path, FileKvStore, KeyValueStore, PendingTargetStore};
use surface::{mount_main_surface, ShellOpener, SurfaceState, MAIN_SURFACE_LABEL};

/// Everything the commands and the surface share for the life of the app.
#[derive(Clone)]
pub struct ShellRuntime {
    config: Arc<ShellConfig>,
    router: Arc<NavigationRouter>,
    bridge: Arc<NotificationBridge>,
    push: Arc<PushCoordinator>,
    surface: Arc<SurfaceState>,
    http: Client,
}

impl ShellRuntime {
    fn initialize<R: Runtime>(app: &AppHandle<R>) -> Result<Self> {
        let config = Arc::new(ShellConfig::from_env());

        let store_path = app
            .path()
            .app_data_dir()
            .map(|dir| dir.join("storage.json"))
            .or_else(|_| default_store_path())?;
        info!("[shell:store] using {}", store_path.display());
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(store_path));

        let router = Arc::new(NavigationRouter::new(
            &config,
            Arc::new(ShellOpener::new(app.clone())?),
        )?);
        let bridge = Arc::new(NotificationBridge::new(PendingTargetStore::new(kv.clone())));
        let registry = Arc::new(HttpTokenRegistry::new(config.api.clone())?);
        let push = Arc::new(PushCoordinator::new(
            registry,
            kv,
            app.package_info().version.to_string(),
        ));

        Ok(Self {
            config,
            router,
            bridge,
            push,
            surface: Arc::new(SurfaceState::default()),
            http: Client::builder().build()?,
        })
    }

    pub fn config(&self) -> &ShellConfig {
        self.config.as_ref()
    }

    pub fn router(&self) -> Arc<NavigationRouter> {
        self.router.clone()
    }

    pub fn bridge(&self) -> Arc<NotificationBridge> {
        self.bridge.clone()
    }

    pub fn push(&self) -> &PushCoordinator {
        self.push.as_ref()
    }

    pub fn surface(&self) -> Arc<SurfaceState> {
        self.surface.clone()
    }

    pub fn http(&self) -> &Client {
        &self.http
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let app = tauri::Builder::default()
        .plugin(shell_plugin())
        .plugin(dialog_plugin())
        .plugin(notification_plugin())
        .plugin(logging::plugin())
        .setup(|app| {
            let runtime = ShellRuntime::initialize(app.handle())?;
            app.manage(runtime.clone());

            let window = mount_main_surface(app.handle(), &runtime)?;
            let _ = window.show();
            let _ = window.set_focus();

            info!("[shell] surface mounted at {}", runtime.config().base_url);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            shell_web_message,
            shell_push_token,
            shell_show_notification,
            shell_notification_clicked,
            shell_back_pressed,
            shell_back_affordance,
            shell_surface_state,
            shell_check_for_update,
            shell_open_store,
            fetch_shell_logs,
        ])
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::Destroyed = event {
                if window.label() == MAIN_SURFACE_LABEL {
                    window.state::<ShellRuntime>().bridge().unmount_surface();
                }
            }
        })
        .build(tauri::generate_context!())
        .expect("failed to build Tauri application");

    app.run(|_app_handle, _event| {});
}
