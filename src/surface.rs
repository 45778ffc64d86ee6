//! The embedded browser surface: the `main` webview window, its navigation
//! hook, and the OS opener it hands external links to.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::Mutex;
use regex::Regex;
use serde::Serialize;
use tauri::webview::{DownloadEvent, PageLoadEvent};
use tauri::{AppHandle, Emitter, Manager, Runtime, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use url::Url;

use crate::bridge::TargetCallback;
use crate::config::{ShellConfig, OPEN_SCOPE_PATTERN};
use crate::routing::{looks_like_http, UrlOpener};
use crate::ShellRuntime;

pub const MAIN_SURFACE_LABEL: &str = "main";
pub const LOADING_CHANGED_EVENT: &str = "shell:loading-changed";

const INJECTED_SCRIPT_TEMPLATE: &str = include_str!("injected.js");

/// Opens URLs with the platform's default handler via the shell plugin.
/// `can_open` answers from the same scope the plugin enforces on `open`.
pub struct ShellOpener<R: Runtime> {
    app: AppHandle<R>,
    scope: Regex,
}

impl<R: Runtime> ShellOpener<R> {
    pub fn new(app: AppHandle<R>) -> Result<Self> {
        Ok(Self {
            app,
            scope: Regex::new(OPEN_SCOPE_PATTERN)?,
        })
    }
}

#[async_trait]
impl<R: Runtime> UrlOpener for ShellOpener<R> {
    async fn can_open(&self, url: &str) -> bool {
        openable(&self.scope, url)
    }

    async fn open(&self, url: &str) -> Result<()> {
        use tauri_plugin_shell::ShellExt;
        #[allow(deprecated)]
        let result = self.app.shell().open(url, None);
        result.map_err(|err| anyhow!("shell open failed: {err}"))
    }
}

fn openable(scope: &Regex, url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    scope.is_match(url) && platform_handles_scheme(parsed.scheme())
}

#[cfg(target_os = "android")]
fn platform_handles_scheme(_scheme: &str) -> bool {
    true
}

// Android-only schemes have no handler anywhere else; returning false sends
// `market:` links down the web-store fallback.
#[cfg(not(target_os = "android"))]
fn platform_handles_scheme(scheme: &str) -> bool {
    !matches!(scheme, "intent" | "market")
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceSnapshot {
    pub url: String,
    pub loading: bool,
}

/// What the surface is showing right now.
#[derive(Default)]
pub struct SurfaceState {
    current_url: Mutex<String>,
    loading: AtomicBool,
}

impl SurfaceState {
    pub fn current_url(&self) -> String {
        self.current_url.lock().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn set_current_url(&self, url: &str) {
        *self.current_url.lock() = url.to_string();
    }

    /// Returns true when the flag actually changed.
    pub fn set_loading(&self, loading: bool) -> bool {
        self.loading.swap(loading, Ordering::SeqCst) != loading
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            url: self.current_url(),
            loading: self.is_loading(),
        }
    }
}

pub fn injected_script(config: &ShellConfig) -> String {
    let auth = serde_json::to_string(&config.auth_domains).unwrap_or_else(|_| "[]".into());
    let payment = serde_json::to_string(&config.payment_domains).unwrap_or_else(|_| "[]".into());
    INJECTED_SCRIPT_TEMPLATE
        .replace("__AUTH_DOMAINS__", &auth)
        .replace("__PAYMENT_DOMAINS__", &payment)
}

/// Loads `url` in the surface. Anything that isn't an http(s) URL is refused.
pub fn navigate_to_url<R: Runtime>(window: &WebviewWindow<R>, url: &str) -> Result<()> {
    if !looks_like_http(url) {
        return Err(anyhow!("refusing to load non-http target {url:?}"));
    }
    let parsed = Url::parse(url)?;
    info!("[shell:surface] navigating to {url}");
    window.navigate(parsed)?;
    Ok(())
}

fn set_loading<R: Runtime>(app: &AppHandle<R>, state: &SurfaceState, loading: bool) {
    if state.set_loading(loading) {
        let _ = app.emit(LOADING_CHANGED_EVENT, loading);
    }
}

/// Builds the `main` window and registers it with the notification bridge.
pub fn mount_main_surface<R: Runtime>(
    app: &AppHandle<R>,
    runtime: &ShellRuntime,
) -> Result<WebviewWindow<R>> {
    let config = runtime.config();
    let start_url = Url::parse(&config.base_url)?;

    let navigation_router = runtime.router();
    let navigation_state = runtime.surface();
    let navigation_app = app.clone();

    let load_state = runtime.surface();
    let load_app = app.clone();

    let download_dispatcher = runtime.router().dispatcher().clone();

    let window = WebviewWindowBuilder::new(app, MAIN_SURFACE_LABEL, WebviewUrl::External(start_url))
        .title("Selftest")
        .user_agent(config.user_agent())
        .initialization_script(&injected_script(config))
        .on_navigation(move |url| {
            let classification = navigation_router.intercept(url.as_str());
            if classification.show_loading {
                set_loading(&navigation_app, &navigation_state, true);
            }
            classification.proceeds_in_surface()
        })
        .on_page_load(move |_window, payload| {
            let url = payload.url().as_str();
            match payload.event() {
                PageLoadEvent::Started => {
                    load_state.set_current_url(url);
                    set_loading(&load_app, &load_state, true);
                }
                PageLoadEvent::Finished => {
                    load_state.set_current_url(url);
                    set_loading(&load_app, &load_state, false);
                }
            }
        })
        .on_download(move |_webview, event| {
            if let DownloadEvent::Requested { url, .. } = event {
                let dispatcher = download_dispatcher.clone();
                let url = url.to_string();
                debug!("[shell:surface] handing download {url} to the OS");
                tauri::async_runtime::spawn(async move {
                    dispatcher.open_externally(&url).await;
                });
                return false;
            }
            true
        })
        .build()?;

    let target_window = window.clone();
    let callback: TargetCallback = Arc::new(move |url: &str| {
        if let Err(err) = navigate_to_url(&target_window, url) {
            warn!("[shell:surface] could not open notification target: {err}");
        }
    });

    let bridge = runtime.bridge();
    tauri::async_runtime::spawn(async move {
        bridge.mount_surface(callback).await;
    });

    Ok(window)
}

pub fn main_surface<R: Runtime>(app: &AppHandle<R>) -> Option<WebviewWindow<R>> {
    app.get_webview_window(MAIN_SURFACE_LABEL)
}
