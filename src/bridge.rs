//! Delivery of notification targets into the browser surface.
//!
//! A clicked notification can arrive while the surface is live, or before it
//! exists at all (cold start, background wake). Every target is persisted
//! first; a live surface is additionally told right away, and a surface that
//! mounts later replays whatever is still pending.

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;
use serde_json::Value;

use crate::storage::PendingTargetStore;

pub const TARGET_URL_FIELD: &str = "targetUrl";

pub type TargetCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// The one callback through which the mounted surface accepts targets.
///
/// Registering replaces whatever was there; only one surface is ever mounted.
#[derive(Default)]
pub struct LiveTargetSlot {
    callback: Mutex<Option<TargetCallback>>,
}

impl LiveTargetSlot {
    pub fn register(&self, callback: TargetCallback) {
        *self.callback.lock() = Some(callback);
    }

    pub fn unregister(&self) {
        self.callback.lock().take();
    }

    pub fn is_registered(&self) -> bool {
        self.callback.lock().is_some()
    }

    /// Calls the registered callback, returning false when none is mounted.
    pub fn invoke(&self, url: &str) -> bool {
        // Clone out so the callback runs without the slot locked.
        let callback = self.callback.lock().clone();
        match callback {
            Some(callback) => {
                callback(url);
                true
            }
            None => false,
        }
    }
}

pub struct NotificationBridge {
    slot: LiveTargetSlot,
    pending: PendingTargetStore,
}

impl NotificationBridge {
    pub fn new(pending: PendingTargetStore) -> Self {
        Self {
            slot: LiveTargetSlot::default(),
            pending,
        }
    }

    pub fn is_surface_mounted(&self) -> bool {
        self.slot.is_registered()
    }

    /// Registers the surface and then replays any pending target into it.
    ///
    /// Registration happens strictly before the replay so a click received
    /// during a cold start is never lost.
    pub async fn mount_surface(&self, callback: TargetCallback) -> Option<String> {
        self.slot.register(callback);
        debug!("[shell:bridge] surface mounted");
        self.replay_pending().await
    }

    pub fn unmount_surface(&self) {
        self.slot.unregister();
        debug!("[shell:bridge] surface unmounted");
    }

    /// Handles a notification click. `data` is the notification's payload.
    pub async fn handle_notification_click(&self, data: &Value) {
        let Some(url) = target_url(data) else {
            info!("[shell:bridge] notification without {TARGET_URL_FIELD}, ignoring");
            return;
        };

        self.pending.save(url).await;

        if self.slot.invoke(url) {
            info!("[shell:bridge] delivered notification target {url}");
        } else {
            info!("[shell:bridge] no surface mounted, kept {url} for replay");
        }
    }

    /// Feeds the pending target, if any, to the mounted surface and clears it.
    pub async fn replay_pending(&self) -> Option<String> {
        let url = self.pending.load().await?;

        if !self.slot.invoke(&url) {
            warn!("[shell:bridge] replay requested with no surface mounted, keeping {url}");
            return None;
        }

        info!("[shell:bridge] replayed pending target {url}");
        self.pending.clear().await;
        Some(url)
    }
}

fn target_url(data: &Value) -> Option<&str> {
    match data.get(TARGET_URL_FIELD) {
        Some(Value::String(url)) if !url.trim().is_empty() => Some(url.as_str()),
        Some(other) => {
            warn!("[shell:bridge] ignoring non-string {TARGET_URL_FIELD}: {other}");
            None
        }
        None => None,
    }
}
