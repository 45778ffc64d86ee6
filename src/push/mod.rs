mod registry;
mod session;

use std::sync::Arc;

use log::{info, warn};

pub use registry::{DeviceInfo, HttpTokenRegistry, TokenRegistry};
pub use session::{PushSession, TokenAction};

use crate::config::ShellConfig;
use crate::storage::{device_id, KeyValueStore};

/// Keeps the server's token registration in step with the page's login
/// state. Every server call is best effort.
pub struct PushCoordinator {
    session: PushSession,
    registry: Arc<dyn TokenRegistry>,
    kv: Arc<dyn KeyValueStore>,
    app_version: String,
}

impl PushCoordinator {
    pub fn new(
        registry: Arc<dyn TokenRegistry>,
        kv: Arc<dyn KeyValueStore>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            session: PushSession::default(),
            registry,
            kv,
            app_version: app_version.into(),
        }
    }

    pub fn session(&self) -> &PushSession {
        &self.session
    }

    /// Records a new or rotated token. Returns the auto-login URL the surface
    /// should load, if this token should sign the user in.
    pub async fn handle_token(&self, token: &str, config: &ShellConfig) -> Option<String> {
        match self.session.on_token(token, config) {
            TokenAction::Register(token) => {
                self.register(&token).await;
                None
            }
            TokenAction::AutoLogin(url) => {
                info!("[shell:push] auto-login with fresh token");
                Some(url)
            }
            TokenAction::Nothing => None,
        }
    }

    pub async fn handle_login(&self) {
        if let Some(token) = self.session.on_login() {
            self.register(&token).await;
        }
    }

    pub async fn handle_logout(&self) {
        if let Some(token) = self.session.on_logout() {
            match self.registry.revoke(&token).await {
                Ok(response) => info!("[shell:push] token revoked: {response}"),
                Err(err) => warn!("[shell:push] token revoke failed: {err}"),
            }
        }
    }

    async fn register(&self, token: &str) {
        let device = DeviceInfo::current(device_id(self.kv.as_ref()).await, self.app_version.clone());
        match self.registry.register(token, &device).await {
            Ok(response) => info!("[shell:push] token registered: {response}"),
            Err(err) => warn!("[shell:push] token register failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKvStore;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    #[derive(Default)]
    struct RecordingRegistry {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl TokenRegistry for RecordingRegistry {
        async fn register(&self, token: &str, device: &DeviceInfo) -> Result<Value> {
            self.calls
                .lock()
                .push(format!("register:{token}:{}", device.app_version));
            if self.fail {
                return Err(anyhow!("offline"));
            }
            Ok(json!({ "success": true }))
        }

        async fn revoke(&self, token: &str) -> Result<Value> {
            self.calls.lock().push(format!("revoke:{token}"));
            if self.fail {
                return Err(anyhow!("offline"));
            }
            Ok(json!({ "success": true }))
        }
    }

    fn coordinator(registry: Arc<RecordingRegistry>) -> PushCoordinator {
        PushCoordinator::new(registry, Arc::new(MemoryKvStore::default()), "1.0.0")
    }

    #[tokio::test]
    async fn login_registers_known_token() {
        let registry = Arc::new(RecordingRegistry::default());
        let push = coordinator(registry.clone());
        let config = ShellConfig::default();

        let auto_login = push.handle_token("tok", &config).await;
        assert_eq!(auto_login, Some(config.auto_login_url("tok")));
        assert!(registry.calls.lock().is_empty());

        push.handle_login().await;
        assert_eq!(*registry.calls.lock(), vec!["register:tok:1.0.0"]);

        push.handle_token("tok2", &config).await;
        assert_eq!(registry.calls.lock().last().unwrap(), "register:tok2:1.0.0");
    }

    #[tokio::test]
    async fn logout_revokes_once() {
        let registry = Arc::new(RecordingRegistry::default());
        let push = coordinator(registry.clone());
        push.handle_token("tok", &ShellConfig::default()).await;
        push.handle_login().await;

        push.handle_logout().await;
        push.handle_logout().await;

        let calls = registry.calls.lock().clone();
        assert_eq!(calls, vec!["register:tok:1.0.0", "revoke:tok"]);
    }

    #[tokio::test]
    async fn registry_failures_are_absorbed() {
        let registry = Arc::new(RecordingRegistry {
            fail: true,
            ..Default::default()
        });
        let push = coordinator(registry.clone());
        push.handle_token("tok", &ShellConfig::default()).await;
        push.handle_login().await;
        push.handle_logout().await;
        assert_eq!(registry.calls.lock().len(), 2);
        assert!(!push.session().is_logged_in());
    }
}
