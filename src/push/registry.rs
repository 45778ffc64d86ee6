use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use sysinfo::System;

use crate::config::ApiEndpoints;

const UNKNOWN: &str = "unknown";

/// What the push API records about the device a token belongs to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Hardware model name. Neither Tauri nor `sysinfo` exposes it, so the
    /// shell always sends `"unknown"`.
    pub model: String,
    pub os: String,
    pub os_version: String,
    pub device_id: String,
    pub app_version: String,
}

impl DeviceInfo {
    pub fn current(device_id: String, app_version: String) -> Self {
        Self {
            model: UNKNOWN.to_string(),
            os: std::env::consts::OS.to_string(),
            os_version: System::os_version().unwrap_or_else(|| UNKNOWN.to_string()),
            device_id,
            app_version,
        }
    }
}

/// Server-side record of which device tokens belong to the logged-in user.
#[async_trait]
pub trait TokenRegistry: Send + Sync {
    async fn register(&self, token: &str, device: &DeviceInfo) -> Result<Value>;
    async fn revoke(&self, token: &str) -> Result<Value>;
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    token: &'a str,
    device_info: &'a DeviceInfo,
}

#[derive(Serialize)]
struct RevokeRequest<'a> {
    token: &'a str,
}

/// Talks to the site's push API. The session cookie lives in the surface, so
/// the server may reject these calls for a logged-out user; callers only log
/// the outcome.
pub struct HttpTokenRegistry {
    client: Client,
    endpoints: ApiEndpoints,
}

impl HttpTokenRegistry {
    pub fn new(endpoints: ApiEndpoints) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, endpoints })
    }

    async fn post<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<Value> {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("{url} responded with {status}"));
        }
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl TokenRegistry for HttpTokenRegistry {
    async fn register(&self, token: &str, device: &DeviceInfo) -> Result<Value> {
        let body = RegisterRequest {
            token,
            device_info: device,
        };
        self.post(&self.endpoints.register, &body).await
    }

    async fn revoke(&self, token: &str) -> Result<Value> {
        self.post(&self.endpoints.revoke, &RevokeRequest { token })
            .await
    }
}
