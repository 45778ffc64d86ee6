//! Server-driven update prompts.

use std::cmp::Ordering;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const UPDATE_OPTIONAL: u8 = 1;
const UPDATE_REQUIRED: u8 = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct VersionCheckResponse {
    pub success: bool,
    #[serde(default)]
    pub msg: String,
    pub data: VersionData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionData {
    pub android: PlatformVersion,
    pub ios: PlatformVersion,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformVersion {
    pub ver: String,
    pub update: u8,
    pub store: StoreLinks,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreLinks {
    pub app: String,
    pub web: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Android
        }
    }
}

/// Compares dotted version strings component by component. Missing, empty
/// and non-numeric components all count as zero.
pub fn compare_versions(current: &str, server: &str) -> Ordering {
    let current: Vec<&str> = current.split('.').collect();
    let server: Vec<&str> = server.split('.').collect();

    for i in 0..current.len().max(server.len()) {
        let c = component(current.get(i).copied());
        let s = component(server.get(i).copied());
        match c.cmp(&s) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn component(part: Option<&str>) -> u64 {
    part.and_then(|part| part.trim().parse().ok()).unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotice {
    pub required: bool,
    pub current_version: String,
    pub latest_version: String,
    pub message: String,
    pub store_app_url: String,
    pub store_web_url: String,
}

impl UpdateNotice {
    pub fn evaluate(
        current_version: &str,
        response: &VersionCheckResponse,
        platform: Platform,
    ) -> Option<Self> {
        if !response.success {
            return None;
        }
        let entry = match platform {
            Platform::Android => &response.data.android,
            Platform::Ios => &response.data.ios,
        };
        if entry.update != UPDATE_OPTIONAL && entry.update != UPDATE_REQUIRED {
            return None;
        }
        if compare_versions(current_version, &entry.ver) != Ordering::Less {
            return None;
        }

        Some(Self {
            required: entry.update == UPDATE_REQUIRED,
            current_version: current_version.to_string(),
            latest_version: entry.ver.clone(),
            message: response.data.message.clone(),
            store_app_url: entry.store.app.clone(),
            store_web_url: entry.store.web.clone(),
        })
    }
}

pub async fn fetch_version_info(client: &Client, url: &str) -> Result<VersionCheckResponse> {
    let response = client
        .get(url)
        .header("Content-Type", "application/json")
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(anyhow!("HTTP error! status: {}", response.status()));
    }
    Ok(response.json::<VersionCheckResponse>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(android: (&str, u8), ios: (&str, u8)) -> VersionCheckResponse {
        serde_json::from_value(json!({
            "success": true,
            "msg": "ok",
            "data": {
                "android": {
                    "ver": android.0,
                    "update": android.1,
                    "store": { "app": "market://details?id=kr.co.webin.selftest", "web": "https://play.google.com/store/apps/details?id=kr.co.webin.selftest" }
                },
                "ios": {
                    "ver": ios.0,
                    "update": ios.1,
                    "store": { "app": "itms-apps://apps.apple.com/app/id1", "web": "https://apps.apple.com/app/id1" }
                },
                "message": "A new version is available"
            }
        }))
        .unwrap()
    }

    #[test]
    fn compares_numerically() {
        assert_eq!(compare_versions("1.0.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare_versions("1.10.0", "1.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare_versions("2", "1.9"), Ordering::Greater);
    }

    #[test]
    fn non_numeric_components_count_as_zero() {
        assert_eq!(compare_versions("1.beta.0", "1.2.0"), Ordering::Less);
        assert_eq!(compare_versions("1.2.0", "1.beta.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.beta.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1..0", "1.1.0"), Ordering::Less);
        // "1-rc1" is not a number, so it reads as 0 rather than 1.
        assert_eq!(compare_versions("1.0.0", "1.0.1-rc1"), Ordering::Equal);
    }

    #[test]
    fn required_update_for_platform() {
        let notice =
            UpdateNotice::evaluate("1.0.0", &response(("1.2.0", 2), ("1.0.0", 1)), Platform::Android)
                .unwrap();
        assert!(notice.required);
        assert_eq!(notice.latest_version, "1.2.0");
        assert_eq!(notice.store_app_url, "market://details?id=kr.co.webin.selftest");

        assert!(
            UpdateNotice::evaluate("1.0.0", &response(("1.2.0", 2), ("1.0.0", 1)), Platform::Ios)
                .is_none()
        );
    }

    #[test]
    fn optional_update() {
        let notice =
            UpdateNotice::evaluate("1.0.0", &response(("1.0.0", 1), ("1.1.0", 1)), Platform::Ios)
                .unwrap();
        assert!(!notice.required);
        assert_eq!(notice.message, "A new version is available");
    }

    #[test]
    fn unknown_policy_or_failed_check_yields_nothing() {
        assert!(
            UpdateNotice::evaluate("1.0.0", &response(("2.0.0", 0), ("2.0.0", 0)), Platform::Android)
                .is_none()
        );
        let mut failed = response(("2.0.0", 2), ("2.0.0", 2));
        failed.success = false;
        assert!(UpdateNotice::evaluate("1.0.0", &failed, Platform::Android).is_none());
    }
}
