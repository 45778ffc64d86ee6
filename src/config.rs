//! Static configuration for the shell: the remote site, its API endpoints,
//! and the domain/scheme lists the navigation router works from.

pub const BASE_URL: &str = "https://selftest.webin.co.kr";

const AUTO_LOGIN_PATH: &str = "/api/fcm/auto_login.php";
const REGISTER_PATH: &str = "/api/fcm/register.php";
const REVOKE_PATH: &str = "/api/fcm/revoke.php";
const ORDER_COMPLETE_PATH: &str = "/order/complete.php";
const ORDER_FAIL_PATH: &str = "/order/fail.php";

pub const PAYMENT_DOMAINS: &[&str] = &[
    "payment-gateway.tosspayments.com",
    "payment-gateway-sandbox.tosspayments.com",
    "tosspayments.com",
];

pub const AUTH_DOMAINS: &[&str] = &[
    "nid.naver.com",
    "accounts.kakao.com",
    "kauth.kakao.com",
    "accounts.google.com",
    "appleid.apple.com",
    "idmsa.apple.com",
    "auth.apple.com",
];

pub const EXTERNAL_SCHEME_PATTERN: &str = r"(?i)^(tel:|mailto:|sms:|intent:|market:|kakaotalk:|kakaolink:|supertoss:|tdirectsdk:|ispmobile:|kftc-bankpay:|naversearchapp:|navercafe:)";

/// URLs the shell plugin may hand to the OS. Kept identical to
/// `plugins.shell.open` in `tauri.conf.json`.
pub const OPEN_SCOPE_PATTERN: &str = r"(?i)^(https?://|mailto:|tel:|sms:|intent:|market:|kakaotalk:|kakaolink:|supertoss:|tdirectsdk:|ispmobile:|kftc-bankpay:|naversearchapp:|navercafe:)";

pub const APP_STORE_WEB_MARKER: &str = "play.google.com/store";

pub const USER_AGENT_IOS: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Mobile/15E148 Safari/604.1";
pub const USER_AGENT_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/96.0.4664.104 Mobile Safari/537.36";
pub const USER_AGENT_DEFAULT: &str = "Mozilla/5.0 Mobile";

pub const PENDING_TARGET_KEY: &str = "last_notification_url";
pub const DEVICE_ID_KEY: &str = "selftest_device_id";

const BASE_URL_ENV: &str = "SELFTEST_BASE_URL";
const VERSION_CHECK_URL_ENV: &str = "SELFTEST_VERSION_CHECK_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub auto_login: String,
    pub register: String,
    pub revoke: String,
}

#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub base_url: String,
    pub api: ApiEndpoints,
    pub order_complete: String,
    pub order_fail: String,
    pub payment_domains: Vec<String>,
    pub auth_domains: Vec<String>,
    pub external_scheme_pattern: String,
    pub app_store_web_marker: String,
    pub version_check_url: Option<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::with_base_url(BASE_URL)
    }
}

impl ShellConfig {
    /// Builds the configuration around `base_url`; every endpoint and order
    /// callback prefix is derived from it.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            api: ApiEndpoints {
                auto_login: format!("{base}{AUTO_LOGIN_PATH}"),
                register: format!("{base}{REGISTER_PATH}"),
                revoke: format!("{base}{REVOKE_PATH}"),
            },
            order_complete: format!("{base}{ORDER_COMPLETE_PATH}"),
            order_fail: format!("{base}{ORDER_FAIL_PATH}"),
            payment_domains: PAYMENT_DOMAINS.iter().map(|d| d.to_string()).collect(),
            auth_domains: AUTH_DOMAINS.iter().map(|d| d.to_string()).collect(),
            external_scheme_pattern: EXTERNAL_SCHEME_PATTERN.to_string(),
            app_store_web_marker: APP_STORE_WEB_MARKER.to_string(),
            version_check_url: None,
            base_url: base,
        }
    }

    pub fn from_env() -> Self {
        let mut config = match read_env(BASE_URL_ENV) {
            Some(base) => Self::with_base_url(&base),
            None => Self::default(),
        };
        config.version_check_url = read_env(VERSION_CHECK_URL_ENV);
        config
    }

    pub fn user_agent(&self) -> &'static str {
        if cfg!(target_os = "ios") {
            USER_AGENT_IOS
        } else if cfg!(target_os = "android") {
            USER_AGENT_ANDROID
        } else {
            USER_AGENT_DEFAULT
        }
    }

    pub fn auto_login_url(&self, token: &str) -> String {
        format!(
            "{}?fcm_token={}",
            self.api.auto_login,
            urlencoding::encode(token)
        )
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
