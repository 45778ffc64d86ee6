//! Messages posted by the page through `window.sendToApp` and the console
//! hooks of the injected script.

use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::push::PushCoordinator;
use crate::routing::ExternalDispatcher;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebMessage {
    OpenUrl {
        #[serde(default)]
        url: Option<String>,
    },
    LoginOk,
    LogoutOk,
    ConsoleLog {
        #[serde(default)]
        log: Value,
    },
    ConsoleError {
        #[serde(default)]
        log: Value,
    },
    JsError {
        #[serde(default)]
        error: Value,
    },
    #[serde(other)]
    Unknown,
}

impl WebMessage {
    /// Decodes one JSON message. Anything that isn't an object with a string
    /// `type` yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(message) => Some(message),
            Err(err) => {
                warn!("[shell:web] undecodable message ({err}): {raw}");
                None
            }
        }
    }
}

/// Acts on one page message. Nothing here reports back to the page.
pub async fn route_web_message(
    message: WebMessage,
    dispatcher: &ExternalDispatcher,
    push: &PushCoordinator,
) {
    match message {
        WebMessage::OpenUrl { url: Some(url) } if !url.is_empty() => {
            dispatcher.open_externally(&url).await;
        }
        WebMessage::OpenUrl { .. } => {}
        WebMessage::LoginOk => push.handle_login().await,
        WebMessage::LogoutOk => push.handle_logout().await,
        WebMessage::ConsoleLog { log } => info!("[shell:web] console: {}", display(&log)),
        WebMessage::ConsoleError { log } => warn!("[shell:web] console error: {}", display(&log)),
        WebMessage::JsError { error } => warn!("[shell:web] page error: {error}"),
        WebMessage::Unknown => {}
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
