use parking_lot::Mutex;

use crate::config::ShellConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAction {
    Register(String),
    AutoLogin(String),
    Nothing,
}

#[derive(Debug, Default)]
struct SessionInner {
    token: Option<String>,
    logged_in: bool,
    auto_login_fired: bool,
}

/// Push token and login state of the page, as reported by the page itself.
#[derive(Debug, Default)]
pub struct PushSession {
    inner: Mutex<SessionInner>,
}

impl PushSession {
    pub fn on_token(&self, token: &str, config: &ShellConfig) -> TokenAction {
        let mut inner = self.inner.lock();
        inner.token = Some(token.to_string());

        if inner.logged_in {
            return TokenAction::Register(token.to_string());
        }
        if inner.auto_login_fired {
            return TokenAction::Nothing;
        }
        inner.auto_login_fired = true;
        TokenAction::AutoLogin(config.auto_login_url(token))
    }

    /// Marks the page logged in; returns the token to register, if known.
    pub fn on_login(&self) -> Option<String> {
        let mut inner = self.inner.lock();
        inner.logged_in = true;
        inner.token.clone()
    }

    /// Marks the page logged out and forgets the token, returning it so it
    /// can be revoked.
    pub fn on_logout(&self) -> Option<String> {
        let mut inner = self.inner.lock();
        inner.logged_in = false;
        inner.token.take()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.lock().logged_in
    }
}
