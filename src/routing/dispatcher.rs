use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info, warn};

use super::intent::{market_to_web, strip_prefix_ignore_case, IntentUrl, INTENT_PREFIX, MARKET_PREFIX};

/// The operating system's "open this URL with whatever handles it" primitive.
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn can_open(&self, url: &str) -> bool;
    async fn open(&self, url: &str) -> Result<()>;
}

/// Hands URLs the surface must not load to the operating system.
///
/// Every attempt is best effort: failures are logged and dropped so a broken
/// deep link never interrupts the browsing session.
#[derive(Clone)]
pub struct ExternalDispatcher {
    opener: Arc<dyn UrlOpener>,
}

impl ExternalDispatcher {
    pub fn new(opener: Arc<dyn UrlOpener>) -> Self {
        Self { opener }
    }

    pub async fn open_externally(&self, url: &str) {
        match self.dispatch(url).await {
            Ok(true) => {}
            Ok(false) => info!("[shell:dispatch] no handler for {url}, dropping"),
            Err(err) => warn!("[shell:dispatch] failed to open {url}: {err}"),
        }
    }

    /// Opens the app-store deep link when the OS supports it, otherwise the
    /// web listing. Unlike [`open_externally`](Self::open_externally) the
    /// failure is returned, so the update prompt can tell the user.
    pub async fn open_store(&self, app_url: &str, web_url: &str) -> Result<()> {
        if !app_url.is_empty() && self.attempt(app_url).await {
            return Ok(());
        }
        if web_url.is_empty() {
            return Err(anyhow!("no store URL available"));
        }
        self.opener.open(web_url).await
    }

    /// Opens `url` if the OS claims a handler for it. A failed open is logged
    /// and reported as `false` so callers can move on to the next candidate.
    async fn attempt(&self, url: &str) -> bool {
        if !self.opener.can_open(url).await {
            return false;
        }
        match self.opener.open(url).await {
            Ok(()) => true,
            Err(err) => {
                warn!("[shell:dispatch] {url} failed ({err})");
                false
            }
        }
    }

    async fn dispatch(&self, url: &str) -> Result<bool> {
        if strip_prefix_ignore_case(url, INTENT_PREFIX).is_some() {
            return self.dispatch_intent(url).await;
        }

        if self.attempt(url).await {
            return Ok(true);
        }

        if let Some(web_url) = market_to_web(url) {
            debug!("[shell:dispatch] {url} unsupported, using {web_url}");
            self.opener.open(&web_url).await?;
            return Ok(true);
        }

        Ok(false)
    }

    async fn dispatch_intent(&self, url: &str) -> Result<bool> {
        if self.attempt(url).await {
            return Ok(true);
        }

        let Some(intent) = IntentUrl::parse(url) else {
            return Ok(false);
        };

        if let Some(scheme_url) = intent.scheme_url() {
            if self.attempt(&scheme_url).await {
                return Ok(true);
            }
        }

        let Some(listing) = intent.store_listing() else {
            return Ok(false);
        };
        debug!("[shell:dispatch] falling back to store listing {listing}");
        if let Err(err) = self.opener.open(&listing).await {
            let web_url = market_to_web(&listing)
                .ok_or_else(|| anyhow!("{MARKET_PREFIX} listing could not be rewritten"))?;
            warn!("[shell:dispatch] {listing} failed ({err}), trying {web_url}");
            self.opener.open(&web_url).await?;
        }
        Ok(true)
    }
}
