//! Navigation routing for the embedded surface: classify every navigation,
//! let the surface load what belongs to it, hand the rest to the OS.

mod classifier;
mod dispatcher;
mod intent;

use std::sync::Arc;

use anyhow::Result;

pub use classifier::{looks_like_http, Classification, Classifier, RoutingDecision, SchemeFamily};
pub use dispatcher::{ExternalDispatcher, UrlOpener};
pub use intent::IntentUrl;

#[cfg(test)]
pub(crate) use dispatcher::tests::RecordingOpener;

use crate::config::ShellConfig;

pub struct NavigationRouter {
    classifier: Classifier,
    dispatcher: ExternalDispatcher,
}

impl NavigationRouter {
    pub fn new(config: &ShellConfig, opener: Arc<dyn UrlOpener>) -> Result<Self> {
        Ok(Self {
            classifier: Classifier::new(config)?,
            dispatcher: ExternalDispatcher::new(opener),
        })
    }

    pub fn classify(&self, url: &str) -> Classification {
        self.classifier.classify(url)
    }

    pub fn dispatcher(&self) -> &ExternalDispatcher {
        &self.dispatcher
    }

    /// Answers the surface's "may this navigation proceed?" query.
    ///
    /// External targets are handed to the dispatcher on the async runtime and
    /// the surface is told to stay where it is.
    pub fn intercept(&self, url: &str) -> Classification {
        let classification = self.classify(url);
        if let RoutingDecision::External { scheme_family } = classification.decision {
            log::info!("[shell:route] {url} -> external ({scheme_family:?})");
            let dispatcher = self.dispatcher.clone();
            let url = url.to_string();
            tauri::async_runtime::spawn(async move {
                dispatcher.open_externally(&url).await;
            });
        }
        classification
    }

    /// The in-surface back button is only offered on identity-provider and
    /// payment pages, which have no navigation chrome of their own.
    pub fn back_affordance_visible(&self, can_go_back: bool, current_url: &str) -> bool {
        can_go_back && self.classify(current_url).decision == RoutingDecision::AuthOrPayment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn router(opener: Arc<RecordingOpener>) -> NavigationRouter {
        NavigationRouter::new(&ShellConfig::with_base_url("https://selftest.example"), opener)
            .unwrap()
    }

    #[tokio::test]
    async fn intercept_hands_external_targets_to_dispatcher() {
        let opener = Arc::new(RecordingOpener::supporting(&["tel:021234567"]));
        let router = router(opener.clone());

        let verdict = router.intercept("tel:021234567");
        assert!(!verdict.proceeds_in_surface());

        for _ in 0..50 {
            if !opener.opened().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(opener.opened(), vec!["tel:021234567"]);
    }

    #[test]
    fn intercept_lets_site_pages_through() {
        let opener = Arc::new(RecordingOpener::default());
        let router = router(opener.clone());
        assert!(router.intercept("https://selftest.example/home").proceeds_in_surface());
        assert!(opener.opened().is_empty());
    }

    #[test]
    fn back_affordance_only_on_auth_and_payment() {
        let router = router(Arc::new(RecordingOpener::default()));
        assert!(router.back_affordance_visible(true, "https://accounts.google.com/o/oauth2"));
        assert!(router.back_affordance_visible(true, "https://tosspayments.com/pay"));
        assert!(!router.back_affordance_visible(false, "https://accounts.google.com/o/oauth2"));
        assert!(!router.back_affordance_visible(true, "https://selftest.example/home"));
    }
}
