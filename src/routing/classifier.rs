use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::config::ShellConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemeFamily {
    /// `tel:`, `mailto:`, `sms:`
    Communication,
    /// `intent:`, `market:` and app-store web listings
    AppIntent,
    /// Payment, banking and social apps with their own schemes.
    ThirdPartyApp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RoutingDecision {
    InSurface,
    #[serde(rename_all = "camelCase")]
    External {
        scheme_family: SchemeFamily,
    },
    AuthOrPayment,
}

/// Result of classifying one navigation target.
///
/// `show_loading` is not part of the routing decision itself: it tells the
/// caller to raise the loading indicator before the surface continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub decision: RoutingDecision,
    pub show_loading: bool,
}

impl Classification {
    fn in_surface() -> Self {
        Self {
            decision: RoutingDecision::InSurface,
            show_loading: false,
        }
    }

    /// Whether the embedded surface should go ahead with the navigation.
    pub fn proceeds_in_surface(&self) -> bool {
        !matches!(self.decision, RoutingDecision::External { .. })
    }
}

enum Predicate {
    HostIn(Vec<String>),
    Pattern(Regex),
    Contains(String),
    Prefix(String),
}

impl Predicate {
    fn matches(&self, url: &str, host: Option<&str>) -> bool {
        match self {
            Predicate::HostIn(domains) => host
                .map(|host| domains.iter().any(|domain| host_matches(host, domain)))
                .unwrap_or(false),
            Predicate::Pattern(pattern) => pattern.is_match(url),
            Predicate::Contains(needle) => url.contains(needle.as_str()),
            Predicate::Prefix(prefix) => url.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Clone, Copy)]
enum Outcome {
    AuthOrPayment,
    External,
}

struct Rule {
    name: &'static str,
    any_of: Vec<Predicate>,
    outcome: Outcome,
}

/// Ordered navigation rules, compiled once from a [`ShellConfig`].
///
/// Rules are evaluated top to bottom and the first match wins. Identity
/// provider hosts come before the external-scheme rule so login flows stay in
/// the surface even when they bounce through an app scheme.
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    pub fn new(config: &ShellConfig) -> Result<Self> {
        let scheme_pattern = Regex::new(&config.external_scheme_pattern)
            .context("invalid external scheme pattern")?;

        let rules = vec![
            Rule {
                name: "auth-domain",
                any_of: vec![Predicate::HostIn(config.auth_domains.clone())],
                outcome: Outcome::AuthOrPayment,
            },
            Rule {
                name: "external-scheme",
                any_of: vec![
                    Predicate::Pattern(scheme_pattern),
                    Predicate::Contains(config.app_store_web_marker.clone()),
                ],
                outcome: Outcome::External,
            },
            Rule {
                name: "payment",
                any_of: vec![
                    Predicate::HostIn(config.payment_domains.clone()),
                    Predicate::Prefix(config.order_complete.clone()),
                    Predicate::Prefix(config.order_fail.clone()),
                ],
                outcome: Outcome::AuthOrPayment,
            },
        ];

        Ok(Self { rules })
    }

    /// Classifies `url`. Never fails: anything no rule recognises stays in
    /// the surface.
    pub fn classify(&self, url: &str) -> Classification {
        let host = parse_host(url);
        let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.any_of.iter().any(|p| p.matches(url, host.as_deref())))
        else {
            return Classification::in_surface();
        };

        log::debug!("[shell:route] {} matched rule {}", url, rule.name);

        match rule.outcome {
            Outcome::AuthOrPayment => Classification {
                decision: RoutingDecision::AuthOrPayment,
                show_loading: true,
            },
            Outcome::External => Classification {
                decision: RoutingDecision::External {
                    scheme_family: scheme_family(url),
                },
                show_loading: false,
            },
        }
    }
}

/// True for absolute `http://` / `https://` URLs, the only targets the
/// surface is ever asked to load directly.
pub fn looks_like_http(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn parse_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(|host| host.to_ascii_lowercase())
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .map(|rest| rest.ends_with('.'))
            .unwrap_or(false)
}

fn scheme_family(url: &str) -> SchemeFamily {
    let scheme = url
        .split_once(':')
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
        .unwrap_or_default();

    match scheme.as_str() {
        "tel" | "mailto" | "sms" => SchemeFamily::Communication,
        "intent" | "market" | "http" | "https" => SchemeFamily::AppIntent,
        _ => SchemeFamily::ThirdPartyApp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(&ShellConfig::with_base_url("https://selftest.example")).unwrap()
    }

    #[test]
    fn auth_domain_stays_in_surface_with_loading() {
        let result = classifier().classify("https://nid.naver.com/login?x=1");
        assert_eq!(result.decision, RoutingDecision::AuthOrPayment);
        assert!(result.show_loading);
        assert!(result.proceeds_in_surface());
    }

    #[test]
    fn auth_domain_wins_over_external_scheme() {
        let result = classifier().classify("intent://accounts.kakao.com/login#Intent;scheme=kakaotalk;end");
        assert_eq!(result.decision, RoutingDecision::AuthOrPayment);
    }

    #[test]
    fn telephone_is_external() {
        let result = classifier().classify("tel:021234567");
        assert_eq!(
            result.decision,
            RoutingDecision::External {
                scheme_family: SchemeFamily::Communication
            }
        );
        assert!(!result.proceeds_in_surface());
    }

    #[test]
    fn scheme_match_is_case_insensitive() {
        let result = classifier().classify("MAILTO:help@selftest.example");
        assert!(matches!(result.decision, RoutingDecision::External { .. }));
    }

    #[test]
    fn app_schemes_map_to_families() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify("market://details?id=com.example").decision,
            RoutingDecision::External {
                scheme_family: SchemeFamily::AppIntent
            }
        );
        assert_eq!(
            classifier.classify("supertoss://pay?token=1").decision,
            RoutingDecision::External {
                scheme_family: SchemeFamily::ThirdPartyApp
            }
        );
        assert_eq!(
            classifier
                .classify("https://play.google.com/store/apps/details?id=com.example")
                .decision,
            RoutingDecision::External {
                scheme_family: SchemeFamily::AppIntent
            }
        );
    }

    #[test]
    fn order_callbacks_signal_loading() {
        let result = classifier().classify("https://selftest.example/order/complete.php?id=9");
        assert_eq!(result.decision, RoutingDecision::AuthOrPayment);
        assert!(result.show_loading);

        let fail = classifier().classify("https://selftest.example/order/fail.php");
        assert_eq!(fail.decision, RoutingDecision::AuthOrPayment);
    }

    #[test]
    fn payment_gateway_subdomains_match() {
        let result = classifier().classify("https://pay.tosspayments.com/checkout");
        assert_eq!(result.decision, RoutingDecision::AuthOrPayment);
    }

    #[test]
    fn lookalike_host_does_not_match() {
        let result = classifier().classify("https://evilnid.naver.com.example/login");
        assert_eq!(result.decision, RoutingDecision::InSurface);
        let result = classifier().classify("https://notnid.naver.com/login");
        assert_eq!(result.decision, RoutingDecision::InSurface);
    }

    #[test]
    fn plain_pages_load_in_surface() {
        let result = classifier().classify("https://selftest.example/home");
        assert_eq!(result.decision, RoutingDecision::InSurface);
        assert!(!result.show_loading);
    }

    #[test]
    fn malformed_input_falls_through() {
        let classifier = classifier();
        for url in ["", "not a url", "://", "javascript:void(0)"] {
            assert_eq!(classifier.classify(url).decision, RoutingDecision::InSurface);
        }
    }

    #[test]
    fn classification_is_stable() {
        let classifier = classifier();
        let url = "kakaolink://send?appkey=1";
        assert_eq!(classifier.classify(url), classifier.classify(url));
    }

    #[test]
    fn http_guard() {
        assert!(looks_like_http("https://selftest.example/a"));
        assert!(looks_like_http("http://selftest.example"));
        assert!(!looks_like_http("httpfoo"));
        assert!(!looks_like_http("tel:123"));
        assert!(!looks_like_http(""));
    }
}
