//! Android `intent://` URLs.
//!
//! Shape: `intent://<payload>#Intent;scheme=<scheme>;package=<package>;end`.

pub const INTENT_PREFIX: &str = "intent://";
pub const MARKET_PREFIX: &str = "market://";
const WEB_STORE_PREFIX: &str = "https://play.google.com/store/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentUrl<'a> {
    pub payload: &'a str,
    pub scheme: Option<&'a str>,
    pub package: Option<&'a str>,
}

impl<'a> IntentUrl<'a> {
    pub fn parse(url: &'a str) -> Option<Self> {
        let rest = strip_prefix_ignore_case(url, INTENT_PREFIX)?;
        let (payload, fragment) = match rest.split_once('#') {
            Some((payload, fragment)) => (payload, Some(fragment)),
            None => (rest, None),
        };

        let mut scheme = None;
        let mut package = None;
        for param in fragment.into_iter().flat_map(|f| f.split(';')) {
            match param.split_once('=') {
                Some(("scheme", value)) if !value.is_empty() => scheme = Some(value),
                Some(("package", value)) if !value.is_empty() => package = Some(value),
                _ => {}
            }
        }

        Some(Self {
            payload,
            scheme,
            package,
        })
    }

    /// The custom-scheme URL the intent points at, e.g. `myapp://path`.
    pub fn scheme_url(&self) -> Option<String> {
        self.scheme
            .map(|scheme| format!("{scheme}://{}", self.payload))
    }

    pub fn store_listing(&self) -> Option<String> {
        self.package
            .map(|package| format!("{MARKET_PREFIX}details?id={package}"))
    }
}

/// Rewrites a `market://` URL to the equivalent web store address.
pub fn market_to_web(url: &str) -> Option<String> {
    strip_prefix_ignore_case(url, MARKET_PREFIX).map(|rest| format!("{WEB_STORE_PREFIX}{rest}"))
}

pub(crate) fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}
