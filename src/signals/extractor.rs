//! Request token, user attribute and client IP extraction.

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};

use axum::http::{header, HeaderMap};

use crate::config::SignalConfig;
use crate::signals::SignalSource;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Signals pulled from one request. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals {
    pub request_token: Option<String>,
    pub user: BTreeMap<String, String>,
}

/// Reads configured signals out of a request snapshot.
#[derive(Debug, Clone)]
pub struct SignalExtractor {
    token: SignalSource,
    user: BTreeMap<String, SignalSource>,
    ip_headers: Vec<String>,
}

impl SignalExtractor {
    pub fn new(config: &SignalConfig) -> Self {
        Self {
            token: config.token.clone(),
            user: config.user.clone(),
            ip_headers: config
                .ip_headers
                .iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Extract the request token and user attributes.
    ///
    /// A body that is not form-encoded or not valid UTF-8 yields no form
    /// fields; header sources are still consulted.
    pub fn extract(&self, headers: &HeaderMap, body: &[u8]) -> Signals {
        let form = parse_form(headers, body);
        if form.is_none() && !body.is_empty() {
            tracing::debug!("Request body is not a readable form; form signals absent");
        }

        let lookup = |source: &SignalSource| -> Option<String> {
            let value = match source {
                SignalSource::FormField(name) => form
                    .as_ref()
                    .and_then(|fields| fields.iter().find(|(k, _)| k == name))
                    .map(|(_, v)| v.clone()),
                SignalSource::Header(name) => headers
                    .get(name.to_ascii_lowercase().as_str())
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
            };
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };

        Signals {
            request_token: lookup(&self.token),
            user: self
                .user
                .iter()
                .filter_map(|(key, source)| lookup(source).map(|v| (key.clone(), v)))
                .collect(),
        }
    }

    /// Resolve the client IP from the configured headers, falling back to the peer.
    pub fn client_ip(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
        for name in &self.ip_headers {
            let candidate = headers
                .get(name.as_str())
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .and_then(|v| v.parse::<IpAddr>().ok());

            if let Some(ip) = candidate {
                return Some(ip.to_string());
            }
        }

        peer.map(|addr| addr.ip().to_string())
    }
}

fn parse_form(headers: &HeaderMap, body: &[u8]) -> Option<Vec<(String, String)>> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
        .unwrap_or(false);

    if !is_form || std::str::from_utf8(body).is_err() {
        return None;
    }

    Some(
        url::form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn form_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        headers
    }

    #[test]
    fn test_extracts_token_and_email_from_form() {
        let extractor = SignalExtractor::new(&SignalConfig::default());
        let body = b"username=bob&email=bob%40example.com&castle_request_token=abc123";

        let signals = extractor.extract(&form_headers(), body);

        assert_eq!(signals.request_token.as_deref(), Some("abc123"));
        assert_eq!(signals.user.get("email").map(String::as_str), Some("bob@example.com"));
    }

    #[test]
    fn test_non_form_body_yields_absent() {
        let extractor = SignalExtractor::new(&SignalConfig::default());
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let signals = extractor.extract(&headers, br#"{"castle_request_token":"abc"}"#);
        assert_eq!(signals, Signals::default());
    }

    #[test]
    fn test_invalid_utf8_yields_absent() {
        let extractor = SignalExtractor::new(&SignalConfig::default());
        let signals = extractor.extract(&form_headers(), &[0xff, 0xfe, 0x00]);
        assert_eq!(signals, Signals::default());
    }

    #[test]
    fn test_empty_value_is_absent() {
        let extractor = SignalExtractor::new(&SignalConfig::default());
        let signals = extractor.extract(&form_headers(), b"castle_request_token=&email=");
        assert_eq!(signals, Signals::default());
    }

    #[test]
    fn test_header_token_source() {
        let config = SignalConfig {
            token: SignalSource::Header("X-Castle-Request-Token".into()),
            ..SignalConfig::default()
        };
        let extractor = SignalExtractor::new(&config);
        let mut headers = HeaderMap::new();
        headers.insert("x-castle-request-token", HeaderValue::from_static("tok-9"));

        let signals = extractor.extract(&headers, b"");
        assert_eq!(signals.request_token.as_deref(), Some("tok-9"));
    }

    #[test]
    fn test_client_ip_resolution() {
        let extractor = SignalExtractor::new(&SignalConfig::default());
        let peer: SocketAddr = "10.0.0.1:5555".parse().unwrap();

        let mut headers = HeaderMap::new();
        assert_eq!(extractor.client_ip(&headers, Some(peer)).as_deref(), Some("10.0.0.1"));

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.2"));
        assert_eq!(extractor.client_ip(&headers, Some(peer)).as_deref(), Some("203.0.113.7"));

        headers.insert("cf-connecting-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(extractor.client_ip(&headers, Some(peer)).as_deref(), Some("198.51.100.4"));

        headers.insert("cf-connecting-ip", HeaderValue::from_static("not-an-ip"));
        assert_eq!(extractor.client_ip(&headers, Some(peer)).as_deref(), Some("203.0.113.7"));

        assert_eq!(extractor.client_ip(&HeaderMap::new(), None), None);
    }
}
