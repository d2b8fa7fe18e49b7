//! Forwarding to the origin service.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the origin's scheme and authority
//! - Copy method, headers and body verbatim
//! - Stream the origin response back unchanged
//!
//! # Design Decisions
//! - One shared pooled client; no retries (non-idempotent requests reach here)
//! - Origin failures surface as 502, they are not a gate decision

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{Request, Response, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::config::OriginConfig;

/// Error forwarding a request to the origin.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid origin URL: {0}")]
    InvalidOrigin(String),

    #[error("failed to build origin request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("origin request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

/// Pooled HTTP client bound to one origin.
#[derive(Clone, Debug)]
pub struct OriginClient {
    client: Client<HttpConnector, Body>,
    scheme: Scheme,
    authority: Authority,
}

impl OriginClient {
    pub fn new(config: &OriginConfig) -> Result<Self, ForwardError> {
        let uri: Uri = config
            .url
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| ForwardError::InvalidOrigin(e.to_string()))?;
        let parts = uri.into_parts();
        let scheme = parts.scheme.unwrap_or(Scheme::HTTP);
        let authority = parts
            .authority
            .ok_or_else(|| ForwardError::InvalidOrigin(format!("'{}' has no host", config.url)))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            scheme,
            authority,
        })
    }

    /// Send the request to the origin and return its response.
    pub async fn forward(&self, parts: Parts, body: Body) -> Result<Response<Body>, ForwardError> {
        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(self.scheme.clone());
        uri_parts.authority = Some(self.authority.clone());
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        let uri = Uri::from_parts(uri_parts)
            .map_err(|e| ForwardError::InvalidOrigin(e.to_string()))?;

        let mut builder = Request::builder().method(parts.method).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            *headers = parts.headers;
        }
        let request = builder.body(body)?;

        let response = self.client.request(request).await?;
        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
