//! Gate-generated responses.
//!
//! # Responsibilities
//! - Build the deny response (status, body, optional verdict echo)
//! - Map origin transport failures to 502 Bad Gateway
//!
//! # Design Decisions
//! - The provider payload is echoed only when explicitly configured
//! - Only decision payloads are echoed; error details stay internal

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};

use crate::config::DenyConfig;
use crate::risk::RiskVerdict;

/// Build the configured deny response.
pub fn deny_response(config: &DenyConfig, verdict: Option<&RiskVerdict>) -> Response<Body> {
    let status = StatusCode::from_u16(config.status).unwrap_or(StatusCode::FORBIDDEN);

    let echoed = match verdict {
        Some(RiskVerdict::Decision(decision)) if config.echo_verdict => serde_json::to_vec(&decision.raw).ok(),
        _ => None,
    };

    let (content_type, body) = match echoed {
        Some(json) => ("application/json", Body::from(json)),
        None => ("text/plain; charset=utf-8", Body::from(config.body.clone())),
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Response used when the origin cannot be reached.
pub fn bad_gateway() -> Response<Body> {
    let mut response = Response::new(Body::from("Origin request failed"));
    *response.status_mut() = StatusCode::BAD_GATEWAY;
    response
}
