//! Request handling helpers.
//!
//! # Responsibilities
//! - Attach a unique request ID (UUID v4) as early as possible
//! - Read the request ID back for logging
//! - Snapshot a matched request's body once, within a size limit, without
//!   losing the unread remainder
//!
//! # Design Decisions
//! - An incoming `x-request-id` is kept, otherwise one is generated
//! - The snapshot is shared: extraction reads it, the forward gets its own `Body`
//! - An oversized or broken body still reaches the risk check, with no form signals

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName};
use futures_util::stream::{self, BoxStream, StreamExt};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer that assigns `x-request-id` to requests missing one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer that copies `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// Access to the request ID carried in headers.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> &str {
        self.get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// A matched request's body, read once for signal extraction.
pub enum BodySnapshot {
    /// The whole body fit within the limit.
    Complete(Bytes),
    /// The limit was hit or the stream failed; `prefix` holds what was read.
    Truncated {
        prefix: Bytes,
        rest: BoxStream<'static, Result<Bytes, axum::Error>>,
    },
}

impl BodySnapshot {
    /// Bytes handed to signal extraction. A truncated body yields none.
    pub fn signal_bytes(&self) -> Bytes {
        match self {
            BodySnapshot::Complete(bytes) => bytes.clone(),
            BodySnapshot::Truncated { .. } => Bytes::new(),
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, BodySnapshot::Truncated { .. })
    }

    /// Rebuild the full body for the origin: the buffered bytes, then the unread rest.
    pub fn into_body(self) -> Body {
        match self {
            BodySnapshot::Complete(bytes) => Body::from(bytes),
            BodySnapshot::Truncated { prefix, rest } => {
                Body::from_stream(stream::once(async move { Ok::<_, axum::Error>(prefix) }).chain(rest))
            }
        }
    }
}

/// Buffer the body up to `limit` bytes, keeping the unread remainder.
///
/// The buffered prefix may exceed `limit` by at most one frame.
pub async fn snapshot_body(body: Body, limit: usize) -> BodySnapshot {
    let mut frames = body.into_data_stream();
    let mut buffered: Vec<u8> = Vec::new();

    while let Some(frame) = frames.next().await {
        match frame {
            Ok(chunk) => {
                buffered.extend_from_slice(&chunk);
                if buffered.len() > limit {
                    tracing::debug!(limit, buffered = buffered.len(), "Body exceeds snapshot limit");
                    return BodySnapshot::Truncated {
                        prefix: Bytes::from(buffered),
                        rest: frames.boxed(),
                    };
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Request body stream failed");
                return BodySnapshot::Truncated {
                    prefix: Bytes::from(buffered),
                    rest: stream::once(async move { Err::<Bytes, _>(e) }).boxed(),
                };
            }
        }
    }

    BodySnapshot::Complete(Bytes::from(buffered))
}
