//! Deadline enforcement.
//!
//! # Responsibilities
//! - Race an outbound call against a timer
//! - Drop the in-flight call when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Cancellation is local; nothing is sent to the remote side

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The wrapped future did not complete in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} exceeded")]
pub struct DeadlineExceeded(pub Duration);

/// Wait for `fut` for at most `deadline`.
///
/// On expiry the future is dropped, so any late result is discarded.
pub async fn with_deadline<F>(deadline: Duration, fut: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| DeadlineExceeded(deadline))
}
