//! Timeout enforcement.
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - On expiry the operation's cancellation token is fired and its future is
//!   dropped, so in-flight work is aborted rather than left running
//! - Timeout errors are distinct from operation errors

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Outcome of racing an operation against its deadline.
#[derive(Debug)]
pub enum Deadline<T, E> {
    Completed(Result<T, E>),
    Elapsed(Duration),
}

/// Await `fut`, giving up after `limit` if one is set.
pub async fn with_deadline<T, E, Fut>(
    fut: Fut,
    limit: Option<Duration>,
    token: &CancellationToken,
) -> Deadline<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    let Some(limit) = limit else {
        return Deadline::Completed(fut.await);
    };

    match tokio::time::timeout(limit, fut).await {
        Ok(result) => Deadline::Completed(result),
        Err(_) => {
            token.cancel();
            Deadline::Elapsed(limit)
        }
    }
}
