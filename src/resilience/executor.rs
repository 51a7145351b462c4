//! Protected execution of calls to unreliable dependencies.
//!
//! # Data Flow
//! ```text
//! execute(name, op, fallback)
//!     → registry.breaker(name)       (create on first use)
//!     → breaker.admit()              (maybe Open → Half-Open)
//!     → skipped? return fallback     (nothing counted)
//!     → with_deadline(op(token))     (timeout cancels token, panic is a failure)
//!     → record_success / record_failure
//!     → result or fallback
//! ```

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::observability::metrics;
use crate::resilience::events::FailureKind;
use crate::resilience::registry::CircuitRegistry;
use crate::resilience::timeouts::{with_deadline, Deadline};

/// Why a protected call produced no result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecuteError {
    /// The circuit was open; the operation was never started.
    #[error("circuit open for {service}")]
    CircuitOpen { service: String },

    /// The operation returned an error or panicked.
    #[error("{service} failed: {message}")]
    Failed { service: String, message: String },

    /// The operation exceeded its request timeout.
    #[error("{service} timed out after {after:?}")]
    Timeout { service: String, after: Duration },
}

impl ExecuteError {
    /// True when the call was skipped rather than attempted.
    pub fn is_skip(&self) -> bool {
        matches!(self, ExecuteError::CircuitOpen { .. })
    }
}

impl CircuitRegistry {
    /// Run `operation` under the breaker for `name`, reporting why it failed.
    ///
    /// The operation receives a token that is cancelled if the request
    /// timeout fires; its future is dropped at the same moment. A panic in the
    /// operation is caught and recorded as an ordinary failure.
    pub async fn try_execute<T, E, F, Fut>(
        &self,
        name: &str,
        operation: F,
    ) -> Result<T, ExecuteError>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let breaker = self.breaker(name);

        if !breaker.admit() {
            tracing::debug!(service = %name, "Circuit open, skipping call");
            metrics::record_skip(name);
            return Err(ExecuteError::CircuitOpen {
                service: name.to_string(),
            });
        }

        let token = CancellationToken::new();
        let limit = breaker.config().request_timeout;
        let child = token.clone();
        let guarded = AssertUnwindSafe(async move { operation(child).await }).catch_unwind();

        let outcome = with_deadline(
            guarded.map(|caught| match caught {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(service = %name, panic = %message, "Protected call panicked");
                    Err(format!("panicked: {message}"))
                }
            }),
            limit,
            &token,
        )
        .await;

        match outcome {
            Deadline::Completed(Ok(value)) => {
                breaker.record_success();
                Ok(value)
            }
            Deadline::Completed(Err(message)) => {
                breaker.record_failure(FailureKind::Error, &message);
                Err(ExecuteError::Failed {
                    service: name.to_string(),
                    message,
                })
            }
            Deadline::Elapsed(after) => {
                let message = format!("timed out after {}ms", after.as_millis());
                breaker.record_failure(FailureKind::Timeout, &message);
                Err(ExecuteError::Timeout {
                    service: name.to_string(),
                    after,
                })
            }
        }
    }

    /// Run `operation`, returning `fallback` if it is skipped, fails or times out.
    pub async fn execute<T, E, F, Fut>(&self, name: &str, operation: F, fallback: T) -> T
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.try_execute(name, operation).await.unwrap_or(fallback)
    }

    /// Like [`execute`](Self::execute), building the fallback only when needed.
    pub async fn execute_with<T, E, F, Fut, D>(&self, name: &str, operation: F, fallback: D) -> T
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        D: FnOnce() -> T,
    {
        self.try_execute(name, operation)
            .await
            .unwrap_or_else(|_| fallback())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
