use std::future::Future;

use tracing::{debug, warn};

/// Result of a bounded retry run.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T, E> {
    /// A candidate passed validation on attempt `attempts`.
    Success { value: T, attempts: u32 },
    /// Every attempt failed and the fallback producer supplied a value.
    FallbackUsed { value: T, last_error: E },
    /// Every attempt failed and no fallback was available.
    Failed { last_error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    /// Value if one was produced, by validation or fallback.
    pub fn into_value(self) -> Result<T, E> {
        match self {
            RetryOutcome::Success { value, .. } | RetryOutcome::FallbackUsed { value, .. } => {
                Ok(value)
            }
            RetryOutcome::Failed { last_error, .. } => Err(last_error),
        }
    }
}

/// Runs `attempt` up to `max_attempts` times (at least once) with no delay
/// between attempts. A candidate is accepted when `validate` returns `Ok`.
/// When the budget is exhausted `fallback` gets the last error and may
/// produce a substitute value.
pub async fn retry_validated<T, E, A, Fut, V, F>(
    max_attempts: u32,
    mut attempt: A,
    validate: V,
    fallback: F,
) -> RetryOutcome<T, E>
where
    A: FnMut(u32, Option<&E>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    V: Fn(&T) -> Result<(), E>,
    F: FnOnce(&E) -> Option<T>,
    E: std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut last_error: Option<E> = None;

    for n in 1..=max_attempts {
        let result = attempt(n, last_error.as_ref())
            .await
            .and_then(|candidate| validate(&candidate).map(|_| candidate));
        match result {
            Ok(value) => {
                debug!(attempt = n, "candidate accepted");
                return RetryOutcome::Success { value, attempts: n };
            }
            Err(e) => {
                warn!(attempt = n, max_attempts, error = %e, "candidate rejected");
                if n == max_attempts {
                    return match fallback(&e) {
                        Some(value) => RetryOutcome::FallbackUsed {
                            value,
                            last_error: e,
                        },
                        None => RetryOutcome::Failed {
                            last_error: e,
                            attempts: n,
                        },
                    };
                }
                last_error = Some(e);
            }
        }
    }

    unreachable!("the final attempt always returns")
}
