use std::fmt::Debug;

use tokio::time::{sleep, timeout};

use crate::{Error, error::LastOutcome, retry::RetryPolicy};

/// Run `operation` until it succeeds or fails with a non-retryable error.
///
/// Shorthand for [`retry_until`] with a stop condition that accepts any value and any error for
/// which [`Error::is_retryable`] is `false`.
///
/// # Errors
///
/// See [`retry_until`].
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T, Error>
where
    T: Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    retry_until(policy, operation, |outcome| match outcome {
        Ok(_) => true,
        Err(error) => !error.is_retryable(),
    })
    .await
}

/// Run `operation` repeatedly until `stop` accepts one of its outcomes.
///
/// Attempts never overlap: the next one starts after the previous completed and the policy's
/// backoff delay elapsed. An outcome accepted by `stop` is returned as is, whether it is a value
/// or an error.
///
/// Dropping the returned future abandons the sequence. A request that was already sent cannot be
/// recalled, but its result is never looked at.
///
/// # Errors
///
/// * [`Error::RetryExhausted`] once `max_attempts` invocations were made without `stop`
///   accepting an outcome. It carries the last error, or the `Debug` output of the last value.
/// * [`Error::RetryTimeout`] when the policy timeout elapses first.
/// * [`Error::InvalidArgument`] if `max_attempts` is zero.
/// * Any error accepted by `stop`.
///
/// With a disabled policy the operation runs once and its result is returned unchanged.
pub async fn retry_until<T, F, Fut, P>(
    policy: &RetryPolicy,
    mut operation: F,
    mut stop: P,
) -> Result<T, Error>
where
    T: Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
    P: FnMut(&Result<T, Error>) -> bool,
{
    if !policy.enabled {
        return operation().await;
    }
    if policy.max_attempts == Some(0) {
        return Err(Error::invalid_argument("max_attempts must be greater than 0"));
    }

    let attempts = run_attempts(policy, &mut operation, &mut stop);
    match policy.timeout {
        Some(limit) => timeout(limit, attempts).await.unwrap_or_else(|_| {
            warn!(timeout_ms = limit.as_millis(), "Retry sequence timed out");
            Err(Error::RetryTimeout(limit))
        }),
        None => attempts.await,
    }
}

async fn run_attempts<T, F, Fut, P>(
    policy: &RetryPolicy,
    operation: &mut F,
    stop: &mut P,
) -> Result<T, Error>
where
    T: Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
    P: FnMut(&Result<T, Error>) -> bool,
{
    let mut delays = policy.backoff();
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);
        let outcome = operation().await;

        if stop(&outcome) {
            return outcome;
        }

        if policy.max_attempts.is_some_and(|max_attempts| attempt >= max_attempts) {
            let last = match outcome {
                Ok(value) => LastOutcome::Value(format!("{value:?}")),
                Err(error) => LastOutcome::Error(Box::new(error)),
            };
            error!(attempts = attempt, last = %last, "Retry attempts exhausted");
            return Err(Error::RetryExhausted { attempts: attempt, last });
        }

        let delay = delays.next().unwrap_or(policy.backoff_delay);
        match &outcome {
            Err(error) => {
                debug!(
                    attempt = attempt,
                    error = %error,
                    delay_ms = delay.as_millis(),
                    "Attempt failed, retrying"
                );
            }
            Ok(value) => {
                trace!(
                    attempt = attempt,
                    value = ?value,
                    delay_ms = delay.as_millis(),
                    "Stop condition not met, retrying"
                );
            }
        }
        sleep(delay).await;
    }
}
