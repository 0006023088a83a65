// src/utils/retry.rs

//! Bounded retry combinator.

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, Result};

/// How many times to try and how long to pause in between.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub attempts: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: usize, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

/// Run `op` until it succeeds or the budget is spent, retrying every error.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_if(policy, |_| true, op).await
}

/// Run `op` until it succeeds, retrying only errors accepted by `should_retry`.
///
/// `op` receives the 1-based attempt number. Errors that are not retryable
/// are returned as-is; running out of attempts yields
/// [`AppError::RetriesExhausted`] wrapping the last error.
pub async fn retry_if<T, F, Fut, P>(
    policy: &RetryPolicy,
    mut should_retry: P,
    mut op: F,
) -> Result<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T>>,
    P: FnMut(&AppError) -> bool,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !should_retry(&e) => return Err(e),
            Err(e) if attempt >= attempts => {
                return Err(AppError::RetriesExhausted {
                    attempts,
                    last: Box::new(e),
                });
            }
            Err(e) => {
                log::warn!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt,
                    attempts,
                    e
                );
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
                attempt += 1;
            }
        }
    }
}
