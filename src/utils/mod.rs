//! Utility functions and helpers.

pub mod retry;

pub use retry::{RetryPolicy, retry, retry_if};
