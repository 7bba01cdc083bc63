//! UDP transport
//!
//! - Bounded retry combinator
//! - One-shot exchange session over a connected socket

pub mod retry;
pub mod session;

#[cfg(test)]
pub(crate) mod mock;

pub use retry::{with_retries, RetryError, RetryPolicy};
pub use session::Session;
