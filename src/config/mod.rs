//! Client configuration
//!
//! Deployment constants of the exchange engine: per-attempt timeout, retry
//! budget and the protocol descriptor.

mod settings;

pub use settings::{ClientConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT};
