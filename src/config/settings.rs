//! Client settings

use std::time::Duration;

use crate::error::ConfigError;
use crate::protocol::ProtocolDescriptor;
use crate::transport::RetryPolicy;

/// Wait for a reply this long before re-sending
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Send attempts per exchange
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Exchange engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Per-attempt receive timeout
    pub timeout: Duration,
    /// Total send attempts before giving up
    pub max_attempts: u32,
    /// Field widths of the protocol
    pub descriptor: ProtocolDescriptor,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            descriptor: ProtocolDescriptor::STANDARD,
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Reject settings the exchange engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidAttempts {
                attempts: self.max_attempts,
            });
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(10));
        assert_eq!(DEFAULT_MAX_ATTEMPTS, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let config = ClientConfig::default().with_timeout(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));

        let config = ClientConfig::default().with_max_attempts(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidAttempts { attempts: 0 })
        );
    }

    #[test]
    fn test_retry_policy() {
        let policy = ClientConfig::default()
            .with_timeout(Duration::from_millis(250))
            .with_max_attempts(2)
            .retry_policy();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.timeout, Duration::from_millis(250));
    }
}
