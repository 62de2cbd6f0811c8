use crate::enums::ProviderPriority;
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quality of service requested from a location stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Hint for which location sources to use.
    pub priority: ProviderPriority,
    /// Desired interval between active updates, in milliseconds.
    pub interval_ms: u64,
    /// Fastest rate at which updates are accepted, in milliseconds.
    pub fastest_interval_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            priority: ProviderPriority::HighAccuracy,
            interval_ms: 10_000,
            fastest_interval_ms: 10_000,
        }
    }
}

impl ProviderConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidConfig`] if `fastest_interval_ms > interval_ms`.
    pub fn new(
        priority: ProviderPriority,
        interval_ms: u64,
        fastest_interval_ms: u64,
    ) -> DomainResult<Self> {
        let config = Self {
            priority,
            interval_ms,
            fastest_interval_ms,
        };
        config.validate()?;
        Ok(config)
    }

    /// High accuracy updates with both intervals set to `interval_ms`.
    pub fn high_accuracy(interval_ms: u64) -> Self {
        Self {
            priority: ProviderPriority::HighAccuracy,
            interval_ms,
            fastest_interval_ms: interval_ms,
        }
    }

    /// Checks the interval ordering.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidConfig`] if the fastest interval exceeds the interval.
    pub fn validate(&self) -> DomainResult<()> {
        if self.fastest_interval_ms > self.interval_ms {
            return Err(DomainError::InvalidConfig {
                interval_ms: self.interval_ms,
                fastest_interval_ms: self.fastest_interval_ms,
            });
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn fastest_interval(&self) -> Duration {
        Duration::from_millis(self.fastest_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_platform_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.priority, ProviderPriority::HighAccuracy);
        assert_eq!(config.interval(), Duration::from_secs(10));
        assert_eq!(config.fastest_interval(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fastest_exceeding_interval_is_rejected() {
        let result = ProviderConfig::new(ProviderPriority::HighAccuracy, 5_000, 10_000);
        assert_eq!(
            result,
            Err(DomainError::InvalidConfig {
                interval_ms: 5_000,
                fastest_interval_ms: 10_000,
            })
        );
    }

    #[test]
    fn test_equal_intervals_are_accepted() {
        let config = ProviderConfig::new(ProviderPriority::LowPower, 5_000, 5_000).unwrap();
        assert_eq!(config, ProviderConfig {
            priority: ProviderPriority::LowPower,
            interval_ms: 5_000,
            fastest_interval_ms: 5_000,
        });
    }

    #[test]
    fn test_deserialized_config_can_be_validated() {
        let json = r#"{"priority":"BALANCED_POWER","interval_ms":1000,"fastest_interval_ms":2000}"#;
        let config: ProviderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.priority, ProviderPriority::BalancedPower);
        assert!(config.validate().is_err());
    }
}
