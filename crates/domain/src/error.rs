//! Errors raised while building domain values.

use thiserror::Error;

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors produced by domain value construction and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A colour string was not `#RRGGBB` or `#AARRGGBB`.
    #[error("invalid colour {0:?}: expected #RRGGBB or #AARRGGBB")]
    InvalidColor(String),

    /// The fastest interval exceeds the regular interval.
    #[error(
        "invalid provider config: fastest interval {fastest_interval_ms}ms exceeds interval {interval_ms}ms"
    )]
    InvalidConfig {
        /// Desired update interval.
        interval_ms: u64,
        /// Fastest accepted update interval.
        fastest_interval_ms: u64,
    },
}
