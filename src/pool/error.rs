// Pool error types: construction errors, exhaustion, foreign handles

use thiserror::Error;

/// Pool Errors
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum PoolError {
    #[error("Pool capacity must be greater than zero (got {0})")]
    InvalidCapacity(i64),
    #[error("Pool has no template to create entities from")]
    MissingTemplate,
    #[error("Pool exhausted: all {capacity} entities are active")]
    CapacityExceeded { capacity: usize },
    #[error("Handle {handle} is not owned by pool '{pool}'")]
    InvalidRelease { handle: String, pool: String },
}

impl PoolError {
    /// Configuration errors are raised at construction and are fatal at startup.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, PoolError::InvalidCapacity(_) | PoolError::MissingTemplate)
    }
}
