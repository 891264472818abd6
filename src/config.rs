use crate::consts::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("initial capacity must be at least 1")]
    ZeroCapacity,

    #[error("collision threshold must be at least 1")]
    ZeroCollision,

    #[error("growth factor must be at least 2, got {0}")]
    GrowthFactor(usize),

    #[error("maximum line length must be at least 1")]
    ZeroLineLength,
}

/// Sizing rules of an [`Index`](crate::index::Index)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Number of buckets allocated up front
    pub initial_capacity: usize,

    /// A bucket holding more records than this triggers a rehash
    pub max_collision: usize,

    /// The bucket count is multiplied by this on every rehash
    pub growth_factor: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            initial_capacity: INITIAL_CAPACITY,
            max_collision: MAX_COLLISION,
            growth_factor: GROWTH_FACTOR,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.max_collision == 0 {
            return Err(ConfigError::ZeroCollision);
        }
        if self.growth_factor < 2 {
            return Err(ConfigError::GrowthFactor(self.growth_factor));
        }
        Ok(())
    }
}

/// Bounds applied while reading address blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadConfig {
    /// Characters kept per line, excluding the terminator
    pub max_line_len: usize,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            max_line_len: MAX_LINE_LEN,
        }
    }
}

impl ReadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_len == 0 {
            return Err(ConfigError::ZeroLineLength);
        }
        Ok(())
    }
}
