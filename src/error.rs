//! Error types for the count-neighbors filter.

use thiserror::Error;

use crate::filters::region::Region;

pub type Result<T> = std::result::Result<T, CountNeighborsError>;

/// Errors that abort a filter pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CountNeighborsError {
    #[error("requested region {requested} cannot be supplied from largest possible region {largest}")]
    InvalidRequestedRegion { requested: Region, largest: Region },
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration problems detected before a pass starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("image has no axes")]
    ZeroDimensional,
    #[error("radius has {actual} axes but the image has {expected}")]
    RadiusDimension { expected: usize, actual: usize },
    #[error("neighborhood size overflows u64")]
    NeighborhoodTooLarge,
    #[error("output pixel type cannot hold a count of {max_count}")]
    CountOverflow { max_count: u64 },
    #[error("lower value {lower} is greater than upper value {upper}")]
    InvertedBounds { lower: String, upper: String },
}
