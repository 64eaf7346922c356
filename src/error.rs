//! Error types for medial pole estimation

use thiserror::Error;

/// Errors that abort a computation or reject a query
///
/// Per-element conditions (a point without an interior pole, a locus with too
/// few spoke sources) are not errors; they are recorded in the output tables.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MedialError {
    /// The Voronoi dual could not be built from the input points
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
    /// Input arrays are inconsistent or contain non-finite values
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The point has no pole on the interior side of its normal
    #[error("point {0} has no interior pole")]
    UnresolvedPole(usize),
    /// Requested point index does not exist
    #[error("point not found: {0}")]
    PointNotFound(usize),
    /// Requested locus index does not exist
    #[error("locus not found: {0}")]
    LocusNotFound(usize),
}

/// Result type alias for medial pole operations
pub type Result<T> = std::result::Result<T, MedialError>;
