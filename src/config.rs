//! Medial pole estimation configuration and builder

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::error::{MedialError, Result};

/// Spoke sources a non-degenerate 3D Voronoi vertex has (one per generating point)
pub const GENERAL_POSITION_SOURCES: usize = 4;

/// Upper limit for the spoke source capacity of a single locus
pub const MAX_SPOKE_SOURCE_CAPACITY: usize = 64;

/// How the bounding volume for Voronoi vertex filtering is obtained
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundsMode {
    /// Extent of the input points, grown by `padding` times the longest edge
    Derived {
        /// Fraction of the longest box edge added on every side
        padding: f64,
    },
    /// Caller-supplied box
    Explicit(Bounds),
}

impl BoundsMode {
    /// Resolve the bounding volume for a point set
    ///
    /// Returns `None` when the volume is derived and the point set is empty.
    pub fn resolve(&self, points: &[glam::DVec3]) -> Option<Bounds> {
        match *self {
            BoundsMode::Derived { padding } => {
                let tight = Bounds::from_points(points)?;
                Some(tight.padded(padding * tight.max_extent()))
            }
            BoundsMode::Explicit(bounds) => Some(bounds),
        }
    }
}

impl Default for BoundsMode {
    fn default() -> Self {
        BoundsMode::Derived { padding: 0.0 }
    }
}

/// Configuration for a medial pole run
///
/// The same configuration and input always produce identical pole
/// assignments, spoke source orderings and metrics.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MedialConfig {
    /// Bounding volume used to discard Voronoi vertices
    pub bounds: BoundsMode,

    /// Number of spoke sources kept per locus
    ///
    /// Nominations beyond this count are dropped and counted as overflow.
    pub max_spoke_sources: usize,

    /// Spoke source count a locus is expected to reach
    ///
    /// Loci with fewer sources are reported as `InsufficientSources`.
    pub expected_spoke_sources: usize,

    /// Relative tolerance for spoke length agreement at a locus
    pub spoke_length_tolerance: f64,
}

impl Default for MedialConfig {
    fn default() -> Self {
        Self {
            bounds: BoundsMode::default(),
            max_spoke_sources: GENERAL_POSITION_SOURCES,
            expected_spoke_sources: GENERAL_POSITION_SOURCES,
            spoke_length_tolerance: 1e-6,
        }
    }
}

/// Builder for creating MedialConfig with validation
///
/// # Example
///
/// ```rust
/// use medial_poles::*;
///
/// let config = MedialConfigBuilder::new()
///     .bounds_padding(0.05)
///     .unwrap()
///     .spoke_length_tolerance(1e-5)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.max_spoke_sources, 4);
/// ```
#[derive(Debug, Clone)]
pub struct MedialConfigBuilder {
    bounds: BoundsMode,
    max_spoke_sources: usize,
    expected_spoke_sources: Option<usize>,
    spoke_length_tolerance: f64,
}

impl MedialConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - bounds: derived from the point extent, no padding
    /// - max_spoke_sources: 4
    /// - expected_spoke_sources: min(4, max_spoke_sources)
    /// - spoke_length_tolerance: 1e-6 (relative)
    pub fn new() -> Self {
        Self {
            bounds: BoundsMode::default(),
            max_spoke_sources: GENERAL_POSITION_SOURCES,
            expected_spoke_sources: None,
            spoke_length_tolerance: 1e-6,
        }
    }

    /// Derive the bounding volume from the points, padded by a fraction of the longest edge
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if padding is negative or not finite
    pub fn bounds_padding(mut self, padding: f64) -> Result<Self> {
        if !padding.is_finite() || padding < 0.0 {
            return Err(MedialError::InvalidConfig(format!(
                "bounds padding must be a finite value >= 0 (got {})",
                padding
            )));
        }
        self.bounds = BoundsMode::Derived { padding };
        Ok(self)
    }

    /// Use a fixed bounding volume instead of the point extent
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the box is empty or not finite
    pub fn explicit_bounds(mut self, bounds: Bounds) -> Result<Self> {
        if bounds.is_empty() {
            return Err(MedialError::InvalidConfig(format!(
                "explicit bounds must be finite and non-empty (got {:?})",
                bounds
            )));
        }
        self.bounds = BoundsMode::Explicit(bounds);
        Ok(self)
    }

    /// Set how many spoke sources a locus keeps
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if capacity is outside 2..=64
    pub fn max_spoke_sources(mut self, capacity: usize) -> Result<Self> {
        if !(2..=MAX_SPOKE_SOURCE_CAPACITY).contains(&capacity) {
            return Err(MedialError::InvalidConfig(format!(
                "max spoke sources must be in 2..={} (got {})",
                MAX_SPOKE_SOURCE_CAPACITY, capacity
            )));
        }
        self.max_spoke_sources = capacity;
        Ok(self)
    }

    /// Set the source count below which a locus is reported as insufficient
    ///
    /// Checked against `max_spoke_sources` in `build`.
    pub fn expected_spoke_sources(mut self, count: usize) -> Self {
        self.expected_spoke_sources = Some(count);
        self
    }

    /// Set the relative spoke length tolerance
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if tolerance is not a finite positive value
    pub fn spoke_length_tolerance(mut self, tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(MedialError::InvalidConfig(format!(
                "spoke length tolerance must be > 0 (got {})",
                tolerance
            )));
        }
        self.spoke_length_tolerance = tolerance;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the expected source count is 0 or exceeds the capacity
    pub fn build(self) -> Result<MedialConfig> {
        let expected = self
            .expected_spoke_sources
            .unwrap_or_else(|| GENERAL_POSITION_SOURCES.min(self.max_spoke_sources));

        if expected == 0 || expected > self.max_spoke_sources {
            return Err(MedialError::InvalidConfig(format!(
                "expected spoke sources must be in 1..={} (got {})",
                self.max_spoke_sources, expected
            )));
        }

        Ok(MedialConfig {
            bounds: self.bounds,
            max_spoke_sources: self.max_spoke_sources,
            expected_spoke_sources: expected,
            spoke_length_tolerance: self.spoke_length_tolerance,
        })
    }
}

impl Default for MedialConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
