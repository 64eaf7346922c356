//! Axis-aligned bounding volume used to filter Voronoi vertices

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned box, inclusive on every face
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Bounds {
    /// Create a box from two corners (components are sorted, so any two opposite corners work)
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Tight box around a point set
    ///
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    /// Grow the box on every side by `margin` absolute units
    pub fn padded(&self, margin: f64) -> Self {
        let m = DVec3::splat(margin.max(0.0));
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Inclusive containment test
    #[inline]
    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths along x, y and z
    #[inline]
    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }

    /// Longest edge length
    #[inline]
    pub fn max_extent(&self) -> f64 {
        self.extent().max_element()
    }

    /// True if min > max on any axis or a coordinate is not finite
    pub fn is_empty(&self) -> bool {
        !(self.min.is_finite() && self.max.is_finite()) || self.min.cmpgt(self.max).any()
    }
}
