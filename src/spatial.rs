//! Spatial indexing for fast position-to-sample lookups
//!
//! This module is only available with the `spatial-index` feature.

use glam::DVec3;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;
use std::fmt;

/// Wrapper around a KD-tree over the surface samples
///
/// Maps an arbitrary 3D position (a picked location, a probe along a cave
/// passage) to the closest surface sample, whose pole then gives the nearby
/// medial point.
#[derive(Clone)]
pub struct SampleIndex {
    tree: ImmutableKdTree<f64, usize, 3, 32>,
    len: usize,
}

impl SampleIndex {
    /// Build the index from sample positions
    ///
    /// # Example
    ///
    /// ```
    /// use medial_poles::SampleIndex;
    /// use glam::DVec3;
    ///
    /// let samples = vec![DVec3::X, DVec3::Y, DVec3::Z];
    /// let index = SampleIndex::new(&samples);
    /// assert_eq!(index.find_nearest(DVec3::new(0.9, 0.1, 0.0)), 0);
    /// ```
    pub fn new(samples: &[DVec3]) -> Self {
        let points: Vec<[f64; 3]> = samples.iter().map(|s| s.to_array()).collect();

        Self {
            tree: ImmutableKdTree::new_from_slice(&points),
            len: samples.len(),
        }
    }

    /// Index of the sample closest to `position`
    pub fn find_nearest(&self, position: DVec3) -> usize {
        let result = self.tree.nearest_one::<SquaredEuclidean>(&position.to_array());
        result.item as usize
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for SampleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleIndex").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_index_basic() {
        let samples = vec![
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(-1.0, 0.0, 0.0),
        ];

        let index = SampleIndex::new(&samples);
        assert_eq!(index.len(), 4);

        assert_eq!(index.find_nearest(DVec3::new(0.9, 0.1, 0.0)), 0);
        assert_eq!(index.find_nearest(DVec3::new(0.0, 0.95, 0.0)), 1);
        assert_eq!(index.find_nearest(DVec3::new(0.0, 0.1, 0.9)), 2);
        assert_eq!(index.find_nearest(DVec3::new(-0.8, 0.0, 0.0)), 3);
    }

    #[test]
    fn test_sample_index_exact_match() {
        let samples = vec![DVec3::new(10.0, 0.0, 0.0), DVec3::new(0.0, 10.0, 0.0)];
        let index = SampleIndex::new(&samples);

        assert_eq!(index.find_nearest(samples[0]), 0);
        assert_eq!(index.find_nearest(samples[1]), 1);
    }
}
