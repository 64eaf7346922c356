//! Spoke analysis of Voronoi poles
//!
//! A spoke joins a locus to one of the samples that nominated it. All spokes
//! of a genuine Voronoi vertex have the same length (the local medial radius),
//! and the widest angle between them (the aperture) separates well-supported
//! medial poles from the spurious ones produced by sharp features or sparse
//! sampling.

use glam::DVec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MedialError, Result};
use crate::poles::SpokeSources;

/// Per-locus condition reported alongside the metrics
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpokeAnomaly {
    /// Fewer sources than a locus in general position has
    InsufficientSources { found: usize },
    /// Nominations that did not fit in the source capacity
    SourceOverflow { dropped: usize },
    /// A spoke whose length disagrees with the reported radius
    LengthMismatch {
        point: usize,
        expected: f64,
        actual: f64,
    },
    /// A source coincides with the locus, so its spoke has no direction
    ZeroLengthSpoke { point: usize },
}

/// Radius and aperture of one locus
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoleMetrics {
    /// Length of the first spoke, `None` without sources
    pub radius: Option<f64>,
    /// Largest angle between two spokes in `[0, π]`, `None` with fewer than two usable spokes
    pub aperture: Option<f64>,
    /// Spokes the metrics were computed from
    pub spoke_count: usize,
    /// Largest absolute difference between a spoke length and `radius`
    pub max_length_deviation: f64,
    pub anomalies: Vec<SpokeAnomaly>,
}

impl PoleMetrics {
    /// Source count if the locus has fewer sources than expected
    pub fn insufficient_sources(&self) -> Option<usize> {
        self.anomalies.iter().find_map(|a| match *a {
            SpokeAnomaly::InsufficientSources { found } => Some(found),
            _ => None,
        })
    }

    /// Nominations dropped for exceeding the capacity, 0 if none
    pub fn dropped_sources(&self) -> usize {
        self.anomalies
            .iter()
            .find_map(|a| match *a {
                SpokeAnomaly::SourceOverflow { dropped } => Some(dropped),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn has_length_mismatch(&self) -> bool {
        self.anomalies
            .iter()
            .any(|a| matches!(a, SpokeAnomaly::LengthMismatch { .. }))
    }

    /// True when no anomaly was recorded
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}

/// Spoke analysis parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpokeOptions {
    /// Source count below which `InsufficientSources` is reported
    pub expected_sources: usize,
    /// Relative tolerance on spoke length agreement
    pub length_tolerance: f64,
}

impl Default for SpokeOptions {
    fn default() -> Self {
        Self {
            expected_sources: crate::config::GENERAL_POSITION_SOURCES,
            length_tolerance: 1e-6,
        }
    }
}

/// Compute radius, aperture and anomalies for every locus
///
/// `sources` is indexed like `loci`; spoke source indices refer to `points`.
///
/// # Errors
///
/// Returns `InvalidInput` if `loci` and `sources` differ in length or a
/// source refers to a point outside `points`.
pub fn analyze_poles(
    loci: &[DVec3],
    sources: &[SpokeSources],
    points: &[DVec3],
    options: SpokeOptions,
) -> Result<Vec<PoleMetrics>> {
    if loci.len() != sources.len() {
        return Err(MedialError::InvalidInput(format!(
            "{} loci but {} spoke source lists",
            loci.len(),
            sources.len()
        )));
    }
    for (locus, src) in sources.iter().enumerate() {
        if let Some(&p) = src.points.iter().find(|&&p| p >= points.len()) {
            return Err(MedialError::InvalidInput(format!(
                "locus {} lists source point {} but only {} points were given",
                locus,
                p,
                points.len()
            )));
        }
    }

    #[cfg(feature = "parallel")]
    let metrics: Vec<PoleMetrics> = loci
        .par_iter()
        .zip(sources.par_iter())
        .map(|(&locus, src)| analyze_locus(locus, src, points, options))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let metrics: Vec<PoleMetrics> = loci
        .iter()
        .zip(sources.iter())
        .map(|(&locus, src)| analyze_locus(locus, src, points, options))
        .collect();

    Ok(metrics)
}

/// Metrics of a single locus
pub fn analyze_locus(
    locus: DVec3,
    sources: &SpokeSources,
    points: &[DVec3],
    options: SpokeOptions,
) -> PoleMetrics {
    let mut metrics = PoleMetrics {
        spoke_count: sources.len(),
        ..Default::default()
    };

    if sources.len() < options.expected_sources {
        metrics.anomalies.push(SpokeAnomaly::InsufficientSources {
            found: sources.len(),
        });
    }
    if sources.dropped > 0 {
        metrics.anomalies.push(SpokeAnomaly::SourceOverflow {
            dropped: sources.dropped,
        });
    }

    let spokes: Vec<(usize, DVec3)> = sources
        .points
        .iter()
        .map(|&p| (p, points[p] - locus))
        .collect();

    let Some(&(_, first)) = spokes.first() else {
        return metrics;
    };
    let radius = first.length();
    metrics.radius = Some(radius);

    let mut directions = Vec::with_capacity(spokes.len());
    for &(point, spoke) in &spokes {
        let length = spoke.length();
        let deviation = (length - radius).abs();
        metrics.max_length_deviation = metrics.max_length_deviation.max(deviation);

        if deviation > options.length_tolerance * radius {
            metrics.anomalies.push(SpokeAnomaly::LengthMismatch {
                point,
                expected: radius,
                actual: length,
            });
        }

        match spoke.try_normalize() {
            Some(dir) => directions.push(dir),
            None => metrics.anomalies.push(SpokeAnomaly::ZeroLengthSpoke { point }),
        }
    }

    metrics.aperture = max_pairwise_angle(&directions);
    metrics
}

/// Widest angle between any two unit vectors, `None` for fewer than two
pub fn max_pairwise_angle(directions: &[DVec3]) -> Option<f64> {
    if directions.len() < 2 {
        return None;
    }

    let mut widest: f64 = 0.0;
    for (i, a) in directions.iter().enumerate() {
        for b in &directions[i + 1..] {
            // Round-off can push the dot product just outside [-1, 1]
            let angle = a.dot(*b).clamp(-1.0, 1.0).acos();
            widest = widest.max(angle);
        }
    }
    Some(widest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn sources(points: &[usize]) -> SpokeSources {
        SpokeSources {
            points: points.iter().copied().collect(),
            dropped: 0,
        }
    }

    #[test]
    fn test_max_pairwise_angle() {
        assert_eq!(max_pairwise_angle(&[]), None);
        assert_eq!(max_pairwise_angle(&[DVec3::X]), None);

        let right = max_pairwise_angle(&[DVec3::X, DVec3::Y]).unwrap();
        assert!((right - FRAC_PI_2).abs() < 1e-12);

        let opposite = max_pairwise_angle(&[DVec3::X, DVec3::Y, DVec3::NEG_X]).unwrap();
        assert!((opposite - PI).abs() < 1e-12);

        let same = max_pairwise_angle(&[DVec3::Z, DVec3::Z]).unwrap();
        assert_eq!(same, 0.0);
    }

    #[test]
    fn test_clamps_round_off() {
        // Slightly longer than unit: dot product exceeds 1 without clamping
        let a = DVec3::X * (1.0 + 1e-15);
        let angle = max_pairwise_angle(&[a, a]).unwrap();
        assert!(angle.is_finite());
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn test_equidistant_sources() {
        let points = vec![DVec3::X, DVec3::Y, DVec3::Z, DVec3::NEG_X];
        let metrics = analyze_locus(DVec3::ZERO, &sources(&[0, 1, 2, 3]), &points, SpokeOptions::default());

        assert_eq!(metrics.radius, Some(1.0));
        assert!((metrics.aperture.unwrap() - PI).abs() < 1e-12);
        assert_eq!(metrics.spoke_count, 4);
        assert!(metrics.is_clean(), "unexpected anomalies: {:?}", metrics.anomalies);
    }

    #[test]
    fn test_insufficient_sources() {
        let points = vec![DVec3::X, DVec3::Y, DVec3::Z];
        let metrics = analyze_locus(DVec3::ZERO, &sources(&[0, 1, 2]), &points, SpokeOptions::default());

        assert_eq!(metrics.insufficient_sources(), Some(3));
        assert_eq!(metrics.radius, Some(1.0));
        assert!((metrics.aperture.unwrap() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_single_source_has_no_aperture() {
        let points = vec![DVec3::new(0.0, 2.0, 0.0)];
        let metrics = analyze_locus(DVec3::ZERO, &sources(&[0]), &points, SpokeOptions::default());

        assert_eq!(metrics.radius, Some(2.0));
        assert_eq!(metrics.aperture, None);
        assert_eq!(metrics.insufficient_sources(), Some(1));
    }

    #[test]
    fn test_no_sources() {
        let metrics = analyze_locus(DVec3::ZERO, &SpokeSources::default(), &[], SpokeOptions::default());
        assert_eq!(metrics.radius, None);
        assert_eq!(metrics.aperture, None);
        assert_eq!(metrics.insufficient_sources(), Some(0));
    }

    #[test]
    fn test_length_mismatch() {
        let points = vec![DVec3::X, DVec3::Y * 1.5, DVec3::Z, DVec3::NEG_X];
        let metrics = analyze_locus(DVec3::ZERO, &sources(&[0, 1, 2, 3]), &points, SpokeOptions::default());

        assert!(metrics.has_length_mismatch());
        assert!((metrics.max_length_deviation - 0.5).abs() < 1e-12);
        assert!(metrics.anomalies.contains(&SpokeAnomaly::LengthMismatch {
            point: 1,
            expected: 1.0,
            actual: 1.5,
        }));
    }

    #[test]
    fn test_overflow_and_zero_spoke() {
        let points = vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
        let src = SpokeSources {
            points: smallvec![1, 0, 2, 3],
            dropped: 3,
        };
        let metrics = analyze_locus(DVec3::ZERO, &src, &points, SpokeOptions::default());

        assert_eq!(metrics.dropped_sources(), 3);
        assert!(metrics.anomalies.contains(&SpokeAnomaly::ZeroLengthSpoke { point: 0 }));
        // The zero spoke is excluded from the aperture
        assert!((metrics.aperture.unwrap() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_poles_is_indexed_by_locus() {
        let points = vec![DVec3::X, DVec3::Y, DVec3::Z, DVec3::NEG_Z];
        let loci = vec![DVec3::ZERO, DVec3::new(5.0, 0.0, 0.0)];
        let table = vec![sources(&[0, 1, 2, 3]), sources(&[0])];

        let metrics = analyze_poles(&loci, &table, &points, SpokeOptions::default()).unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].radius, Some(1.0));
        assert_eq!(metrics[1].radius, Some(4.0));
        assert_eq!(metrics[1].aperture, None);
    }

    #[test]
    fn test_analyze_poles_rejects_mismatched_tables() {
        let points = vec![DVec3::X, DVec3::Y];
        let loci = vec![DVec3::ZERO, DVec3::Z];

        let result = analyze_poles(&loci, &[sources(&[0, 1])], &points, SpokeOptions::default());
        assert!(matches!(result, Err(MedialError::InvalidInput(_))));

        let table = vec![sources(&[0, 1]), sources(&[1, 7])];
        let result = analyze_poles(&loci, &table, &points, SpokeOptions::default());
        assert!(
            matches!(result, Err(MedialError::InvalidInput(ref msg)) if msg.contains("point 7")),
            "unexpected result: {:?}",
            result
        );
    }
}
