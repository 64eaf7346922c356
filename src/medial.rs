//! MedialAxis pipeline structure

use glam::DVec3;
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::MedialConfig;
use crate::dual::{affine_frame, DelaunayDual, VoronoiDiagram, VoronoiDual};
use crate::error::{MedialError, Result};
use crate::poles::{select_poles, Pole, SpokeSources};
use crate::spokes::{analyze_poles, PoleMetrics, SpokeOptions};

#[cfg(feature = "spatial-index")]
use crate::spatial::SampleIndex;

/// Position of a point's pole
///
/// Pure lookup into `loci`; never mutates anything.
///
/// # Errors
///
/// - `PointNotFound` if `point` is out of range
/// - `UnresolvedPole` if the point has no interior pole
/// - `LocusNotFound` if the assignment refers to a locus outside `loci`
pub fn medial_point(assignments: &[Pole], loci: &[DVec3], point: usize) -> Result<DVec3> {
    match assignments.get(point) {
        None => Err(MedialError::PointNotFound(point)),
        Some(Pole::Unresolved) => Err(MedialError::UnresolvedPole(point)),
        Some(&Pole::Resolved { locus, .. }) => loci
            .get(locus)
            .copied()
            .ok_or(MedialError::LocusNotFound(locus)),
    }
}

/// Counts describing a finished run
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MedialSummary {
    pub points: usize,
    pub loci: usize,
    /// Points with an interior pole
    pub resolved: usize,
    /// Points without an interior pole
    pub unresolved: usize,
    /// Loci with fewer spoke sources than expected
    pub insufficient_sources: usize,
    /// Loci that dropped nominations past the source capacity
    pub overflowing_loci: usize,
    /// Loci whose spoke lengths disagree beyond tolerance
    pub length_mismatches: usize,
}

/// Medial axis estimate of a sampled surface
///
/// Owns the input samples and every derived table: the filtered Voronoi
/// diagram, one pole assignment per sample, the spoke sources and metrics of
/// every locus. All of it is computed once in [`MedialAxis::compute`] and is
/// read-only afterwards.
///
/// # Examples
///
/// ```
/// use medial_poles::*;
/// use glam::DVec3;
///
/// let (points, normals) = sampling::fibonacci_sphere_samples(200, 1.0, DVec3::ZERO, 7);
/// let medial = MedialAxis::compute(points, normals, MedialConfig::default()).unwrap();
///
/// let summary = medial.summary();
/// println!("{} of {} samples have a pole", summary.resolved, summary.points);
///
/// if let Ok(center) = medial.medial_point(0) {
///     println!("sample 0 projects to {:?}", center);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MedialAxis {
    config: MedialConfig,
    points: Vec<DVec3>,
    normals: Vec<DVec3>,
    diagram: VoronoiDiagram,
    assignments: Vec<Pole>,
    sources: Vec<SpokeSources>,
    metrics: Vec<PoleMetrics>,

    /// KD-tree over the samples (requires spatial-index feature)
    #[cfg(feature = "spatial-index")]
    sample_index: SampleIndex,
}

impl MedialAxis {
    /// Estimate the medial axis using the built-in Delaunay dual
    ///
    /// # Errors
    ///
    /// - `DegenerateInput` if the samples do not span a volume
    /// - `InvalidInput` if points and normals do not match up
    pub fn compute(points: Vec<DVec3>, normals: Vec<DVec3>, config: MedialConfig) -> Result<Self> {
        Self::compute_with_dual(points, normals, config, &DelaunayDual::new())
    }

    /// Estimate the medial axis with a custom Voronoi backend
    ///
    /// The backend's vertices are filtered through the configured bounding
    /// volume before any pole is selected.
    pub fn compute_with_dual<D>(
        points: Vec<DVec3>,
        normals: Vec<DVec3>,
        config: MedialConfig,
        dual: &D,
    ) -> Result<Self>
    where
        D: VoronoiDual + ?Sized,
    {
        let start = Instant::now();

        if points.len() != normals.len() {
            return Err(MedialError::InvalidInput(format!(
                "{} points but {} normals",
                points.len(),
                normals.len()
            )));
        }
        affine_frame(&points)?;

        let bounds = config
            .bounds
            .resolve(&points)
            .ok_or_else(|| MedialError::DegenerateInput("empty point set".into()))?;

        // Phase 1: dual
        let raw = dual.compute(&points)?;
        let diagram = VoronoiDiagram::from_raw(&raw, bounds, points.len())?;
        let dual_time = start.elapsed();

        // Phase 2: poles
        let selection = select_poles(&points, &normals, &diagram, config.max_spoke_sources)?;
        let pole_time = start.elapsed() - dual_time;

        // Phase 3: spokes
        let options = SpokeOptions {
            expected_sources: config.expected_spoke_sources,
            length_tolerance: config.spoke_length_tolerance,
        };
        let metrics = analyze_poles(&diagram.loci, &selection.sources, &points, options)?;
        let spoke_time = start.elapsed() - dual_time - pole_time;

        tracing::debug!(
            resolved = selection.resolved_count(),
            dual_ms = dual_time.as_secs_f64() * 1000.0,
            pole_ms = pole_time.as_secs_f64() * 1000.0,
            spoke_ms = spoke_time.as_secs_f64() * 1000.0,
            "medial axis phases complete"
        );

        #[cfg(feature = "spatial-index")]
        let sample_index = SampleIndex::new(&points);

        let medial = Self {
            config,
            points,
            normals,
            diagram,
            assignments: selection.assignments,
            sources: selection.sources,
            metrics,
            #[cfg(feature = "spatial-index")]
            sample_index,
        };

        let summary = medial.summary();
        if summary.unresolved * 2 > summary.points {
            tracing::warn!(
                unresolved = summary.unresolved,
                points = summary.points,
                "most samples have no interior pole; check normal orientation"
            );
        }
        tracing::info!(?summary, "medial axis estimated");

        Ok(medial)
    }

    /// Get the configuration used for this run
    #[inline]
    pub fn config(&self) -> &MedialConfig {
        &self.config
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn locus_count(&self) -> usize {
        self.diagram.loci.len()
    }

    #[inline]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    #[inline]
    pub fn normals(&self) -> &[DVec3] {
        &self.normals
    }

    /// Voronoi loci inside the bounding volume
    #[inline]
    pub fn loci(&self) -> &[DVec3] {
        &self.diagram.loci
    }

    #[inline]
    pub fn diagram(&self) -> &VoronoiDiagram {
        &self.diagram
    }

    /// Pole assignment of every sample, indexed by point
    #[inline]
    pub fn assignments(&self) -> &[Pole] {
        &self.assignments
    }

    /// Pole assignment of one sample
    ///
    /// Returns `None` if the point index is out of bounds.
    #[inline]
    pub fn pole_of(&self, point: usize) -> Option<Pole> {
        self.assignments.get(point).copied()
    }

    /// Spoke sources of every locus, indexed by locus
    #[inline]
    pub fn spoke_sources(&self) -> &[SpokeSources] {
        &self.sources
    }

    /// Metrics of every locus, indexed by locus
    #[inline]
    pub fn metrics(&self) -> &[PoleMetrics] {
        &self.metrics
    }

    /// Metrics of one locus
    ///
    /// Returns `None` if the locus index is out of bounds.
    #[inline]
    pub fn metrics_of(&self, locus: usize) -> Option<&PoleMetrics> {
        self.metrics.get(locus)
    }

    /// Position of a sample's pole
    ///
    /// # Errors
    ///
    /// `PointNotFound` for an unknown point, `UnresolvedPole` if it has no pole.
    pub fn medial_point(&self, point: usize) -> Result<DVec3> {
        medial_point(&self.assignments, &self.diagram.loci, point)
    }

    /// Pole position of every sample, `None` where unresolved
    pub fn medial_points(&self) -> Vec<Option<DVec3>> {
        self.assignments
            .iter()
            .map(|pole| pole.locus().map(|l| self.diagram.loci[l]))
            .collect()
    }

    /// Counts of resolved poles and per-locus anomalies
    pub fn summary(&self) -> MedialSummary {
        let resolved = self.assignments.iter().filter(|p| p.is_resolved()).count();

        MedialSummary {
            points: self.points.len(),
            loci: self.diagram.loci.len(),
            resolved,
            unresolved: self.points.len() - resolved,
            insufficient_sources: self
                .metrics
                .iter()
                .filter(|m| m.insufficient_sources().is_some())
                .count(),
            overflowing_loci: self.sources.iter().filter(|s| s.dropped > 0).count(),
            length_mismatches: self.metrics.iter().filter(|m| m.has_length_mismatch()).count(),
        }
    }

    /// Find the sample closest to a position (requires spatial-index feature)
    ///
    /// Uses the KD-tree built during `compute` for an O(log n) lookup.
    #[cfg(feature = "spatial-index")]
    pub fn find_nearest_sample(&self, position: DVec3) -> usize {
        self.sample_index.find_nearest(position)
    }

    /// Medial point of the sample closest to a position (requires spatial-index feature)
    ///
    /// # Errors
    ///
    /// `UnresolvedPole` if that sample has no pole.
    #[cfg(feature = "spatial-index")]
    pub fn medial_point_near(&self, position: DVec3) -> Result<DVec3> {
        self.medial_point(self.find_nearest_sample(position))
    }
}
